//! Flag and access derivation.
//!
//! Called once per descriptor through its memo cells; nothing here caches.

use mirror_meta::{
    FieldAttributes, MethodAttributes, MethodDef, ParamAttributes, TypeAttributes, TypeShape,
    Universe,
};

use super::{Symbol, SymbolKind};
use crate::{rules, Access, SymbolCache, SymbolError, SymbolFlags, SymbolResult};

impl Symbol {
    fn describe(&self, cache: &SymbolCache) -> String {
        format!("{} {} ({:?})", self.kind_name(), self.name(cache), self.handle())
    }

    fn not_found(&self) -> SymbolError {
        SymbolError::not_found(format!("{:?}", self.handle()))
    }

    pub(super) fn derive_flags(&self, cache: &SymbolCache) -> SymbolResult<SymbolFlags> {
        let universe = cache.universe();
        match &self.kind {
            SymbolKind::Type(ty) => {
                let row = universe.ty(ty.handle()).ok_or_else(|| self.not_found())?;
                match &row.shape {
                    TypeShape::Definition(def) => {
                        let core = universe.core();
                        let mut flags = SymbolFlags::empty();
                        let is_interface = def.attributes.contains(TypeAttributes::INTERFACE);
                        let static_class = TypeAttributes::ABSTRACT | TypeAttributes::SEALED;
                        if !is_interface && def.attributes.contains(static_class) {
                            flags |= SymbolFlags::STATIC;
                        } else if !is_interface && def.attributes.contains(TypeAttributes::ABSTRACT) {
                            flags |= SymbolFlags::ABSTRACT;
                        } else if def.attributes.contains(TypeAttributes::SEALED) {
                            flags |= SymbolFlags::FINAL;
                        }
                        if !def.generic_params.is_empty() {
                            flags |= SymbolFlags::GENERIC | SymbolFlags::GENERIC_DEFINITION;
                        }
                        if Universe::has_attribute(&def.custom_attributes, core.is_read_only_attribute)
                        {
                            flags |= SymbolFlags::READONLY;
                        }
                        if Universe::has_attribute(
                            &def.custom_attributes,
                            core.is_by_ref_like_attribute,
                        ) {
                            flags |= SymbolFlags::REF_LIKE;
                        }
                        Ok(flags)
                    }
                    TypeShape::Instance(instance) => {
                        let definition = cache.resolve_type(instance.definition)?.flags(cache)?;
                        Ok((definition - SymbolFlags::GENERIC_DEFINITION) | SymbolFlags::GENERIC)
                    }
                    TypeShape::ByRef(_) => Ok(SymbolFlags::BY_REF),
                    TypeShape::Array { .. } | TypeShape::Pointer(_) | TypeShape::GenericParam(_) => {
                        Ok(SymbolFlags::empty())
                    }
                }
            }
            SymbolKind::Method(method) => {
                let def = universe.method(method.handle()).ok_or_else(|| self.not_found())?;
                let core = universe.core();
                let mut flags = self.method_flags(cache, def)?;
                if !def.generic_params.is_empty() {
                    flags |= SymbolFlags::GENERIC | SymbolFlags::GENERIC_DEFINITION;
                }
                if def.instantiation.is_some() {
                    flags |= SymbolFlags::GENERIC;
                }
                if Universe::has_attribute(&def.custom_attributes, core.async_state_machine_attribute)
                {
                    flags |= SymbolFlags::ASYNC;
                }
                if Universe::has_attribute(&def.custom_attributes, core.is_read_only_attribute) {
                    flags |= SymbolFlags::READONLY;
                }
                if is_by_ref(universe, def.return_type) {
                    flags |= SymbolFlags::BY_REF;
                }
                Ok(flags)
            }
            SymbolKind::Constructor(ctor) => {
                let def = universe.method(ctor.handle()).ok_or_else(|| self.not_found())?;
                let mut flags = SymbolFlags::SPECIAL_NAME;
                if def.attributes.contains(MethodAttributes::STATIC) {
                    flags |= SymbolFlags::STATIC;
                }
                Ok(flags)
            }
            SymbolKind::Field(field) => {
                let def = universe.field(field.handle()).ok_or_else(|| self.not_found())?;
                let mut flags = SymbolFlags::empty();
                if def.attributes.contains(FieldAttributes::STATIC) {
                    flags |= SymbolFlags::STATIC;
                }
                // Immutable after construction.
                if def.attributes.contains(FieldAttributes::INIT_ONLY) {
                    flags |= SymbolFlags::READONLY | SymbolFlags::FINAL;
                }
                if def.attributes.contains(FieldAttributes::LITERAL) {
                    if def.constant.is_none() {
                        return Err(SymbolError::invariant(
                            self.describe(cache),
                            "literal field has no constant value",
                        ));
                    }
                    flags |= SymbolFlags::CONSTANT;
                }
                if def.attributes.contains(FieldAttributes::SPECIAL_NAME) {
                    flags |= SymbolFlags::SPECIAL_NAME;
                }
                if is_by_ref(universe, def.ty) {
                    flags |= SymbolFlags::BY_REF;
                }
                Ok(flags)
            }
            SymbolKind::Property(property) => {
                let def = universe.property(property.handle()).ok_or_else(|| self.not_found())?;
                let accessor = def
                    .getter
                    .or(def.setter)
                    .and_then(|m| universe.method(m))
                    .ok_or_else(|| {
                        SymbolError::invariant(self.describe(cache), "property has no accessors")
                    })?;
                let mut flags = self.method_flags(cache, accessor)? - SymbolFlags::SPECIAL_NAME;
                if property.is_indexer(cache) {
                    flags |= SymbolFlags::INDEXER;
                }
                if def.setter.is_none() {
                    flags |= SymbolFlags::READONLY;
                }
                if property.is_init_only(cache) {
                    flags |= SymbolFlags::INIT_ONLY;
                }
                if is_by_ref(universe, def.ty) {
                    flags |= SymbolFlags::BY_REF;
                }
                Ok(flags)
            }
            SymbolKind::Event(event) => {
                let def = universe.event(event.handle()).ok_or_else(|| self.not_found())?;
                let accessor = def
                    .add
                    .or(def.remove)
                    .or(def.raise)
                    .and_then(|m| universe.method(m))
                    .ok_or_else(|| {
                        SymbolError::invariant(self.describe(cache), "event has no accessors")
                    })?;
                Ok(self.method_flags(cache, accessor)? - SymbolFlags::SPECIAL_NAME)
            }
            SymbolKind::Parameter(param) => {
                let def = universe.param(param.handle()).ok_or_else(|| self.not_found())?;
                let core = universe.core();
                let mut flags = SymbolFlags::empty();
                if is_by_ref(universe, def.ty) {
                    flags |= SymbolFlags::BY_REF;
                }
                if def.attributes.contains(ParamAttributes::IN) {
                    flags |= SymbolFlags::IN;
                }
                if def.attributes.contains(ParamAttributes::OUT) {
                    flags |= SymbolFlags::OUT;
                }
                if def.attributes.contains(ParamAttributes::OPTIONAL) {
                    flags |= SymbolFlags::OPTIONAL;
                }
                if Universe::has_attribute(&def.custom_attributes, core.param_array_attribute) {
                    flags |= SymbolFlags::PARAMS;
                }
                if Universe::has_attribute(&def.custom_attributes, core.is_read_only_attribute) {
                    flags |= SymbolFlags::READONLY;
                }
                if param.position() == 0
                    && rules::is_extension_method(universe, param.handle().method)
                {
                    flags |= SymbolFlags::RECEIVER;
                }
                Ok(flags)
            }
        }
    }

    /// Modifier flags shared by methods and the accessors behind
    /// properties and events.
    fn method_flags(&self, cache: &SymbolCache, def: &MethodDef) -> SymbolResult<SymbolFlags> {
        let attributes = def.attributes;
        let mut flags = SymbolFlags::empty();
        if attributes.contains(MethodAttributes::STATIC) {
            flags |= SymbolFlags::STATIC;
        }
        let is_virtual = attributes.contains(MethodAttributes::VIRTUAL);
        let new_slot = attributes.contains(MethodAttributes::NEW_SLOT);
        let is_final = attributes.contains(MethodAttributes::FINAL);
        if attributes.contains(MethodAttributes::ABSTRACT) {
            if !is_virtual {
                return Err(SymbolError::invariant(
                    self.describe(cache),
                    "abstract method is not virtual",
                ));
            }
            flags |= SymbolFlags::ABSTRACT;
        } else if is_virtual && new_slot && !is_final {
            flags |= SymbolFlags::VIRTUAL;
        }
        if is_virtual && !new_slot {
            flags |= SymbolFlags::OVERRIDE;
            if is_final {
                flags |= SymbolFlags::FINAL;
            }
        }
        if attributes.contains(MethodAttributes::SPECIAL_NAME) {
            flags |= SymbolFlags::SPECIAL_NAME;
        }
        Ok(flags)
    }

    pub(super) fn derive_access(&self, cache: &SymbolCache) -> SymbolResult<Access> {
        let universe = cache.universe();
        match &self.kind {
            SymbolKind::Type(ty) => {
                let row = universe.ty(ty.handle()).ok_or_else(|| self.not_found())?;
                match &row.shape {
                    TypeShape::Definition(def) => Access::from_visibility(
                        def.attributes.visibility(),
                        def.declaring_type.is_some(),
                    )
                    .ok_or_else(|| {
                        SymbolError::invariant(
                            self.describe(cache),
                            "type visibility does not match its nesting",
                        )
                    }),
                    TypeShape::Instance(instance) => {
                        cache.resolve_type(instance.definition)?.access(cache)
                    }
                    TypeShape::Array { element, .. }
                    | TypeShape::ByRef(element)
                    | TypeShape::Pointer(element) => cache.resolve_type(*element)?.access(cache),
                    TypeShape::GenericParam(_) => Err(SymbolError::unsupported(
                        "generic parameter",
                        "access modifier",
                    )),
                }
            }
            SymbolKind::Method(method) => {
                let def = universe.method(method.handle()).ok_or_else(|| self.not_found())?;
                self.member_access(cache, def.attributes.access())
            }
            SymbolKind::Constructor(ctor) => {
                let def = universe.method(ctor.handle()).ok_or_else(|| self.not_found())?;
                self.member_access(cache, def.attributes.access())
            }
            SymbolKind::Field(field) => {
                let def = universe.field(field.handle()).ok_or_else(|| self.not_found())?;
                self.member_access(cache, def.attributes.access())
            }
            SymbolKind::Property(property) => {
                let def = universe.property(property.handle()).ok_or_else(|| self.not_found())?;
                self.accessor_access(cache, [def.getter, def.setter], "property has no accessors")
            }
            SymbolKind::Event(event) => {
                let def = universe.event(event.handle()).ok_or_else(|| self.not_found())?;
                self.accessor_access(
                    cache,
                    [def.add, def.remove, def.raise],
                    "event has no accessors",
                )
            }
            SymbolKind::Parameter(_) => {
                Err(SymbolError::unsupported("parameter", "access modifier"))
            }
        }
    }

    fn member_access(
        &self,
        cache: &SymbolCache,
        access: Option<mirror_meta::MemberAccess>,
    ) -> SymbolResult<Access> {
        access.and_then(Access::from_member).ok_or_else(|| {
            SymbolError::invariant(
                self.describe(cache),
                "compiler-controlled or reserved member access",
            )
        })
    }

    /// Least restrictive access among the present accessors.
    fn accessor_access<const N: usize>(
        &self,
        cache: &SymbolCache,
        accessors: [Option<mirror_meta::MethodHandle>; N],
        empty: &'static str,
    ) -> SymbolResult<Access> {
        let mut accesses = Vec::with_capacity(N);
        for accessor in accessors.into_iter().flatten() {
            accesses.push(cache.resolve_method(accessor)?.access(cache)?);
        }
        Access::least_restrictive(accesses)
            .ok_or_else(|| SymbolError::invariant(self.describe(cache), empty))
    }
}

fn is_by_ref(universe: &Universe, ty: mirror_meta::TypeHandle) -> bool {
    matches!(
        universe.ty(ty).map(|row| &row.shape),
        Some(TypeShape::ByRef(_))
    )
}
