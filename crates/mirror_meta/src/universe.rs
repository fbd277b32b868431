//! The frozen metadata universe.
//!
//! A [`Universe`] is the immutable set of loaded type metadata that symbol
//! descriptors reflect over. It is produced by
//! [`UniverseBuilder::finish`](crate::UniverseBuilder::finish) and never
//! changes afterwards, which is what lets descriptors memoize derived
//! attributes without invalidation.
//!
//! # Lookups
//!
//! - By handle: `Option` returning accessors; a handle the universe did not
//!   issue yields `None`.
//! - By full metadata name: an `FxHashMap` index over declared types.

use rustc_hash::FxHashMap;

use crate::core_lib::CoreTypes;
use crate::def::{
    CustomAttribute, EventDef, FieldDef, MethodDef, ParamDef, PropertyDef, TypeDef,
    TypeDefinition, TypeShape,
};
use crate::flags::MethodAttributes;
use crate::{
    EventHandle, FieldHandle, MethodHandle, Name, ParamHandle, PropertyHandle, StringTable,
    TypeHandle,
};

/// Names the universe compares against by identity.
#[derive(Copy, Clone, Debug)]
pub struct WellKnownNames {
    /// `.ctor`
    pub ctor: Name,
    /// `.cctor`
    pub cctor: Name,
    /// `Invoke`, the delegate signature method.
    pub invoke: Name,
    /// `GetAwaiter`, the awaitable pattern method.
    pub get_awaiter: Name,
    /// `value__`, the instance field carrying an enum's underlying type.
    pub enum_value: Name,
}

impl WellKnownNames {
    pub(crate) fn intern(strings: &mut StringTable) -> Self {
        Self {
            ctor: strings.intern(".ctor"),
            cctor: strings.intern(".cctor"),
            invoke: strings.intern("Invoke"),
            get_awaiter: strings.intern("GetAwaiter"),
            enum_value: strings.intern("value__"),
        }
    }
}

/// Immutable loaded metadata.
pub struct Universe {
    pub(crate) strings: StringTable,
    pub(crate) types: Vec<TypeDef>,
    pub(crate) methods: Vec<MethodDef>,
    pub(crate) fields: Vec<FieldDef>,
    pub(crate) properties: Vec<PropertyDef>,
    pub(crate) events: Vec<EventDef>,
    pub(crate) by_full_name: FxHashMap<Box<str>, TypeHandle>,
    pub(crate) names: WellKnownNames,
    pub(crate) core: CoreTypes,
    pub(crate) core_rows: usize,
}

impl Universe {
    // === Strings ===

    /// Look up an interned name.
    #[inline]
    pub fn str(&self, name: Name) -> &str {
        self.strings.lookup(name)
    }

    /// Find the interned `Name` for a string, if any symbol uses it.
    #[inline]
    pub fn name(&self, s: &str) -> Option<Name> {
        self.strings.get(s)
    }

    /// Names compared by identity throughout the crate family.
    #[inline]
    pub fn well_known(&self) -> &WellKnownNames {
        &self.names
    }

    /// Handles of the core library.
    #[inline]
    pub fn core(&self) -> &CoreTypes {
        &self.core
    }

    // === Rows by handle ===

    pub fn ty(&self, ty: TypeHandle) -> Option<&TypeDef> {
        self.types.get(ty.index())
    }

    /// The definition record of a declared type.
    pub fn definition(&self, ty: TypeHandle) -> Option<&TypeDefinition> {
        self.ty(ty).and_then(|row| row.shape.as_definition())
    }

    pub fn method(&self, method: MethodHandle) -> Option<&MethodDef> {
        self.methods.get(method.index())
    }

    pub fn field(&self, field: FieldHandle) -> Option<&FieldDef> {
        self.fields.get(field.index())
    }

    pub fn property(&self, property: PropertyHandle) -> Option<&PropertyDef> {
        self.properties.get(property.index())
    }

    pub fn event(&self, event: EventHandle) -> Option<&EventDef> {
        self.events.get(event.index())
    }

    pub fn param(&self, param: ParamHandle) -> Option<&ParamDef> {
        self.method(param.method)?
            .params
            .get(usize::from(param.position))
    }

    // === Iteration ===

    /// All type rows in handle order.
    pub fn types(&self) -> impl Iterator<Item = (TypeHandle, &TypeDef)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, row)| (TypeHandle::from_raw(index_to_raw(i)), row))
    }

    /// All declared (non-constructed, non-parameter) types in handle order.
    pub fn definitions(&self) -> impl Iterator<Item = (TypeHandle, &TypeDefinition)> {
        self.types().filter_map(|(handle, row)| {
            row.shape.as_definition().map(|def| (handle, def))
        })
    }

    /// All method rows in handle order.
    pub fn methods(&self) -> impl Iterator<Item = (MethodHandle, &MethodDef)> {
        self.methods
            .iter()
            .enumerate()
            .map(|(i, row)| (MethodHandle::from_raw(index_to_raw(i)), row))
    }

    /// Whether `ty` was declared by the core-library bootstrap rather than
    /// by the caller. Constructed rows over core types count as the caller's.
    pub fn is_core_library(&self, ty: TypeHandle) -> bool {
        ty.index() < self.core_rows
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    // === Names ===

    /// Look up a declared type by full metadata name (`System.String`,
    /// `Outer+Inner`, `List`1`).
    pub fn find_type(&self, full_name: &str) -> Option<TypeHandle> {
        self.by_full_name.get(full_name).copied()
    }

    /// Full metadata name of a declared type; constructed types yield their
    /// synthesized name.
    pub fn full_name(&self, ty: TypeHandle) -> String {
        let Some(row) = self.ty(ty) else {
            return String::new();
        };
        let name = self.str(row.name);
        match row.shape.as_definition().and_then(|def| def.declaring_type) {
            Some(outer) => format!("{}+{name}", self.full_name(outer)),
            None => {
                let namespace = self.str(row.namespace);
                if namespace.is_empty() {
                    name.to_owned()
                } else {
                    format!("{namespace}.{name}")
                }
            }
        }
    }

    // === Structure ===

    /// The generic definition of an instance; any other handle unchanged.
    pub fn generic_definition(&self, ty: TypeHandle) -> TypeHandle {
        match self.ty(ty).map(|row| &row.shape) {
            Some(TypeShape::Instance(instance)) => instance.definition,
            _ => ty,
        }
    }

    /// The definition record behind a declared type or a generic instance.
    pub fn underlying_definition(&self, ty: TypeHandle) -> Option<&TypeDefinition> {
        self.definition(self.generic_definition(ty))
    }

    /// Base class of a declared type or generic instance (the instance
    /// reports its definition's base unsubstituted).
    pub fn base_type(&self, ty: TypeHandle) -> Option<TypeHandle> {
        self.underlying_definition(ty).and_then(|def| def.base)
    }

    /// Whether `ty` is `target` or has it (compared by generic definition)
    /// anywhere on its base-class chain.
    pub fn derives_from(&self, ty: TypeHandle, target: TypeHandle) -> bool {
        let target = self.generic_definition(target);
        let mut current = Some(ty);
        let mut steps = 0usize;
        while let Some(candidate) = current {
            if self.generic_definition(candidate) == target {
                return true;
            }
            steps += 1;
            if steps > self.types.len() {
                return false;
            }
            current = self.base_type(candidate);
        }
        false
    }

    /// Whether `ty` derives from `target` or implements it as an interface,
    /// directly or through a base class or base interface.
    pub fn is_assignable_to(&self, ty: TypeHandle, target: TypeHandle) -> bool {
        let target = self.generic_definition(target);
        let mut pending = vec![ty];
        let mut seen = rustc_hash::FxHashSet::default();
        while let Some(candidate) = pending.pop() {
            let definition = self.generic_definition(candidate);
            if definition == target {
                return true;
            }
            if !seen.insert(definition) {
                continue;
            }
            if let Some(def) = self.definition(definition) {
                pending.extend(def.base);
                pending.extend(def.interfaces.iter().copied());
            }
        }
        false
    }

    /// Whether the method is an instance constructor or type initializer.
    pub fn is_constructor(&self, method: MethodHandle) -> bool {
        self.method(method).is_some_and(|def| {
            def.attributes.contains(MethodAttributes::RT_SPECIAL_NAME)
                && (def.name == self.names.ctor || def.name == self.names.cctor)
        })
    }

    /// Index parameters of a property: the getter's parameters, or the
    /// setter's without its trailing value parameter.
    pub fn property_index_params(&self, property: PropertyHandle) -> &[ParamDef] {
        let Some(def) = self.property(property) else {
            return &[];
        };
        if let Some(getter) = def.getter.and_then(|m| self.method(m)) {
            return &getter.params;
        }
        match def.setter.and_then(|m| self.method(m)) {
            Some(setter) => match setter.params.split_last() {
                Some((_, index)) => index,
                None => &[],
            },
            None => &[],
        }
    }

    /// Whether an attribute list contains an instance of `attribute_type`.
    pub fn has_attribute(attributes: &[CustomAttribute], attribute_type: TypeHandle) -> bool {
        attributes.iter().any(|attr| attr.ty == attribute_type)
    }
}

impl std::fmt::Debug for Universe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Universe")
            .field("types", &self.types.len())
            .field("methods", &self.methods.len())
            .field("fields", &self.fields.len())
            .field("properties", &self.properties.len())
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

/// Strip a generic arity suffix: `List`1` becomes `List`.
pub fn strip_arity(name: &str) -> &str {
    match name.rfind('`') {
        Some(tick) if name[tick + 1..].bytes().all(|b| b.is_ascii_digit()) && tick + 1 < name.len() => {
            &name[..tick]
        }
        _ => name,
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "tables are bounded by u32 handles at insertion"
)]
#[inline]
fn index_to_raw(index: usize) -> u32 {
    index as u32
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
