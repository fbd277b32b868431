//! Incremental construction of a [`Universe`].
//!
//! The builder owns the definition tables while they are being filled and
//! hands them to an immutable [`Universe`] in [`UniverseBuilder::finish`].
//! Every builder starts with the core library already defined (see
//! [`CoreTypes`]).
//!
//! Constructed types (generic instances, arrays, by-refs, pointers) and
//! generic method instances are deduplicated: requesting the same shape
//! twice returns the same handle, so handle equality is type identity.
//!
//! Handles are plain indices. A handle the builder never issued, or a
//! well-formed handle used in the wrong place, is reported as
//! [`MetadataError`].

use rustc_hash::FxHashMap;

use crate::core_lib::{self, CoreTypes};
use crate::def::{
    Constant, CustomAttribute, EventDef, FieldDef, GenericInstance, GenericOwner,
    GenericParamDef, MethodDef, MethodInstance, ParamDef, PropertyDef, TypeDef, TypeDefinition,
    TypeShape,
};
use crate::flags::{
    FieldAttributes, GenericParamAttributes, MethodAttributes, ParamAttributes, TypeAttributes,
};
use crate::handle::next_index;
use crate::universe::WellKnownNames;
use crate::{
    EventHandle, FieldHandle, MetadataError, MethodHandle, Name, ParamHandle, PropertyHandle,
    StringTable, TypeHandle, Universe,
};

/// Deduplication key for constructed type rows.
#[derive(Clone, PartialEq, Eq, Hash)]
enum ConstructedKey {
    Instance(TypeHandle, Vec<TypeHandle>),
    Array(TypeHandle, u8),
    ByRef(TypeHandle),
    Pointer(TypeHandle),
}

/// Builder for an immutable [`Universe`].
pub struct UniverseBuilder {
    strings: StringTable,
    types: Vec<TypeDef>,
    methods: Vec<MethodDef>,
    fields: Vec<FieldDef>,
    properties: Vec<PropertyDef>,
    events: Vec<EventDef>,
    by_full_name: FxHashMap<Box<str>, TypeHandle>,
    constructed: FxHashMap<ConstructedKey, TypeHandle>,
    method_instances: FxHashMap<MethodInstance, MethodHandle>,
    names: WellKnownNames,
    core: Option<CoreTypes>,
    /// Type rows created by the core-library bootstrap.
    core_rows: usize,
}

impl UniverseBuilder {
    /// Create a builder with the core library bootstrapped.
    pub fn new() -> Self {
        let mut strings = StringTable::new();
        let names = WellKnownNames::intern(&mut strings);
        let mut builder = Self {
            strings,
            types: Vec::with_capacity(256),
            methods: Vec::with_capacity(256),
            fields: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
            by_full_name: FxHashMap::default(),
            constructed: FxHashMap::default(),
            method_instances: FxHashMap::default(),
            names,
            core: None,
            core_rows: 0,
        };
        let core = core_lib::bootstrap(&mut builder);
        builder.core = Some(core);
        builder.core_rows = builder.types.len();
        builder
    }

    /// Handles of the bootstrapped core library.
    ///
    /// # Panics
    /// Never after [`UniverseBuilder::new`] returns.
    pub fn core(&self) -> &CoreTypes {
        match &self.core {
            Some(core) => core,
            None => panic!("core library accessed during bootstrap"),
        }
    }

    /// Intern a string.
    pub fn intern(&mut self, s: &str) -> Name {
        self.strings.intern(s)
    }

    /// Look up a declared type by full metadata name (`System.String`,
    /// `Outer+Inner`, `List`1`).
    pub fn find_type(&self, full_name: &str) -> Option<TypeHandle> {
        self.by_full_name.get(full_name).copied()
    }

    /// Metadata name of a type row.
    pub fn type_name(&self, ty: TypeHandle) -> Option<&str> {
        self.ty(ty).map(|row| self.strings.lookup(row.name))
    }

    /// The type row for a handle.
    pub fn ty(&self, ty: TypeHandle) -> Option<&TypeDef> {
        self.types.get(ty.index())
    }

    /// The method row for a handle.
    pub fn method(&self, method: MethodHandle) -> Option<&MethodDef> {
        self.methods.get(method.index())
    }

    // === Type definitions ===

    /// Define a top-level type.
    pub fn define_type(
        &mut self,
        namespace: &str,
        name: &str,
        attributes: TypeAttributes,
    ) -> Result<TypeHandle, MetadataError> {
        let full_name = if namespace.is_empty() {
            name.to_owned()
        } else {
            format!("{namespace}.{name}")
        };
        if self.by_full_name.contains_key(full_name.as_str()) {
            return Err(MetadataError::DuplicateType { full_name });
        }
        let namespace = self.strings.intern(namespace);
        let name = self.strings.intern(name);
        Ok(self.insert_definition(full_name, namespace, name, attributes, None, None))
    }

    /// Define a type nested inside `outer`.
    pub fn define_nested_type(
        &mut self,
        outer: TypeHandle,
        name: &str,
        attributes: TypeAttributes,
    ) -> Result<TypeHandle, MetadataError> {
        self.definition(outer)?;
        let full_name = format!("{}+{name}", self.full_name(outer)?);
        if self.by_full_name.contains_key(full_name.as_str()) {
            return Err(MetadataError::DuplicateType { full_name });
        }
        let name = self.strings.intern(name);
        let handle =
            self.insert_definition(full_name, Name::EMPTY, name, attributes, Some(outer), None);
        self.definition_mut(outer)?.nested_types.push(handle);
        Ok(handle)
    }

    /// Set the base class of a declared type.
    pub fn set_base(&mut self, ty: TypeHandle, base: TypeHandle) -> Result<(), MetadataError> {
        self.definition_mut(ty)?.base = Some(base);
        Ok(())
    }

    /// Add a directly implemented interface.
    pub fn add_interface(
        &mut self,
        ty: TypeHandle,
        interface: TypeHandle,
    ) -> Result<(), MetadataError> {
        self.definition_mut(ty)?.interfaces.push(interface);
        Ok(())
    }

    /// Attach a custom attribute to a declared type.
    pub fn add_type_attribute(
        &mut self,
        ty: TypeHandle,
        attribute: CustomAttribute,
    ) -> Result<(), MetadataError> {
        self.definition_mut(ty)?.custom_attributes.push(attribute);
        Ok(())
    }

    // === Generic parameters ===

    /// Declare the next generic parameter of a type definition.
    pub fn add_type_generic_param(
        &mut self,
        ty: TypeHandle,
        name: &str,
        attributes: GenericParamAttributes,
    ) -> Result<TypeHandle, MetadataError> {
        let position = self.definition(ty)?.generic_params.len();
        let param = self.push_generic_param(GenericOwner::Type(ty), position, name, attributes);
        self.definition_mut(ty)?.generic_params.push(param);
        Ok(param)
    }

    /// Declare the next generic parameter of a method definition.
    pub fn add_method_generic_param(
        &mut self,
        method: MethodHandle,
        name: &str,
        attributes: GenericParamAttributes,
    ) -> Result<TypeHandle, MetadataError> {
        let position = self.method_mut(method)?.generic_params.len();
        let param =
            self.push_generic_param(GenericOwner::Method(method), position, name, attributes);
        self.method_mut(method)?.generic_params.push(param);
        Ok(param)
    }

    /// Add a base-class or interface constraint to a generic parameter.
    pub fn add_constraint(
        &mut self,
        param: TypeHandle,
        constraint: TypeHandle,
    ) -> Result<(), MetadataError> {
        match &mut self.type_mut(param)?.shape {
            TypeShape::GenericParam(def) => {
                def.constraints.push(constraint);
                Ok(())
            }
            _ => Err(MetadataError::NotAGenericParameter { ty: param }),
        }
    }

    /// Replace the special-constraint and variance bits of a generic
    /// parameter.
    pub fn set_generic_param_attributes(
        &mut self,
        param: TypeHandle,
        attributes: GenericParamAttributes,
    ) -> Result<(), MetadataError> {
        match &mut self.type_mut(param)?.shape {
            TypeShape::GenericParam(def) => {
                def.attributes = attributes;
                Ok(())
            }
            _ => Err(MetadataError::NotAGenericParameter { ty: param }),
        }
    }

    // === Methods ===

    /// Define a method on a declared type.
    pub fn define_method(
        &mut self,
        ty: TypeHandle,
        name: &str,
        attributes: MethodAttributes,
        return_type: TypeHandle,
    ) -> Result<MethodHandle, MetadataError> {
        self.definition(ty)?;
        let name = self.strings.intern(name);
        let method = self.push_method(ty, name, attributes, return_type);
        self.definition_mut(ty)?.methods.push(method);
        Ok(method)
    }

    /// Define an instance constructor (`.ctor`) or type initializer
    /// (`.cctor`). The special-name bits are added automatically.
    pub fn define_constructor(
        &mut self,
        ty: TypeHandle,
        attributes: MethodAttributes,
        is_static: bool,
    ) -> Result<MethodHandle, MetadataError> {
        self.definition(ty)?;
        let (name, attributes) = if is_static {
            (self.names.cctor, attributes | MethodAttributes::STATIC)
        } else {
            (self.names.ctor, attributes)
        };
        let attributes =
            attributes | MethodAttributes::SPECIAL_NAME | MethodAttributes::RT_SPECIAL_NAME;
        let void = self.core().void;
        let method = self.push_method(ty, name, attributes, void);
        self.definition_mut(ty)?.methods.push(method);
        Ok(method)
    }

    /// Replace a method's return type. Generic methods are defined first so
    /// their parameters exist before the signature that mentions them.
    pub fn set_return_type(
        &mut self,
        method: MethodHandle,
        return_type: TypeHandle,
    ) -> Result<(), MetadataError> {
        self.method_mut(method)?.return_type = return_type;
        Ok(())
    }

    /// Append a parameter to a method.
    pub fn add_param(
        &mut self,
        method: MethodHandle,
        name: &str,
        ty: TypeHandle,
        attributes: ParamAttributes,
    ) -> Result<ParamHandle, MetadataError> {
        let name = self.strings.intern(name);
        let params = &mut self.method_mut(method)?.params;
        let position = u16::try_from(params.len())
            .unwrap_or_else(|_| panic!("method {method:?} exceeded u16::MAX parameters"));
        params.push(ParamDef {
            name,
            ty,
            attributes,
            default: None,
            custom_attributes: Vec::new(),
        });
        Ok(ParamHandle::new(method, position))
    }

    /// Give a parameter a default value (marks it optional).
    pub fn set_param_default(
        &mut self,
        param: ParamHandle,
        value: Constant,
    ) -> Result<(), MetadataError> {
        let def = self.param_mut(param)?;
        def.attributes |= ParamAttributes::HAS_DEFAULT | ParamAttributes::OPTIONAL;
        def.default = Some(value);
        Ok(())
    }

    /// Attach a custom attribute to a parameter.
    pub fn add_param_attribute(
        &mut self,
        param: ParamHandle,
        attribute: CustomAttribute,
    ) -> Result<(), MetadataError> {
        self.param_mut(param)?.custom_attributes.push(attribute);
        Ok(())
    }

    /// Attach a custom attribute to a method.
    pub fn add_method_attribute(
        &mut self,
        method: MethodHandle,
        attribute: CustomAttribute,
    ) -> Result<(), MetadataError> {
        self.method_mut(method)?.custom_attributes.push(attribute);
        Ok(())
    }

    /// Attach a custom attribute to a method's return value.
    pub fn add_return_attribute(
        &mut self,
        method: MethodHandle,
        attribute: CustomAttribute,
    ) -> Result<(), MetadataError> {
        self.method_mut(method)?.return_attributes.push(attribute);
        Ok(())
    }

    /// Add a required modifier (`modreq`) to a method's return type.
    pub fn add_return_modifier(
        &mut self,
        method: MethodHandle,
        modifier: TypeHandle,
    ) -> Result<(), MetadataError> {
        self.method_mut(method)?.return_modifiers.push(modifier);
        Ok(())
    }

    // === Fields, properties, events ===

    /// Define a field on a declared type.
    pub fn define_field(
        &mut self,
        ty: TypeHandle,
        name: &str,
        attributes: FieldAttributes,
        field_type: TypeHandle,
    ) -> Result<FieldHandle, MetadataError> {
        self.definition(ty)?;
        let name = self.strings.intern(name);
        let field = FieldHandle::from_raw(next_index(self.fields.len()));
        self.fields.push(FieldDef {
            name,
            declaring_type: ty,
            attributes,
            ty: field_type,
            constant: None,
            custom_attributes: Vec::new(),
        });
        self.definition_mut(ty)?.fields.push(field);
        Ok(field)
    }

    /// Give a literal field its value.
    pub fn set_field_constant(
        &mut self,
        field: FieldHandle,
        value: Constant,
    ) -> Result<(), MetadataError> {
        let def = self.field_mut(field)?;
        def.attributes |= FieldAttributes::HAS_DEFAULT;
        def.constant = Some(value);
        Ok(())
    }

    /// Attach a custom attribute to a field.
    pub fn add_field_attribute(
        &mut self,
        field: FieldHandle,
        attribute: CustomAttribute,
    ) -> Result<(), MetadataError> {
        self.field_mut(field)?.custom_attributes.push(attribute);
        Ok(())
    }

    /// Define a property over existing accessor methods.
    pub fn define_property(
        &mut self,
        ty: TypeHandle,
        name: &str,
        property_type: TypeHandle,
        getter: Option<MethodHandle>,
        setter: Option<MethodHandle>,
    ) -> Result<PropertyHandle, MetadataError> {
        self.definition(ty)?;
        let name = self.strings.intern(name);
        let property = PropertyHandle::from_raw(next_index(self.properties.len()));
        self.properties.push(PropertyDef {
            name,
            declaring_type: ty,
            ty: property_type,
            getter,
            setter,
            custom_attributes: Vec::new(),
        });
        self.definition_mut(ty)?.properties.push(property);
        Ok(property)
    }

    /// Attach a custom attribute to a property.
    pub fn add_property_attribute(
        &mut self,
        property: PropertyHandle,
        attribute: CustomAttribute,
    ) -> Result<(), MetadataError> {
        let index = property.index();
        self.properties
            .get_mut(index)
            .ok_or(MetadataError::UnknownHandle { kind: "property", index })?
            .custom_attributes
            .push(attribute);
        Ok(())
    }

    /// Define an event over existing accessor methods.
    pub fn define_event(
        &mut self,
        ty: TypeHandle,
        name: &str,
        handler_type: TypeHandle,
        add: Option<MethodHandle>,
        remove: Option<MethodHandle>,
    ) -> Result<EventHandle, MetadataError> {
        self.definition(ty)?;
        let name = self.strings.intern(name);
        let event = EventHandle::from_raw(next_index(self.events.len()));
        self.events.push(EventDef {
            name,
            declaring_type: ty,
            handler_type,
            add,
            remove,
            raise: None,
            custom_attributes: Vec::new(),
        });
        self.definition_mut(ty)?.events.push(event);
        Ok(event)
    }

    /// Attach a custom attribute to an event.
    pub fn add_event_attribute(
        &mut self,
        event: EventHandle,
        attribute: CustomAttribute,
    ) -> Result<(), MetadataError> {
        let index = event.index();
        self.events
            .get_mut(index)
            .ok_or(MetadataError::UnknownHandle { kind: "event", index })?
            .custom_attributes
            .push(attribute);
        Ok(())
    }

    // === Constructed types ===

    /// Instantiate a generic type definition.
    pub fn instantiate(
        &mut self,
        definition: TypeHandle,
        args: &[TypeHandle],
    ) -> Result<TypeHandle, MetadataError> {
        let expected = self.definition(definition)?.generic_params.len();
        if expected != args.len() {
            return Err(MetadataError::ArityMismatch {
                ty: definition,
                expected,
                found: args.len(),
            });
        }
        let key = ConstructedKey::Instance(definition, args.to_vec());
        if let Some(&existing) = self.constructed.get(&key) {
            return Ok(existing);
        }
        let def_row = self.type_row(definition)?;
        let (name, namespace) = (def_row.name, def_row.namespace);
        let shape = TypeShape::Instance(GenericInstance {
            definition,
            args: args.to_vec(),
        });
        Ok(self.push_constructed(key, name, namespace, shape))
    }

    /// `element[]` for rank 1, `element[,]` for rank 2, and so on.
    pub fn array(&mut self, element: TypeHandle, rank: u8) -> Result<TypeHandle, MetadataError> {
        let rank = rank.max(1);
        let key = ConstructedKey::Array(element, rank);
        if let Some(&existing) = self.constructed.get(&key) {
            return Ok(existing);
        }
        let commas = ",".repeat(usize::from(rank) - 1);
        let name = format!("{}[{commas}]", self.element_name(element)?);
        let name = self.strings.intern(&name);
        Ok(self.push_constructed(key, name, Name::EMPTY, TypeShape::Array { element, rank }))
    }

    /// `ref element`.
    pub fn by_ref(&mut self, element: TypeHandle) -> Result<TypeHandle, MetadataError> {
        let key = ConstructedKey::ByRef(element);
        if let Some(&existing) = self.constructed.get(&key) {
            return Ok(existing);
        }
        let name = format!("{}&", self.element_name(element)?);
        let name = self.strings.intern(&name);
        Ok(self.push_constructed(key, name, Name::EMPTY, TypeShape::ByRef(element)))
    }

    /// `element*`.
    pub fn pointer(&mut self, element: TypeHandle) -> Result<TypeHandle, MetadataError> {
        let key = ConstructedKey::Pointer(element);
        if let Some(&existing) = self.constructed.get(&key) {
            return Ok(existing);
        }
        let name = format!("{}*", self.element_name(element)?);
        let name = self.strings.intern(&name);
        Ok(self.push_constructed(key, name, Name::EMPTY, TypeShape::Pointer(element)))
    }

    /// Instantiate a generic method definition, substituting its generic
    /// parameters throughout the return and parameter types.
    pub fn instantiate_method(
        &mut self,
        method: MethodHandle,
        args: &[TypeHandle],
    ) -> Result<MethodHandle, MetadataError> {
        let def = self
            .methods
            .get(method.index())
            .ok_or(MetadataError::UnknownHandle {
                kind: "method",
                index: method.index(),
            })?;
        let expected = def.generic_params.len();
        if expected == 0 || expected != args.len() {
            return Err(MetadataError::MethodArityMismatch {
                method,
                expected,
                found: args.len(),
            });
        }
        let instance = MethodInstance {
            definition: method,
            args: args.to_vec(),
        };
        if let Some(&existing) = self.method_instances.get(&instance) {
            return Ok(existing);
        }

        let substitution: FxHashMap<TypeHandle, TypeHandle> = def
            .generic_params
            .iter()
            .copied()
            .zip(args.iter().copied())
            .collect();
        let mut row = def.clone();
        row.return_type = self.substitute(row.return_type, &substitution)?;
        for param in &mut row.params {
            param.ty = self.substitute(param.ty, &substitution)?;
        }
        row.generic_params = Vec::new();
        row.instantiation = Some(instance.clone());

        let handle = MethodHandle::from_raw(next_index(self.methods.len()));
        self.methods.push(row);
        self.method_instances.insert(instance, handle);
        Ok(handle)
    }

    /// Freeze the tables into a universe.
    pub fn finish(self) -> Universe {
        let core = match self.core {
            Some(core) => core,
            None => panic!("builder finished during bootstrap"),
        };
        tracing::debug!(
            types = self.types.len(),
            methods = self.methods.len(),
            fields = self.fields.len(),
            "universe frozen"
        );
        Universe {
            strings: self.strings,
            types: self.types,
            methods: self.methods,
            fields: self.fields,
            properties: self.properties,
            events: self.events,
            by_full_name: self.by_full_name,
            names: self.names,
            core,
            core_rows: self.core_rows,
        }
    }

    // === Internals shared with the core-library bootstrap ===

    pub(crate) fn insert_definition(
        &mut self,
        full_name: String,
        namespace: Name,
        name: Name,
        attributes: TypeAttributes,
        declaring_type: Option<TypeHandle>,
        base: Option<TypeHandle>,
    ) -> TypeHandle {
        let handle = TypeHandle::from_raw(next_index(self.types.len()));
        self.types.push(TypeDef {
            name,
            namespace,
            shape: TypeShape::Definition(TypeDefinition {
                attributes,
                declaring_type,
                base,
                ..TypeDefinition::default()
            }),
        });
        self.by_full_name.insert(full_name.into_boxed_str(), handle);
        handle
    }

    fn push_method(
        &mut self,
        ty: TypeHandle,
        name: Name,
        attributes: MethodAttributes,
        return_type: TypeHandle,
    ) -> MethodHandle {
        let method = MethodHandle::from_raw(next_index(self.methods.len()));
        self.methods.push(MethodDef {
            name,
            declaring_type: ty,
            attributes,
            return_type,
            return_modifiers: Vec::new(),
            return_attributes: Vec::new(),
            params: Vec::new(),
            generic_params: Vec::new(),
            instantiation: None,
            custom_attributes: Vec::new(),
        });
        method
    }

    fn push_generic_param(
        &mut self,
        owner: GenericOwner,
        position: usize,
        name: &str,
        attributes: GenericParamAttributes,
    ) -> TypeHandle {
        let position = u16::try_from(position)
            .unwrap_or_else(|_| panic!("{owner:?} exceeded u16::MAX generic parameters"));
        let name = self.strings.intern(name);
        let handle = TypeHandle::from_raw(next_index(self.types.len()));
        self.types.push(TypeDef {
            name,
            namespace: Name::EMPTY,
            shape: TypeShape::GenericParam(GenericParamDef {
                position,
                owner,
                attributes,
                constraints: Vec::new(),
            }),
        });
        handle
    }

    fn push_constructed(
        &mut self,
        key: ConstructedKey,
        name: Name,
        namespace: Name,
        shape: TypeShape,
    ) -> TypeHandle {
        let handle = TypeHandle::from_raw(next_index(self.types.len()));
        self.types.push(TypeDef {
            name,
            namespace,
            shape,
        });
        self.constructed.insert(key, handle);
        handle
    }

    fn substitute(
        &mut self,
        ty: TypeHandle,
        substitution: &FxHashMap<TypeHandle, TypeHandle>,
    ) -> Result<TypeHandle, MetadataError> {
        if let Some(&replacement) = substitution.get(&ty) {
            return Ok(replacement);
        }
        let shape = self.type_row(ty)?.shape.clone();
        match shape {
            TypeShape::Instance(instance) => {
                let mut args = Vec::with_capacity(instance.args.len());
                for arg in instance.args {
                    args.push(self.substitute(arg, substitution)?);
                }
                self.instantiate(instance.definition, &args)
            }
            TypeShape::Array { element, rank } => {
                let element = self.substitute(element, substitution)?;
                self.array(element, rank)
            }
            TypeShape::ByRef(element) => {
                let element = self.substitute(element, substitution)?;
                self.by_ref(element)
            }
            TypeShape::Pointer(element) => {
                let element = self.substitute(element, substitution)?;
                self.pointer(element)
            }
            TypeShape::Definition(_) | TypeShape::GenericParam(_) => Ok(ty),
        }
    }

    fn type_row(&self, ty: TypeHandle) -> Result<&TypeDef, MetadataError> {
        self.types.get(ty.index()).ok_or(MetadataError::UnknownHandle {
            kind: "type",
            index: ty.index(),
        })
    }

    fn type_mut(&mut self, ty: TypeHandle) -> Result<&mut TypeDef, MetadataError> {
        self.types.get_mut(ty.index()).ok_or(MetadataError::UnknownHandle {
            kind: "type",
            index: ty.index(),
        })
    }

    fn method_mut(&mut self, method: MethodHandle) -> Result<&mut MethodDef, MetadataError> {
        self.methods
            .get_mut(method.index())
            .ok_or(MetadataError::UnknownHandle {
                kind: "method",
                index: method.index(),
            })
    }

    fn field_mut(&mut self, field: FieldHandle) -> Result<&mut FieldDef, MetadataError> {
        self.fields
            .get_mut(field.index())
            .ok_or(MetadataError::UnknownHandle {
                kind: "field",
                index: field.index(),
            })
    }

    fn param_mut(&mut self, param: ParamHandle) -> Result<&mut ParamDef, MetadataError> {
        let index = usize::from(param.position);
        self.method_mut(param.method)?
            .params
            .get_mut(index)
            .ok_or(MetadataError::UnknownHandle {
                kind: "parameter",
                index,
            })
    }

    fn definition(&self, ty: TypeHandle) -> Result<&TypeDefinition, MetadataError> {
        self.type_row(ty)?
            .shape
            .as_definition()
            .ok_or(MetadataError::NotADefinition { ty })
    }

    fn definition_mut(&mut self, ty: TypeHandle) -> Result<&mut TypeDefinition, MetadataError> {
        match &mut self.type_mut(ty)?.shape {
            TypeShape::Definition(def) => Ok(def),
            _ => Err(MetadataError::NotADefinition { ty }),
        }
    }

    fn element_name(&self, element: TypeHandle) -> Result<&str, MetadataError> {
        Ok(self.strings.lookup(self.type_row(element)?.name))
    }

    fn full_name(&self, ty: TypeHandle) -> Result<String, MetadataError> {
        let row = self.type_row(ty)?;
        let name = self.strings.lookup(row.name);
        Ok(match row.shape.as_definition().and_then(|def| def.declaring_type) {
            Some(outer) => format!("{}+{name}", self.full_name(outer)?),
            None => {
                let namespace = self.strings.lookup(row.namespace);
                if namespace.is_empty() {
                    name.to_owned()
                } else {
                    format!("{namespace}.{name}")
                }
            }
        })
    }
}

impl Default for UniverseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
