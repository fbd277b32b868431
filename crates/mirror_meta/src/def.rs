//! Definition tables of a universe.
//!
//! These are plain records: every cross-reference is a handle, never a
//! pointer, so the tables can be shared freely once the universe is frozen.

use crate::flags::{
    FieldAttributes, GenericParamAttributes, MethodAttributes, ParamAttributes, TypeAttributes,
};
use crate::{EventHandle, FieldHandle, MethodHandle, Name, PropertyHandle, TypeHandle};

/// A row of the type table.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeDef {
    /// Metadata name, including any generic arity suffix (`List`1`).
    ///
    /// Constructed types carry a synthesized name (`Int32[]`, `List`1`).
    pub name: Name,
    /// Namespace; empty for nested types and constructed types.
    pub namespace: Name,
    /// What kind of type this row describes.
    pub shape: TypeShape,
}

/// The structural kind of a type row.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeShape {
    /// A declared class, struct, interface, enum, or delegate.
    Definition(TypeDefinition),
    /// A closed or partially closed generic instantiation.
    Instance(GenericInstance),
    /// `element[]` (rank 1) or `element[,]` (rank 2), etc.
    Array { element: TypeHandle, rank: u8 },
    /// `ref element`.
    ByRef(TypeHandle),
    /// `element*`.
    Pointer(TypeHandle),
    /// A generic parameter of a type or method definition.
    GenericParam(GenericParamDef),
}

impl TypeShape {
    /// The definition record, if this row is a declared type.
    pub fn as_definition(&self) -> Option<&TypeDefinition> {
        match self {
            TypeShape::Definition(def) => Some(def),
            _ => None,
        }
    }

    /// The generic parameter record, if this row is a generic parameter.
    pub fn as_generic_param(&self) -> Option<&GenericParamDef> {
        match self {
            TypeShape::GenericParam(param) => Some(param),
            _ => None,
        }
    }
}

/// A declared type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypeDefinition {
    pub attributes: TypeAttributes,
    /// Enclosing type for nested types.
    pub declaring_type: Option<TypeHandle>,
    /// Base class; `None` for interfaces and `System.Object`.
    pub base: Option<TypeHandle>,
    /// Directly implemented interfaces, in declaration order.
    pub interfaces: Vec<TypeHandle>,
    /// This type's own generic parameters, in position order.
    pub generic_params: Vec<TypeHandle>,
    pub methods: Vec<MethodHandle>,
    pub fields: Vec<FieldHandle>,
    pub properties: Vec<PropertyHandle>,
    pub events: Vec<EventHandle>,
    pub nested_types: Vec<TypeHandle>,
    pub custom_attributes: Vec<CustomAttribute>,
}

/// A generic type instantiation such as `List<int>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GenericInstance {
    pub definition: TypeHandle,
    pub args: Vec<TypeHandle>,
}

/// Owner of a generic parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GenericOwner {
    Type(TypeHandle),
    Method(MethodHandle),
}

/// A generic parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct GenericParamDef {
    pub position: u16,
    pub owner: GenericOwner,
    pub attributes: GenericParamAttributes,
    /// Base class and interface constraints, in declaration order.
    pub constraints: Vec<TypeHandle>,
}

/// A row of the method table. Constructors are methods named `.ctor`
/// (instance) or `.cctor` (type initializer) with `RT_SPECIAL_NAME`.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodDef {
    pub name: Name,
    pub declaring_type: TypeHandle,
    pub attributes: MethodAttributes,
    pub return_type: TypeHandle,
    /// Required custom modifiers on the return type (`modreq`).
    pub return_modifiers: Vec<TypeHandle>,
    /// Custom attributes applied to the return value.
    pub return_attributes: Vec<CustomAttribute>,
    pub params: Vec<ParamDef>,
    /// Own generic parameters; empty for instantiations.
    pub generic_params: Vec<TypeHandle>,
    /// Set when this row is an instantiation of a generic method.
    pub instantiation: Option<MethodInstance>,
    pub custom_attributes: Vec<CustomAttribute>,
}

/// A generic method instantiation such as `Cast<int>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodInstance {
    pub definition: MethodHandle,
    pub args: Vec<TypeHandle>,
}

/// A method parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamDef {
    pub name: Name,
    pub ty: TypeHandle,
    pub attributes: ParamAttributes,
    pub default: Option<Constant>,
    pub custom_attributes: Vec<CustomAttribute>,
}

/// A row of the field table.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    pub name: Name,
    pub declaring_type: TypeHandle,
    pub attributes: FieldAttributes,
    pub ty: TypeHandle,
    /// Value of a literal field.
    pub constant: Option<Constant>,
    pub custom_attributes: Vec<CustomAttribute>,
}

/// A row of the property table. Index parameters are the getter's
/// parameters (or the setter's minus the trailing value parameter).
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDef {
    pub name: Name,
    pub declaring_type: TypeHandle,
    pub ty: TypeHandle,
    pub getter: Option<MethodHandle>,
    pub setter: Option<MethodHandle>,
    pub custom_attributes: Vec<CustomAttribute>,
}

/// A row of the event table.
#[derive(Clone, Debug, PartialEq)]
pub struct EventDef {
    pub name: Name,
    pub declaring_type: TypeHandle,
    pub handler_type: TypeHandle,
    pub add: Option<MethodHandle>,
    pub remove: Option<MethodHandle>,
    pub raise: Option<MethodHandle>,
    pub custom_attributes: Vec<CustomAttribute>,
}

/// A custom attribute instance.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomAttribute {
    /// The attribute class.
    pub ty: TypeHandle,
    /// Positional constructor arguments.
    pub fixed_args: Vec<Constant>,
    /// `Name = value` arguments.
    pub named_args: Vec<(Name, Constant)>,
}

impl CustomAttribute {
    /// An attribute with no arguments.
    pub fn marker(ty: TypeHandle) -> Self {
        Self {
            ty,
            fixed_args: Vec::new(),
            named_args: Vec::new(),
        }
    }

    /// An attribute with positional arguments only.
    pub fn with_args(ty: TypeHandle, fixed_args: Vec<Constant>) -> Self {
        Self {
            ty,
            fixed_args,
            named_args: Vec::new(),
        }
    }
}

/// A metadata constant: field literal, parameter default, or attribute
/// argument.
#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    Null,
    /// `default` of a value type.
    Default,
    Bool(bool),
    Char(char),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(Box<str>),
    /// `typeof(T)` attribute argument.
    Type(TypeHandle),
}
