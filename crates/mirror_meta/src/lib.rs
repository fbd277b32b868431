//! Loaded type metadata for Mirror.
//!
//! A [`Universe`] is an immutable, ECMA-335 shaped view of a set of loaded
//! types: declared types with their members, constructed types (generic
//! instances, arrays, by-refs, pointers), generic parameters, and custom
//! attributes. Everything is addressed by 32-bit handles.
//!
//! # Building
//!
//! - [`UniverseBuilder`] defines types and members programmatically. Every
//!   builder starts with the core library bootstrapped ([`CoreTypes`]).
//! - With the `manifest` feature, [`manifest::load_str`] builds a universe
//!   from a JSON declaration manifest with C#-style type references.

mod builder;
mod core_lib;
mod def;
mod error;
mod flags;
mod handle;
mod name;
mod universe;

#[cfg(feature = "manifest")]
pub mod manifest;

pub use builder::UniverseBuilder;
pub use core_lib::CoreTypes;
pub use def::{
    Constant, CustomAttribute, EventDef, FieldDef, GenericInstance, GenericOwner,
    GenericParamDef, MethodDef, MethodInstance, ParamDef, PropertyDef, TypeDef, TypeDefinition,
    TypeShape,
};
pub use error::MetadataError;
pub use flags::{
    FieldAttributes, GenericParamAttributes, MemberAccess, MethodAttributes, ParamAttributes,
    TypeAttributes, TypeVisibility, Variance,
};
pub use handle::{EventHandle, FieldHandle, MethodHandle, ParamHandle, PropertyHandle, TypeHandle};
pub use name::{Name, StringTable};
pub use universe::{strip_arity, Universe, WellKnownNames};

// Handles are stored by the million in descriptor keys.
#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{Name, ParamHandle, TypeHandle};
    const _: () = assert!(std::mem::size_of::<Name>() == 4);
    const _: () = assert!(std::mem::size_of::<TypeHandle>() == 4);
    const _: () = assert!(std::mem::size_of::<ParamHandle>() == 8);
}
