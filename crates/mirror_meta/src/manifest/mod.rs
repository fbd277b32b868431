//! JSON declaration manifests.
//!
//! A manifest describes a set of C# declarations; loading it builds a
//! [`Universe`] with those types on top of the core library. Type
//! references are written the way C# source writes them (`List<int>`,
//! `T[]`, `ref readonly int`, `int?`, `(int, string)`, `Outer.Inner`) and
//! are resolved against the `usings`, the enclosing namespace and types,
//! and in-scope generic parameters.
//!
//! ```json
//! {
//!   "usings": ["System.Collections.Generic"],
//!   "types": [{
//!     "namespace": "Acme",
//!     "name": "Box",
//!     "kind": "class",
//!     "access": "public",
//!     "generic_params": [{ "name": "T", "constraints": ["class", "new()"] }],
//!     "methods": [{ "name": "Get", "returns": "T", "access": "public" }]
//!   }]
//! }
//! ```

mod lower;
mod type_ref;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{MetadataError, Universe};

pub use type_ref::{parse as parse_type_ref, TypeRef, TypeSyntaxError};

/// Top-level manifest document.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Namespaces searched for unqualified type names, after the
    /// enclosing namespace and `System`.
    #[serde(default)]
    pub usings: Vec<String>,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

/// Declared type category.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

/// A type declaration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDecl {
    /// Ignored for nested types.
    #[serde(default)]
    pub namespace: String,
    /// Simple name without arity suffix; the suffix is derived from
    /// `generic_params`.
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    /// `public`, `internal`, and for nested types also `private`,
    /// `protected`, `protected internal`, `private protected`.
    #[serde(default)]
    pub access: Option<String>,
    /// `static`, `abstract`, `sealed`, `readonly`, `ref`.
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub generic_params: Vec<GenericParamDecl>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeDecl>,
    #[serde(default)]
    pub nested: Vec<TypeDecl>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub constructors: Vec<ConstructorDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default)]
    pub properties: Vec<PropertyDecl>,
    #[serde(default)]
    pub events: Vec<EventDecl>,
    /// Enum members.
    #[serde(default)]
    pub values: Vec<EnumValueDecl>,
    /// Enum underlying type; `int` when absent.
    #[serde(default)]
    pub underlying: Option<String>,
    /// Delegate return type; `void` when absent.
    #[serde(default)]
    pub returns: Option<String>,
    /// Delegate parameters.
    #[serde(default)]
    pub params: Vec<ParamDecl>,
}

/// A generic parameter declaration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenericParamDecl {
    pub name: String,
    /// `in` or `out`.
    #[serde(default)]
    pub variance: Option<String>,
    /// `class`, `struct`, `new()`, or type references, in any order.
    #[serde(default)]
    pub constraints: Vec<String>,
}

/// A custom attribute application.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeDecl {
    /// Attribute class; the `Attribute` suffix may be omitted.
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
    #[serde(default)]
    pub named: serde_json::Map<String, serde_json::Value>,
}

/// A field declaration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub access: Option<String>,
    /// `static`, `readonly`, `const`.
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// Value of a `const` field.
    #[serde(default, deserialize_with = "present")]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub attributes: Vec<AttributeDecl>,
}

/// A constructor declaration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstructorDecl {
    #[serde(default)]
    pub access: Option<String>,
    /// `static` declares the type initializer.
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    #[serde(default)]
    pub attributes: Vec<AttributeDecl>,
}

/// A method declaration. Operators use their metadata names
/// (`op_Addition`, `op_Implicit`).
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodDecl {
    pub name: String,
    /// Return type; `void` when absent.
    #[serde(default)]
    pub returns: Option<String>,
    #[serde(default)]
    pub access: Option<String>,
    /// `static`, `abstract`, `virtual`, `override`, `sealed`, `new`,
    /// `async`, `extern`, `readonly`.
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub generic_params: Vec<GenericParamDecl>,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    #[serde(default)]
    pub attributes: Vec<AttributeDecl>,
    #[serde(default)]
    pub return_attributes: Vec<AttributeDecl>,
}

/// A parameter declaration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// `ref`, `in`, `out`, `params`, or `this` (extension receiver).
    #[serde(default)]
    pub modifier: Option<String>,
    /// Default value; JSON `null` on a value type means `default`.
    #[serde(default, deserialize_with = "present")]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub attributes: Vec<AttributeDecl>,
}

/// An accessor declaration; a bare `true` declares an accessor with the
/// property's access.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum AccessorDecl {
    Present(bool),
    Access { access: String },
}

/// A property or indexer declaration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyDecl {
    /// `this` declares an indexer (metadata name `Item`).
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub access: Option<String>,
    /// `static`, `abstract`, `virtual`, `override`, `sealed`, `new`.
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub get: Option<AccessorDecl>,
    #[serde(default)]
    pub set: Option<AccessorDecl>,
    /// Makes the setter an `init` accessor.
    #[serde(default)]
    pub init: bool,
    /// Index parameters.
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    #[serde(default)]
    pub attributes: Vec<AttributeDecl>,
}

/// An event declaration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeDecl>,
}

/// An enum member.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumValueDecl {
    pub name: String,
    pub value: serde_json::Number,
}

fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Failure to load a manifest.
#[derive(Debug)]
pub enum ManifestError {
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
    Json(serde_json::Error),
    /// Builder rejected a declaration (e.g. a duplicate type).
    Metadata(MetadataError),
    /// A type reference names nothing in scope.
    UnresolvedType { reference: String, context: String },
    /// A type reference is not valid C# type syntax.
    TypeSyntax {
        reference: String,
        error: TypeSyntaxError,
    },
    /// A modifier or access keyword is not valid where it appears.
    InvalidModifier { modifier: String, context: String },
    /// A constant does not fit the declared type.
    InvalidConstant { context: String },
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestError::Io { path, error } => {
                write!(f, "cannot read {}: {error}", path.display())
            }
            ManifestError::Json(error) => write!(f, "invalid manifest: {error}"),
            ManifestError::Metadata(error) => write!(f, "{error}"),
            ManifestError::UnresolvedType { reference, context } => {
                write!(f, "unresolved type `{reference}` in {context}")
            }
            ManifestError::TypeSyntax { reference, error } => {
                write!(f, "malformed type `{reference}`: {error}")
            }
            ManifestError::InvalidModifier { modifier, context } => {
                write!(f, "`{modifier}` is not valid on {context}")
            }
            ManifestError::InvalidConstant { context } => {
                write!(f, "constant does not fit the type of {context}")
            }
        }
    }
}

impl std::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ManifestError::Io { error, .. } => Some(error),
            ManifestError::Json(error) => Some(error),
            ManifestError::Metadata(error) => Some(error),
            ManifestError::TypeSyntax { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<MetadataError> for ManifestError {
    fn from(error: MetadataError) -> Self {
        ManifestError::Metadata(error)
    }
}

/// Build a universe from manifest JSON text.
pub fn load_str(json: &str) -> Result<Universe, ManifestError> {
    let manifest: Manifest = serde_json::from_str(json).map_err(ManifestError::Json)?;
    load(&manifest)
}

/// Build a universe from a manifest file.
pub fn load_path(path: &Path) -> Result<Universe, ManifestError> {
    let json = std::fs::read_to_string(path).map_err(|error| ManifestError::Io {
        path: path.to_owned(),
        error,
    })?;
    load_str(&json)
}

/// Build a universe from a parsed manifest.
#[tracing::instrument(level = "debug", skip_all, fields(types = manifest.types.len()))]
pub fn load(manifest: &Manifest) -> Result<Universe, ManifestError> {
    lower::lower(manifest)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
