//! Errors raised while building a universe.

use std::fmt;

use crate::{MethodHandle, TypeHandle};

/// Builder misuse: handles the builder never issued, or well-formed handles
/// used in the wrong place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetadataError {
    /// A handle indexes past the end of its table, usually because it was
    /// issued by a different builder.
    UnknownHandle { kind: &'static str, index: usize },
    /// A member, base, or generic parameter was attached to a type row
    /// that is not a declared type.
    NotADefinition { ty: TypeHandle },
    /// A constraint was attached to a type row that is not a generic
    /// parameter.
    NotAGenericParameter { ty: TypeHandle },
    /// Two top-level or nested types share a full metadata name.
    DuplicateType { full_name: String },
    /// A generic definition was instantiated with the wrong number of
    /// arguments.
    ArityMismatch {
        ty: TypeHandle,
        expected: usize,
        found: usize,
    },
    /// A generic method instantiation was requested for a method with no
    /// generic parameters, or with the wrong number of arguments.
    MethodArityMismatch {
        method: MethodHandle,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataError::UnknownHandle { kind, index } => {
                write!(f, "no {kind} row #{index} in this universe")
            }
            MetadataError::NotADefinition { ty } => {
                write!(f, "{ty:?} is not a type definition")
            }
            MetadataError::NotAGenericParameter { ty } => {
                write!(f, "{ty:?} is not a generic parameter")
            }
            MetadataError::DuplicateType { full_name } => {
                write!(f, "type `{full_name}` is defined twice")
            }
            MetadataError::ArityMismatch {
                ty,
                expected,
                found,
            } => write!(
                f,
                "{ty:?} takes {expected} type argument(s), {found} supplied"
            ),
            MetadataError::MethodArityMismatch {
                method,
                expected,
                found,
            } => write!(
                f,
                "{method:?} takes {expected} type argument(s), {found} supplied"
            ),
        }
    }
}

impl std::error::Error for MetadataError {}
