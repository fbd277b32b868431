//! Symbol lookup and derivation errors.

use std::fmt;

/// Failure to resolve a symbol or derive one of its attributes.
///
/// Errors are local to one call and never retried. Errors raised while
/// deriving a memoized attribute are memoized with it, so asking again
/// returns the same error without recomputing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SymbolError {
    /// A lookup by name, handle, or identity found nothing.
    SymbolNotFound { what: String },
    /// The attribute is not meaningful for this kind of symbol.
    UnsupportedSymbolKind {
        kind: &'static str,
        attribute: &'static str,
    },
    /// Metadata that cannot be classified (e.g. an access field with the
    /// reserved encoding, or a property with no accessors).
    InvariantViolation {
        symbol: String,
        reason: &'static str,
    },
}

impl SymbolError {
    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        SymbolError::SymbolNotFound { what: what.into() }
    }

    pub(crate) fn unsupported(kind: &'static str, attribute: &'static str) -> Self {
        SymbolError::UnsupportedSymbolKind { kind, attribute }
    }

    pub(crate) fn invariant(symbol: impl Into<String>, reason: &'static str) -> Self {
        SymbolError::InvariantViolation {
            symbol: symbol.into(),
            reason,
        }
    }
}

impl fmt::Display for SymbolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolError::SymbolNotFound { what } => write!(f, "symbol not found: {what}"),
            SymbolError::UnsupportedSymbolKind { kind, attribute } => {
                write!(f, "a {kind} symbol has no {attribute}")
            }
            SymbolError::InvariantViolation { symbol, reason } => {
                write!(f, "cannot classify `{symbol}`: {reason}")
            }
        }
    }
}

impl std::error::Error for SymbolError {}

/// Result alias for symbol operations.
pub type SymbolResult<T> = Result<T, SymbolError>;
