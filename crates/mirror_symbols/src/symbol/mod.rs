//! Symbol descriptors.
//!
//! A [`Symbol`] is the cached, attribute-bearing view of one declared (or
//! constructed) entity. The kind is a closed enum, [`SymbolKind`]; every
//! kind-specific question is answered by the variant payload.
//!
//! # Derived attributes
//!
//! Flags, access, signatures, display names, awaitability, and
//! extension-method-hood are derived on first read through a [`Memo`] and
//! then fixed for the lifetime of the cache. Descriptors never own other
//! descriptors: references to related symbols (return types, accessors,
//! declaring types) are re-resolved through the [`SymbolCache`], so two
//! references to the same symbol are the same `Arc`.

mod derive;
mod kinds;

use std::sync::Arc;

use mirror_meta::CustomAttribute;

use crate::key::{NativeHandle, SymbolKey};
use crate::memo::Memo;
use crate::{Access, SymbolCache, SymbolError, SymbolFlags, SymbolResult};

pub use kinds::{
    ConstructorSymbol, EventSymbol, FieldSymbol, MethodSymbol, ParameterSymbol, PropertySymbol,
    TypeCategory, TypeSymbol,
};

/// Number of option combinations memoized per renderer.
pub(crate) const RENDER_VARIANTS: usize = 4;

/// A symbol descriptor.
pub struct Symbol {
    key: SymbolKey,
    kind: SymbolKind,
    flags: Memo<SymbolFlags>,
    access: Memo<Access>,
    pub(crate) signatures: [Memo<String>; RENDER_VARIANTS],
    pub(crate) display_names: [Memo<String>; RENDER_VARIANTS],
}

/// The closed set of symbol kinds.
pub enum SymbolKind {
    Type(TypeSymbol),
    Method(MethodSymbol),
    Constructor(ConstructorSymbol),
    Field(FieldSymbol),
    Property(PropertySymbol),
    Event(EventSymbol),
    Parameter(ParameterSymbol),
}

impl Symbol {
    /// Build the descriptor for a validated identity.
    pub(crate) fn new(key: SymbolKey) -> Self {
        let kind = match key.handle() {
            NativeHandle::Type(handle) => SymbolKind::Type(TypeSymbol::new(handle)),
            NativeHandle::Method(handle) => SymbolKind::Method(MethodSymbol::new(handle)),
            NativeHandle::Constructor(handle) => {
                SymbolKind::Constructor(ConstructorSymbol::new(handle))
            }
            NativeHandle::Field(handle) => SymbolKind::Field(FieldSymbol::new(handle)),
            NativeHandle::Property(handle) => SymbolKind::Property(PropertySymbol::new(handle)),
            NativeHandle::Event(handle) => SymbolKind::Event(EventSymbol::new(handle)),
            NativeHandle::Parameter(handle) => {
                SymbolKind::Parameter(ParameterSymbol::new(handle))
            }
        };
        Self {
            key,
            kind,
            flags: Memo::new(),
            access: Memo::new(),
            signatures: std::array::from_fn(|_| Memo::new()),
            display_names: std::array::from_fn(|_| Memo::new()),
        }
    }

    #[inline]
    pub fn key(&self) -> &SymbolKey {
        &self.key
    }

    #[inline]
    pub fn kind(&self) -> &SymbolKind {
        &self.kind
    }

    #[inline]
    pub fn handle(&self) -> NativeHandle {
        self.key.handle()
    }

    /// `"type"`, `"method"`, ... for messages.
    #[inline]
    pub fn kind_name(&self) -> &'static str {
        self.key.handle().kind_name()
    }

    /// Metadata name (`List`1`, `.ctor`, `get_Item`, `op_Addition`).
    pub fn name<'c>(&self, cache: &'c SymbolCache) -> &'c str {
        cache.universe().str(self.key.name())
    }

    /// The enclosing type, if any.
    pub fn declaring_type(&self, cache: &SymbolCache) -> SymbolResult<Option<Arc<Symbol>>> {
        self.key
            .declaring()
            .map(|ty| cache.resolve_type(ty))
            .transpose()
    }

    /// Custom attributes as stored in metadata, compiler markers included.
    pub fn custom_attributes<'c>(&self, cache: &'c SymbolCache) -> &'c [CustomAttribute] {
        let universe = cache.universe();
        let attributes = match &self.kind {
            SymbolKind::Type(ty) => universe
                .underlying_definition(ty.handle())
                .map(|def| def.custom_attributes.as_slice()),
            SymbolKind::Method(method) => universe
                .method(method.handle())
                .map(|def| def.custom_attributes.as_slice()),
            SymbolKind::Constructor(ctor) => universe
                .method(ctor.handle())
                .map(|def| def.custom_attributes.as_slice()),
            SymbolKind::Field(field) => universe
                .field(field.handle())
                .map(|def| def.custom_attributes.as_slice()),
            SymbolKind::Property(property) => universe
                .property(property.handle())
                .map(|def| def.custom_attributes.as_slice()),
            SymbolKind::Event(event) => universe
                .event(event.handle())
                .map(|def| def.custom_attributes.as_slice()),
            SymbolKind::Parameter(param) => universe
                .param(param.handle())
                .map(|def| def.custom_attributes.as_slice()),
        };
        attributes.unwrap_or(&[])
    }

    /// Modifier and shape flags.
    pub fn flags(&self, cache: &SymbolCache) -> SymbolResult<SymbolFlags> {
        self.flags
            .get_or_derive(cache.counters(), || self.derive_flags(cache))
            .copied()
    }

    /// Declared accessibility. Properties and events report the least
    /// restrictive of their accessors.
    pub fn access(&self, cache: &SymbolCache) -> SymbolResult<Access> {
        self.access
            .get_or_derive(cache.counters(), || self.derive_access(cache))
            .copied()
    }

    /// Whether awaiting the type (or a method's result) is valid.
    pub fn is_awaitable(&self, cache: &SymbolCache) -> SymbolResult<bool> {
        match &self.kind {
            SymbolKind::Type(ty) => ty.is_awaitable(cache),
            SymbolKind::Method(method) => method.is_awaitable(cache),
            _ => Err(SymbolError::unsupported(self.kind_name(), "awaitability")),
        }
    }

    pub fn as_type(&self) -> SymbolResult<&TypeSymbol> {
        match &self.kind {
            SymbolKind::Type(ty) => Ok(ty),
            _ => Err(SymbolError::unsupported(self.kind_name(), "type information")),
        }
    }

    pub fn as_method(&self) -> SymbolResult<&MethodSymbol> {
        match &self.kind {
            SymbolKind::Method(method) => Ok(method),
            _ => Err(SymbolError::unsupported(self.kind_name(), "method signature")),
        }
    }

    pub fn as_constructor(&self) -> SymbolResult<&ConstructorSymbol> {
        match &self.kind {
            SymbolKind::Constructor(ctor) => Ok(ctor),
            _ => Err(SymbolError::unsupported(
                self.kind_name(),
                "constructor signature",
            )),
        }
    }

    pub fn as_field(&self) -> SymbolResult<&FieldSymbol> {
        match &self.kind {
            SymbolKind::Field(field) => Ok(field),
            _ => Err(SymbolError::unsupported(self.kind_name(), "field type")),
        }
    }

    pub fn as_property(&self) -> SymbolResult<&PropertySymbol> {
        match &self.kind {
            SymbolKind::Property(property) => Ok(property),
            _ => Err(SymbolError::unsupported(self.kind_name(), "accessors")),
        }
    }

    pub fn as_event(&self) -> SymbolResult<&EventSymbol> {
        match &self.kind {
            SymbolKind::Event(event) => Ok(event),
            _ => Err(SymbolError::unsupported(self.kind_name(), "handler type")),
        }
    }

    pub fn as_parameter(&self) -> SymbolResult<&ParameterSymbol> {
        match &self.kind {
            SymbolKind::Parameter(param) => Ok(param),
            _ => Err(SymbolError::unsupported(self.kind_name(), "parameter position")),
        }
    }

    /// Parameters of a method, constructor, indexer, or delegate type.
    pub fn parameters(&self, cache: &SymbolCache) -> SymbolResult<Vec<Arc<Symbol>>> {
        match &self.kind {
            SymbolKind::Method(method) => method.parameters(cache),
            SymbolKind::Constructor(ctor) => ctor.parameters(cache),
            SymbolKind::Property(property) => property.index_parameters(cache),
            SymbolKind::Type(ty) => match ty.delegate_invoke(cache)? {
                Some(invoke) => invoke.parameters(cache),
                None => Err(SymbolError::unsupported("non-delegate type", "parameter list")),
            },
            SymbolKind::Field(_) | SymbolKind::Event(_) | SymbolKind::Parameter(_) => {
                Err(SymbolError::unsupported(self.kind_name(), "parameter list"))
            }
        }
    }

    /// Whether the symbol's memoized attributes have been derived, for
    /// inspecting laziness in tests and diagnostics.
    pub fn is_flags_derived(&self) -> bool {
        self.flags.is_derived()
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Symbol")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
