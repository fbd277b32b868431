//! Cached symbol descriptors and C# declaration rendering.
//!
//! Given a loaded [`Universe`](mirror_meta::Universe), this crate answers
//! "what does this symbol look like in source form" without source text:
//!
//! - [`SymbolCache`] hands out one shared [`Symbol`] per [`SymbolKey`]
//!   identity, building descriptors lazily and never evicting them.
//! - [`Symbol`] is a closed union over seven kinds ([`SymbolKind`]) whose
//!   derived attributes (flags, access, awaitability, extension-method-hood,
//!   rendered text) are computed once and memoized.
//! - [`render::signature`] and [`render::display_name`] produce C#
//!   declaration text and short names.
//!
//! # Concurrency
//!
//! The cache is `Send + Sync`. Concurrent resolutions of one identity return
//! the same `Arc`, and each derived attribute is computed by exactly one
//! caller while others wait.

mod access;
mod cache;
mod error;
mod flags;
mod key;
mod memo;
pub mod render;
pub mod rules;
mod stack;
mod symbol;

pub use access::Access;
pub use cache::{ExtensionScope, SymbolCache};
pub use error::{SymbolError, SymbolResult};
pub use flags::SymbolFlags;
pub use key::{ArgSignature, NativeHandle, SymbolKey};
pub use memo::CacheStats;
pub use render::{display_name, signature, DisplayOptions, SignatureOptions};
pub use stack::ensure_sufficient_stack;
pub use symbol::{
    ConstructorSymbol, EventSymbol, FieldSymbol, MethodSymbol, ParameterSymbol, PropertySymbol,
    Symbol, SymbolKind, TypeCategory, TypeSymbol,
};

// Descriptors are shared across threads through the cache.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SymbolCache>();
    assert_send_sync::<Symbol>();
};
