//! Shared fixtures for symbol tests.
//!
//! Every suite works against `acme.json`, a small manifest covering each
//! symbol kind and the modifier combinations the renderers distinguish.

use std::sync::Arc;

use mirror_symbols::{
    display_name, signature, DisplayOptions, ExtensionScope, SignatureOptions, Symbol, SymbolCache,
};

pub const ACME: &str = include_str!("acme.json");

pub fn acme_universe() -> mirror_meta::Universe {
    mirror_meta::manifest::load_str(ACME).expect("acme manifest loads")
}

/// A cache over the acme manifest with the default extension scope.
pub fn acme() -> SymbolCache {
    SymbolCache::new(acme_universe())
}

/// A cache over the acme manifest that only sees awaiter extensions in the
/// named containers.
pub fn acme_scoped(containers: &[&str]) -> SymbolCache {
    let universe = acme_universe();
    let handles = containers
        .iter()
        .map(|name| universe.find_type(name).expect("container exists"))
        .collect();
    SymbolCache::with_extension_scope(universe, ExtensionScope::Containers(handles))
}

pub fn ty(cache: &SymbolCache, full_name: &str) -> Arc<Symbol> {
    cache
        .find_type(full_name)
        .unwrap_or_else(|err| panic!("{full_name}: {err}"))
}

/// `type_name::member`, the first member with that name.
pub fn member(cache: &SymbolCache, type_name: &str, name: &str) -> Arc<Symbol> {
    let owner = ty(cache, type_name);
    cache
        .member(&owner, name)
        .unwrap_or_else(|err| panic!("{type_name}::{name}: {err}"))
}

/// The overload of `name` taking `arity` parameters.
pub fn overload(cache: &SymbolCache, type_name: &str, name: &str, arity: usize) -> Arc<Symbol> {
    let owner = ty(cache, type_name);
    cache
        .methods_named(&owner, name)
        .expect("overloads exist")
        .into_iter()
        .find(|m| m.parameters(cache).expect("parameters").len() == arity)
        .unwrap_or_else(|| panic!("{type_name}::{name}/{arity}"))
}

pub fn sig(cache: &SymbolCache, symbol: &Symbol) -> String {
    sig_with(cache, symbol, SignatureOptions::default())
}

pub fn sig_with(cache: &SymbolCache, symbol: &Symbol, options: SignatureOptions) -> String {
    signature(cache, symbol, options)
        .expect("signature renders")
        .to_owned()
}

pub fn name(cache: &SymbolCache, symbol: &Symbol) -> String {
    name_with(cache, symbol, DisplayOptions::default())
}

pub fn name_with(cache: &SymbolCache, symbol: &Symbol, options: DisplayOptions) -> String {
    display_name(cache, symbol, options)
        .expect("display name renders")
        .to_owned()
}

pub const QUALIFIED: SignatureOptions = SignatureOptions {
    fully_qualified: true,
    compact: false,
};

pub const COMPACT: SignatureOptions = SignatureOptions {
    fully_qualified: false,
    compact: true,
};
