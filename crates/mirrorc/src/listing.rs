//! Declaration listings.
//!
//! One block per declared type: the type's own line(s), then its members
//! indented by four spaces. Nested types get their own block. Blocks are
//! rendered in parallel and printed in declaration order.

use rayon::prelude::*;

use mirror_meta::{strip_arity, TypeHandle, Universe};
use mirror_symbols::{
    display_name, signature, Symbol, SymbolCache, SymbolError, SymbolKind, SymbolResult,
};

use crate::options::CliOptions;

const INDENT: &str = "    ";

/// Render the listing for every selected type.
pub fn render(cache: &SymbolCache, options: &CliOptions) -> SymbolResult<String> {
    let types = selected_types(cache.universe(), options.type_filter.as_deref());
    if let Some(name) = options.type_filter.as_deref().filter(|_| types.is_empty()) {
        return Err(SymbolError::SymbolNotFound {
            what: format!("type `{name}`"),
        });
    }

    let blocks = types
        .par_iter()
        .map(|&ty| render_type(cache, ty, options))
        .collect::<SymbolResult<Vec<String>>>()?;
    Ok(blocks.join("\n"))
}

/// Caller-declared types in declaration order, optionally narrowed to one
/// name.
pub fn selected_types(universe: &Universe, filter: Option<&str>) -> Vec<TypeHandle> {
    universe
        .definitions()
        .map(|(ty, _)| ty)
        .filter(|&ty| !universe.is_core_library(ty))
        .filter(|&ty| match filter {
            Some(name) => type_matches(universe, ty, name),
            None => true,
        })
        .collect()
}

fn type_matches(universe: &Universe, ty: TypeHandle, name: &str) -> bool {
    if universe.full_name(ty) == name {
        return true;
    }
    universe
        .ty(ty)
        .is_some_and(|row| strip_arity(universe.str(row.name)) == name)
}

fn render_type(cache: &SymbolCache, ty: TypeHandle, options: &CliOptions) -> SymbolResult<String> {
    let symbol = cache.resolve_type(ty)?;
    let mut out = String::new();
    push_entry(cache, &symbol, options, "", &mut out)?;
    for member in cache.members(&symbol)? {
        if matches!(member.kind(), SymbolKind::Type(_)) {
            continue;
        }
        push_entry(cache, &member, options, INDENT, &mut out)?;
    }
    Ok(out)
}

fn push_entry(
    cache: &SymbolCache,
    symbol: &Symbol,
    options: &CliOptions,
    indent: &str,
    out: &mut String,
) -> SymbolResult<()> {
    let text = if options.names {
        display_name(cache, symbol, options.display_options())?
    } else {
        signature(cache, symbol, options.signature_options())?
    };
    for line in text.lines() {
        out.push_str(indent);
        out.push_str(line);
        out.push('\n');
    }
    Ok(())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
