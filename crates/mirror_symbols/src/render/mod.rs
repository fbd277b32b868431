//! C# declaration rendering.
//!
//! Two renderers share one set of type-reference rules:
//!
//! - [`display_name`]: the name a symbol is referred to by (`List<int>`,
//!   `int[,]`, `this[]`, `operator +`), optionally qualified.
//! - [`signature`]: the full declaration (`public static T Max<T>(T a, T b)
//!   where T : IComparable<T>;`).
//!
//! Both results are memoized on the descriptor per option combination, so a
//! repeated render returns the same `&str` without formatting again. The
//! `format_*_into` functions write into a caller's buffer and never
//! memoize.

mod constant;
mod display;
mod signature;

use mirror_meta::{strip_arity, CustomAttribute};

use crate::stack::ensure_sufficient_stack;
use crate::{Symbol, SymbolCache, SymbolResult};

pub use display::format_display_name_into;
pub use signature::format_signature_into;

/// Options for [`signature`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SignatureOptions {
    /// Qualify type references and the declared type's own name with their
    /// namespace and enclosing types.
    pub fully_qualified: bool,
    /// Omit custom attributes.
    pub compact: bool,
}

impl SignatureOptions {
    #[inline]
    fn index(self) -> usize {
        usize::from(self.fully_qualified) | (usize::from(self.compact) << 1)
    }

    /// Options for type references inside a signature.
    #[inline]
    pub(crate) fn type_refs(self) -> DisplayOptions {
        DisplayOptions {
            fully_qualified: self.fully_qualified,
            include_generic_arguments: true,
        }
    }
}

/// Options for [`display_name`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DisplayOptions {
    /// Prefix the namespace and enclosing types.
    pub fully_qualified: bool,
    /// Append generic arguments (`List<int>` rather than `List`).
    pub include_generic_arguments: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            fully_qualified: false,
            include_generic_arguments: true,
        }
    }
}

impl DisplayOptions {
    #[inline]
    fn index(self) -> usize {
        usize::from(self.fully_qualified) | (usize::from(self.include_generic_arguments) << 1)
    }
}

/// The declaration of `symbol` in C# syntax.
pub fn signature<'s>(
    cache: &SymbolCache,
    symbol: &'s Symbol,
    options: SignatureOptions,
) -> SymbolResult<&'s str> {
    symbol.signatures[options.index()]
        .get_or_derive(cache.counters(), || {
            ensure_sufficient_stack(|| {
                let mut buf = String::new();
                format_signature_into(cache, symbol, options, &mut buf)?;
                tracing::trace!(signature = %buf, "rendered signature");
                Ok(buf)
            })
        })
        .map(String::as_str)
}

/// The name `symbol` is referred to by.
pub fn display_name<'s>(
    cache: &SymbolCache,
    symbol: &'s Symbol,
    options: DisplayOptions,
) -> SymbolResult<&'s str> {
    symbol.display_names[options.index()]
        .get_or_derive(cache.counters(), || {
            ensure_sufficient_stack(|| {
                let mut buf = String::new();
                format_display_name_into(cache, symbol, options, &mut buf)?;
                Ok(buf)
            })
        })
        .map(String::as_str)
}

/// Push the display name of the type `ty`.
pub(crate) fn push_type(
    cache: &SymbolCache,
    ty: mirror_meta::TypeHandle,
    options: DisplayOptions,
    buf: &mut String,
) -> SymbolResult<()> {
    let symbol = cache.resolve_type(ty)?;
    buf.push_str(display_name(cache, &symbol, options)?);
    Ok(())
}

/// Push a comma-separated list.
pub(crate) fn push_list<T>(
    buf: &mut String,
    items: impl IntoIterator<Item = T>,
    mut push: impl FnMut(&mut String, T) -> SymbolResult<()>,
) -> SymbolResult<()> {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            buf.push_str(", ");
        }
        push(buf, item)?;
    }
    Ok(())
}

/// Push `[Name(args, Named = value)]` for one attribute, with an optional
/// target prefix (`[return: Name]`).
pub(crate) fn push_attribute(
    cache: &SymbolCache,
    attribute: &CustomAttribute,
    target: Option<&str>,
    options: DisplayOptions,
    buf: &mut String,
) -> SymbolResult<()> {
    buf.push('[');
    if let Some(target) = target {
        buf.push_str(target);
        buf.push_str(": ");
    }
    let start = buf.len();
    push_type(
        cache,
        attribute.ty,
        DisplayOptions {
            include_generic_arguments: true,
            ..options
        },
        buf,
    )?;
    if buf[start..].ends_with("Attribute") && buf.len() - start > "Attribute".len() {
        buf.truncate(buf.len() - "Attribute".len());
    }
    if !attribute.fixed_args.is_empty() || !attribute.named_args.is_empty() {
        buf.push('(');
        let universe = cache.universe();
        let positional = attribute.fixed_args.iter().map(|arg| (None, arg));
        let named = attribute
            .named_args
            .iter()
            .map(|(name, arg)| (Some(universe.str(*name)), arg));
        push_list(buf, positional.chain(named), |buf, (name, arg)| {
            if let Some(name) = name {
                buf.push_str(name);
                buf.push_str(" = ");
            }
            constant::push_constant(cache, arg, None, options, buf)
        })?;
        buf.push(')');
    }
    buf.push(']');
    Ok(())
}

/// User-visible attributes: compiler markers are never shown.
pub(crate) fn visible_attributes<'a>(
    cache: &'a SymbolCache,
    attributes: &'a [CustomAttribute],
) -> impl Iterator<Item = &'a CustomAttribute> + 'a {
    let core = cache.universe().core();
    attributes
        .iter()
        .filter(move |attribute| !core.is_compiler_marker(attribute.ty))
}

/// Simple name of a type: arity stripped, no generic arguments.
pub(crate) fn simple_type_name(cache: &SymbolCache, ty: mirror_meta::TypeHandle) -> &str {
    let universe = cache.universe();
    let definition = universe.generic_definition(ty);
    universe
        .ty(definition)
        .map_or("", |row| strip_arity(universe.str(row.name)))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
