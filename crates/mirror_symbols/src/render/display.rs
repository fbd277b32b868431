//! Display names.

use mirror_meta::{strip_arity, Name, TypeHandle, TypeShape};

use super::{display_name, push_list, push_type, simple_type_name, DisplayOptions};
use crate::rules::OperatorName;
use crate::{Symbol, SymbolCache, SymbolError, SymbolKind, SymbolResult};

/// Write the display name of `symbol` into `buf`.
pub fn format_display_name_into(
    cache: &SymbolCache,
    symbol: &Symbol,
    options: DisplayOptions,
    buf: &mut String,
) -> SymbolResult<()> {
    match symbol.kind() {
        SymbolKind::Type(ty) => format_type_into(cache, ty.handle(), options, buf),
        SymbolKind::Method(method) => {
            push_member_qualifier(cache, symbol, options, buf)?;
            match method.operator(cache) {
                Some(OperatorName::Symbol(token)) => {
                    buf.push_str("operator ");
                    buf.push_str(token);
                }
                Some(OperatorName::Conversion(direction)) => {
                    buf.push_str(direction);
                    buf.push_str(" operator ");
                    let returns = method.return_type(cache)?;
                    buf.push_str(display_name(cache, &returns, options)?);
                }
                None => {
                    buf.push_str(strip_arity(symbol.name(cache)));
                    if options.include_generic_arguments {
                        let args = method.generic_arguments(cache)?;
                        push_generic_list(cache, &args, options, buf)?;
                    }
                }
            }
            Ok(())
        }
        SymbolKind::Constructor(_) => {
            push_member_qualifier(cache, symbol, options, buf)?;
            let declaring = symbol
                .key()
                .declaring()
                .ok_or_else(|| SymbolError::invariant("constructor", "no declaring type"))?;
            buf.push_str(simple_type_name(cache, declaring));
            Ok(())
        }
        SymbolKind::Property(property) => {
            push_member_qualifier(cache, symbol, options, buf)?;
            if property.is_indexer(cache) {
                buf.push_str("this[]");
            } else {
                buf.push_str(symbol.name(cache));
            }
            Ok(())
        }
        SymbolKind::Field(_) | SymbolKind::Event(_) => {
            push_member_qualifier(cache, symbol, options, buf)?;
            buf.push_str(symbol.name(cache));
            Ok(())
        }
        SymbolKind::Parameter(_) => {
            buf.push_str(symbol.name(cache));
            Ok(())
        }
    }
}

fn push_member_qualifier(
    cache: &SymbolCache,
    symbol: &Symbol,
    options: DisplayOptions,
    buf: &mut String,
) -> SymbolResult<()> {
    if !options.fully_qualified {
        return Ok(());
    }
    if let Some(declaring) = symbol.key().declaring() {
        push_type(cache, declaring, options, buf)?;
        buf.push('.');
    }
    Ok(())
}

fn push_generic_list(
    cache: &SymbolCache,
    args: &[std::sync::Arc<Symbol>],
    options: DisplayOptions,
    buf: &mut String,
) -> SymbolResult<()> {
    if args.is_empty() {
        return Ok(());
    }
    buf.push('<');
    push_list(buf, args, |buf, arg| {
        buf.push_str(display_name(cache, arg, options)?);
        Ok(())
    })?;
    buf.push('>');
    Ok(())
}

/// Namespace or enclosing-type prefix of a declared type.
pub(super) fn push_type_qualifier(
    cache: &SymbolCache,
    declaring: Option<TypeHandle>,
    namespace: Name,
    options: DisplayOptions,
    buf: &mut String,
) -> SymbolResult<()> {
    if !options.fully_qualified {
        return Ok(());
    }
    match declaring {
        Some(outer) => {
            push_type(cache, outer, options, buf)?;
            buf.push('.');
        }
        None => {
            let namespace = cache.universe().str(namespace);
            if !namespace.is_empty() {
                buf.push_str(namespace);
                buf.push('.');
            }
        }
    }
    Ok(())
}

fn format_type_into(
    cache: &SymbolCache,
    ty: TypeHandle,
    options: DisplayOptions,
    buf: &mut String,
) -> SymbolResult<()> {
    let universe = cache.universe();
    let core = universe.core();
    if let Some(keyword) = core.keyword(ty) {
        buf.push_str(keyword);
        return Ok(());
    }
    let row = universe
        .ty(ty)
        .ok_or_else(|| SymbolError::not_found(format!("{ty:?}")))?;
    match &row.shape {
        TypeShape::Definition(def) => {
            push_type_qualifier(cache, def.declaring_type, row.namespace, options, buf)?;
            buf.push_str(strip_arity(universe.str(row.name)));
            if options.include_generic_arguments && !def.generic_params.is_empty() {
                buf.push('<');
                push_list(buf, &def.generic_params, |buf, &param| {
                    push_type(cache, param, options, buf)
                })?;
                buf.push('>');
            }
        }
        TypeShape::Instance(instance) => {
            if options.include_generic_arguments {
                if instance.definition == core.nullable && instance.args.len() == 1 {
                    push_type(cache, instance.args[0], options, buf)?;
                    buf.push('?');
                    return Ok(());
                }
                if core.is_value_tuple(instance.definition) {
                    buf.push('(');
                    push_list(buf, &instance.args, |buf, &arg| {
                        push_type(cache, arg, options, buf)
                    })?;
                    buf.push(')');
                    return Ok(());
                }
            }
            let definition = universe
                .ty(instance.definition)
                .ok_or_else(|| SymbolError::not_found(format!("{:?}", instance.definition)))?;
            let declaring = definition.shape.as_definition().and_then(|d| d.declaring_type);
            push_type_qualifier(cache, declaring, definition.namespace, options, buf)?;
            buf.push_str(strip_arity(universe.str(definition.name)));
            if options.include_generic_arguments {
                buf.push('<');
                push_list(buf, &instance.args, |buf, &arg| push_type(cache, arg, options, buf))?;
                buf.push('>');
            }
        }
        TypeShape::Array { element, rank } => {
            push_type(cache, *element, options, buf)?;
            buf.push('[');
            for _ in 1..*rank {
                buf.push(',');
            }
            buf.push(']');
        }
        TypeShape::Pointer(element) => {
            push_type(cache, *element, options, buf)?;
            buf.push('*');
        }
        TypeShape::ByRef(element) => {
            buf.push_str("ref ");
            push_type(cache, *element, options, buf)?;
        }
        TypeShape::GenericParam(_) => buf.push_str(universe.str(row.name)),
    }
    Ok(())
}
