//! Constant values in C# literal syntax.

use mirror_meta::{Constant, FieldAttributes, TypeHandle};

use super::{push_type, DisplayOptions};
use crate::symbol::TypeCategory;
use crate::{rules, SymbolCache, SymbolResult};

/// Push `value` as a C# literal. With an enum `target`, integral values
/// print as `Enum.Member` when a member has that value, else as a cast.
pub(crate) fn push_constant(
    cache: &SymbolCache,
    value: &Constant,
    target: Option<TypeHandle>,
    options: DisplayOptions,
    buf: &mut String,
) -> SymbolResult<()> {
    let universe = cache.universe();
    match value {
        Constant::Null => buf.push_str("null"),
        Constant::Default => buf.push_str("default"),
        Constant::Bool(true) => buf.push_str("true"),
        Constant::Bool(false) => buf.push_str("false"),
        Constant::Char(c) => {
            buf.push('\'');
            push_escaped(*c, '\'', buf);
            buf.push('\'');
        }
        Constant::Int(_) | Constant::UInt(_) => {
            let enum_type = target.filter(|&ty| {
                rules::type_category(universe, ty) == Some(TypeCategory::Enum)
            });
            match enum_type {
                Some(ty) => push_enum_value(cache, ty, value, options, buf)?,
                None => push_integer(value, buf),
            }
        }
        Constant::Float(f) => {
            let single = target == Some(universe.core().single);
            push_float(*f, single, buf);
        }
        Constant::String(s) => {
            buf.push('"');
            for c in s.chars() {
                push_escaped(c, '"', buf);
            }
            buf.push('"');
        }
        Constant::Type(ty) => {
            buf.push_str("typeof(");
            push_type(cache, *ty, options, buf)?;
            buf.push(')');
        }
    }
    Ok(())
}

fn integral(value: &Constant) -> Option<i128> {
    match value {
        Constant::Int(i) => Some(i128::from(*i)),
        Constant::UInt(u) => Some(i128::from(*u)),
        _ => None,
    }
}

fn push_integer(value: &Constant, buf: &mut String) {
    use std::fmt::Write;
    if let Some(n) = integral(value) {
        let _ = write!(buf, "{n}");
    }
}

fn push_enum_value(
    cache: &SymbolCache,
    enum_type: TypeHandle,
    value: &Constant,
    options: DisplayOptions,
    buf: &mut String,
) -> SymbolResult<()> {
    let universe = cache.universe();
    let wanted = integral(value);
    let member = universe
        .underlying_definition(enum_type)
        .into_iter()
        .flat_map(|def| def.fields.iter())
        .filter_map(|&f| universe.field(f))
        .find(|f| {
            f.attributes.contains(FieldAttributes::LITERAL)
                && f.constant.as_ref().and_then(integral) == wanted
        });
    match member {
        Some(field) => {
            push_type(cache, enum_type, options, buf)?;
            buf.push('.');
            buf.push_str(universe.str(field.name));
        }
        None => {
            buf.push('(');
            push_type(cache, enum_type, options, buf)?;
            buf.push(')');
            push_integer(value, buf);
        }
    }
    Ok(())
}

/// `single` selects `float` syntax: an `f` suffix and `float.NaN`.
fn push_float(value: f64, single: bool, buf: &mut String) {
    use std::fmt::Write;
    let keyword = if single { "float" } else { "double" };
    if value.is_nan() {
        buf.push_str(keyword);
        buf.push_str(".NaN");
    } else if value.is_infinite() {
        buf.push_str(keyword);
        buf.push_str(if value > 0.0 {
            ".PositiveInfinity"
        } else {
            ".NegativeInfinity"
        });
    } else {
        let _ = write!(buf, "{value}");
        if single {
            buf.push('f');
        }
    }
}

fn push_escaped(c: char, quote: char, buf: &mut String) {
    match c {
        '\\' => buf.push_str("\\\\"),
        '\n' => buf.push_str("\\n"),
        '\r' => buf.push_str("\\r"),
        '\t' => buf.push_str("\\t"),
        '\0' => buf.push_str("\\0"),
        c if c == quote => {
            buf.push('\\');
            buf.push(c);
        }
        c if c.is_control() => {
            use std::fmt::Write;
            let _ = write!(buf, "\\u{:04X}", u32::from(c));
        }
        c => buf.push(c),
    }
}
