//! Shared classification rules over the metadata universe.
//!
//! These predicates work on raw handles so both the descriptor model and the
//! renderers can use them without resolving descriptors first.

use mirror_meta::{
    strip_arity, MethodAttributes, MethodHandle, TypeAttributes, TypeHandle, TypeShape, Universe,
};

use crate::symbol::TypeCategory;

/// Classify a type row.
pub fn type_category(universe: &Universe, ty: TypeHandle) -> Option<TypeCategory> {
    let row = universe.ty(ty)?;
    Some(match &row.shape {
        TypeShape::Definition(def) => {
            let core = universe.core();
            if def.attributes.contains(TypeAttributes::INTERFACE) {
                TypeCategory::Interface
            } else if ty == core.enum_ || ty == core.value_type {
                TypeCategory::Class
            } else if def.base == Some(core.enum_) {
                TypeCategory::Enum
            } else if def.base == Some(core.value_type) {
                TypeCategory::Struct
            } else if def.base == Some(core.multicast_delegate) && ty != core.multicast_delegate {
                TypeCategory::Delegate
            } else {
                TypeCategory::Class
            }
        }
        TypeShape::Instance(instance) => return type_category(universe, instance.definition),
        TypeShape::Array { .. } => TypeCategory::Array,
        TypeShape::ByRef(_) => TypeCategory::ByRef,
        TypeShape::Pointer(_) => TypeCategory::Pointer,
        TypeShape::GenericParam(_) => TypeCategory::GenericParameter,
    })
}

/// Whether the type has a language keyword (`int`, `string`, `object`).
pub fn is_built_in(universe: &Universe, ty: TypeHandle) -> bool {
    universe.core().keyword(ty).is_some()
}

/// Strip one level of `ref`.
pub fn strip_by_ref(universe: &Universe, ty: TypeHandle) -> TypeHandle {
    match universe.ty(ty).map(|row| &row.shape) {
        Some(TypeShape::ByRef(inner)) => *inner,
        _ => ty,
    }
}

/// The extension-method rule: a static method carrying
/// `ExtensionAttribute`, with at least one parameter, declared in a
/// top-level, non-generic, static class that also carries the attribute.
pub fn is_extension_method(universe: &Universe, method: MethodHandle) -> bool {
    let Some(def) = universe.method(method) else {
        return false;
    };
    let extension = universe.core().extension_attribute;
    let Some(container) = universe.definition(def.declaring_type) else {
        return false;
    };
    let static_class = TypeAttributes::ABSTRACT | TypeAttributes::SEALED;
    container.generic_params.is_empty()
        && container.declaring_type.is_none()
        && container.attributes.contains(static_class)
        && Universe::has_attribute(&container.custom_attributes, extension)
        && def.attributes.contains(MethodAttributes::STATIC)
        && Universe::has_attribute(&def.custom_attributes, extension)
        && !def.params.is_empty()
}

/// Whether the method was compiled as an async state machine.
pub fn is_async(universe: &Universe, method: MethodHandle) -> bool {
    universe.method(method).is_some_and(|def| {
        Universe::has_attribute(
            &def.custom_attributes,
            universe.core().async_state_machine_attribute,
        )
    })
}

/// Whether a setter is `init`-only (`modreq(IsExternalInit)` on its return).
pub fn is_init_only_setter(universe: &Universe, setter: MethodHandle) -> bool {
    universe.method(setter).is_some_and(|def| {
        def.return_modifiers
            .contains(&universe.core().is_external_init)
    })
}

/// Whether the type or one of its base classes declares a zero-argument,
/// non-generic instance `GetAwaiter`.
pub fn has_instance_get_awaiter(universe: &Universe, ty: TypeHandle) -> bool {
    let get_awaiter = universe.well_known().get_awaiter;
    let mut current = Some(ty);
    let mut steps = 0usize;
    while let Some(candidate) = current {
        let Some(def) = universe.underlying_definition(candidate) else {
            return false;
        };
        let declares = def.methods.iter().filter_map(|&m| universe.method(m)).any(|m| {
            m.name == get_awaiter
                && !m.attributes.contains(MethodAttributes::STATIC)
                && m.params.is_empty()
                && m.generic_params.is_empty()
        });
        if declares {
            return true;
        }
        steps += 1;
        if steps > universe.type_count() {
            return false;
        }
        current = def.base;
    }
    false
}

/// Whether a task-like type from the core library: `Task`, `Task<T>`,
/// `ValueTask`, `ValueTask<T>`, or a class deriving from a task.
pub fn is_task_like(universe: &Universe, ty: TypeHandle) -> bool {
    let core = universe.core();
    universe.derives_from(ty, core.task)
        || universe.derives_from(ty, core.value_task)
        || universe.generic_definition(ty) == core.value_task_of_t
}

/// Whether an extension receiver type accepts `ty`.
///
/// A generic-parameter receiver accepts any type satisfying its type
/// constraints; other receivers compare by generic definition through the
/// base chain and interfaces.
pub fn receiver_accepts(universe: &Universe, receiver: TypeHandle, ty: TypeHandle) -> bool {
    let receiver = strip_by_ref(universe, receiver);
    if receiver == ty {
        return true;
    }
    match universe.ty(receiver).map(|row| &row.shape) {
        Some(TypeShape::GenericParam(param)) => param
            .constraints
            .iter()
            .all(|&constraint| universe.is_assignable_to(ty, constraint)),
        Some(_) => universe.is_assignable_to(ty, receiver),
        None => false,
    }
}

/// C# rendering of a special-name operator method.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperatorName {
    /// `operator +`
    Symbol(&'static str),
    /// `implicit operator T` / `explicit operator T`
    Conversion(&'static str),
}

/// Decode an `op_*` metadata name.
pub fn operator_name(name: &str) -> Option<OperatorName> {
    let token = match strip_arity(name) {
        "op_Implicit" => return Some(OperatorName::Conversion("implicit")),
        "op_Explicit" => return Some(OperatorName::Conversion("explicit")),
        "op_Addition" | "op_UnaryPlus" => "+",
        "op_Subtraction" | "op_UnaryNegation" => "-",
        "op_Multiply" => "*",
        "op_Division" => "/",
        "op_Modulus" => "%",
        "op_BitwiseAnd" => "&",
        "op_BitwiseOr" => "|",
        "op_ExclusiveOr" => "^",
        "op_LeftShift" => "<<",
        "op_RightShift" => ">>",
        "op_UnsignedRightShift" => ">>>",
        "op_Equality" => "==",
        "op_Inequality" => "!=",
        "op_LessThan" => "<",
        "op_GreaterThan" => ">",
        "op_LessThanOrEqual" => "<=",
        "op_GreaterThanOrEqual" => ">=",
        "op_LogicalNot" => "!",
        "op_OnesComplement" => "~",
        "op_Increment" => "++",
        "op_Decrement" => "--",
        "op_True" => "true",
        "op_False" => "false",
        _ => return None,
    };
    Some(OperatorName::Symbol(token))
}

/// The operator form of a method, if it is a special-name `op_*` method.
pub fn method_operator(universe: &Universe, method: MethodHandle) -> Option<OperatorName> {
    let def = universe.method(method)?;
    if !def.attributes.contains(MethodAttributes::SPECIAL_NAME) {
        return None;
    }
    operator_name(universe.str(def.name))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
