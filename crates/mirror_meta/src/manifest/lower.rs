//! Manifest lowering.
//!
//! Two passes over the declarations:
//!
//! 1. **Declare**: define every type (recursing into nested types) with its
//!    attributes, generic parameters, and special constraints, so that any
//!    declaration can refer to any other regardless of order. Value-type
//!    kinds get their implied base here because `T?` resolution needs it.
//! 2. **Populate**: resolve bases, interfaces, constraints, and attributes,
//!    then define members in declaration order.

use crate::def::{Constant, CustomAttribute, TypeShape};
use crate::flags::{
    FieldAttributes, GenericParamAttributes, MemberAccess, MethodAttributes, ParamAttributes,
    TypeAttributes, TypeVisibility,
};
use crate::{CoreTypes, MethodHandle, TypeHandle, Universe, UniverseBuilder};

use super::type_ref::{self, TypeRef};
use super::{
    AccessorDecl, AttributeDecl, ConstructorDecl, EventDecl, FieldDecl, GenericParamDecl,
    Manifest, ManifestError, MethodDecl, ParamDecl, PropertyDecl, TypeDecl, TypeKind,
};

pub(super) fn lower(manifest: &Manifest) -> Result<Universe, ManifestError> {
    let mut cx = Lowering {
        builder: UniverseBuilder::new(),
        usings: manifest.usings.clone(),
    };

    let mut declared = Vec::new();
    for decl in &manifest.types {
        cx.declare(decl, None, &mut declared)?;
    }
    for entry in &declared {
        cx.populate(entry)?;
    }

    tracing::debug!(types = declared.len(), "manifest lowered");
    Ok(cx.builder.finish())
}

/// A type defined in the first pass, with the scope its body resolves in.
struct Declared<'m> {
    handle: TypeHandle,
    decl: &'m TypeDecl,
    scope: Scope,
    /// Handles of `decl.generic_params`, in order.
    own_params: Vec<TypeHandle>,
}

/// Name-resolution scope.
#[derive(Clone)]
struct Scope {
    namespace: String,
    /// Full metadata names of the enclosing types, innermost first.
    enclosing: Vec<String>,
    /// Generic parameters in scope; later entries shadow earlier ones.
    generic_params: Vec<(String, TypeHandle)>,
}

impl Scope {
    fn generic_param(&self, name: &str) -> Option<TypeHandle> {
        self.generic_params
            .iter()
            .rev()
            .find_map(|(param, handle)| (param == name).then_some(*handle))
    }

    fn type_name(&self) -> &str {
        self.enclosing.first().map_or("", String::as_str)
    }
}

/// How a signature type is passed.
#[derive(Copy, Clone, PartialEq, Eq)]
enum RefKind {
    Value,
    Ref,
    RefReadonly,
}

struct Lowering {
    builder: UniverseBuilder,
    usings: Vec<String>,
}

impl Lowering {
    fn core(&self) -> &CoreTypes {
        self.builder.core()
    }

    // === Pass 1 ===

    fn declare<'m>(
        &mut self,
        decl: &'m TypeDecl,
        outer: Option<&Declared<'m>>,
        declared: &mut Vec<Declared<'m>>,
    ) -> Result<(), ManifestError> {
        let metadata_name = if decl.generic_params.is_empty() {
            decl.name.clone()
        } else {
            format!("{}`{}", decl.name, decl.generic_params.len())
        };
        let (namespace, full_name) = match outer {
            Some(outer) => (
                outer.scope.namespace.clone(),
                format!("{}+{metadata_name}", outer.scope.type_name()),
            ),
            None if decl.namespace.is_empty() => (String::new(), metadata_name.clone()),
            None => (
                decl.namespace.clone(),
                format!("{}.{metadata_name}", decl.namespace),
            ),
        };
        let context = format!("type `{full_name}`");

        let attributes = type_attributes(decl, outer.is_some(), &context)?;
        let handle = match outer {
            Some(outer) => {
                self.builder
                    .define_nested_type(outer.handle, &metadata_name, attributes)?
            }
            None => self
                .builder
                .define_type(&decl.namespace, &metadata_name, attributes)?,
        };

        let mut enclosing = vec![full_name];
        let mut generic_params = Vec::new();
        if let Some(outer) = outer {
            enclosing.extend(outer.scope.enclosing.iter().cloned());
            generic_params.extend(outer.scope.generic_params.iter().cloned());
        }
        let mut own_params = Vec::with_capacity(decl.generic_params.len());
        for param in &decl.generic_params {
            let attrs = generic_param_attributes(param, &context)?;
            let param_handle = self
                .builder
                .add_type_generic_param(handle, &param.name, attrs)?;
            own_params.push(param_handle);
            generic_params.push((param.name.clone(), param_handle));
        }

        let core = self.core();
        let implied_base = match decl.kind {
            TypeKind::Struct => Some(core.value_type),
            TypeKind::Enum => Some(core.enum_),
            TypeKind::Delegate => Some(core.multicast_delegate),
            TypeKind::Class | TypeKind::Interface => None,
        };
        if let Some(base) = implied_base {
            self.builder.set_base(handle, base)?;
        }
        for modifier in &decl.modifiers {
            let marker = match modifier.as_str() {
                "readonly" => self.core().is_read_only_attribute,
                "ref" => self.core().is_by_ref_like_attribute,
                _ => continue,
            };
            self.builder
                .add_type_attribute(handle, CustomAttribute::marker(marker))?;
        }

        declared.push(Declared {
            handle,
            decl,
            scope: Scope {
                namespace,
                enclosing,
                generic_params,
            },
            own_params,
        });
        let this_index = declared.len() - 1;
        for nested in &decl.nested {
            // Re-borrow through the index: `declared` grows while recursing.
            let outer = Declared {
                handle: declared[this_index].handle,
                decl: declared[this_index].decl,
                scope: declared[this_index].scope.clone(),
                own_params: Vec::new(),
            };
            self.declare(nested, Some(&outer), declared)?;
        }
        Ok(())
    }

    // === Pass 2 ===

    fn populate(&mut self, entry: &Declared<'_>) -> Result<(), ManifestError> {
        let Declared {
            handle: ty,
            decl,
            scope,
            own_params,
        } = entry;
        let ty = *ty;
        let context = format!("type `{}`", scope.type_name());

        match (decl.kind, &decl.base) {
            (TypeKind::Class, Some(base)) => {
                let base = self.resolve_value(base, scope, &context)?;
                self.builder.set_base(ty, base)?;
            }
            (TypeKind::Class, None) => {
                let object = self.core().object;
                self.builder.set_base(ty, object)?;
            }
            (_, Some(_)) => {
                return Err(ManifestError::InvalidModifier {
                    modifier: "base".to_owned(),
                    context,
                })
            }
            (_, None) => {}
        }
        for interface in &decl.interfaces {
            let interface = self.resolve_value(interface, scope, &context)?;
            self.builder.add_interface(ty, interface)?;
        }
        self.lower_constraints(&decl.generic_params, own_params, scope, &context)?;
        for attribute in &decl.attributes {
            let attribute = self.lower_attribute(attribute, scope, &context)?;
            self.builder.add_type_attribute(ty, attribute)?;
        }

        match decl.kind {
            TypeKind::Enum => self.lower_enum(ty, decl, scope, &context)?,
            TypeKind::Delegate => self.lower_delegate(ty, decl, scope)?,
            TypeKind::Class | TypeKind::Struct | TypeKind::Interface => {}
        }

        let in_interface = decl.kind == TypeKind::Interface;
        for field in &decl.fields {
            self.lower_field(ty, field, scope, in_interface)?;
        }
        for ctor in &decl.constructors {
            self.lower_constructor(ty, ctor, scope)?;
        }
        for property in &decl.properties {
            self.lower_property(ty, property, scope, in_interface)?;
        }
        for event in &decl.events {
            self.lower_event(ty, event, scope, in_interface)?;
        }
        for method in &decl.methods {
            self.lower_method(ty, method, scope, in_interface)?;
        }
        Ok(())
    }

    fn lower_constraints(
        &mut self,
        decls: &[GenericParamDecl],
        handles: &[TypeHandle],
        scope: &Scope,
        context: &str,
    ) -> Result<(), ManifestError> {
        for (decl, &param) in decls.iter().zip(handles) {
            for constraint in &decl.constraints {
                if is_special_constraint(constraint) {
                    continue;
                }
                let constraint = self.resolve_value(constraint, scope, context)?;
                self.builder.add_constraint(param, constraint)?;
            }
        }
        Ok(())
    }

    fn lower_enum(
        &mut self,
        ty: TypeHandle,
        decl: &TypeDecl,
        scope: &Scope,
        context: &str,
    ) -> Result<(), ManifestError> {
        let underlying = match &decl.underlying {
            Some(text) => self.resolve_value(text, scope, context)?,
            None => self.core().int32,
        };
        let public = FieldAttributes::empty().with_access(MemberAccess::Public);
        self.builder.define_field(
            ty,
            "value__",
            public | FieldAttributes::SPECIAL_NAME | FieldAttributes::RT_SPECIAL_NAME,
            underlying,
        )?;
        for value in &decl.values {
            let field = self.builder.define_field(
                ty,
                &value.name,
                public | FieldAttributes::STATIC | FieldAttributes::LITERAL,
                ty,
            )?;
            let constant = if let Some(int) = value.value.as_i64() {
                Constant::Int(int)
            } else if let Some(uint) = value.value.as_u64() {
                Constant::UInt(uint)
            } else {
                return Err(ManifestError::InvalidConstant {
                    context: format!("enum member `{}`", value.name),
                });
            };
            self.builder.set_field_constant(field, constant)?;
        }
        Ok(())
    }

    fn lower_delegate(
        &mut self,
        ty: TypeHandle,
        decl: &TypeDecl,
        scope: &Scope,
    ) -> Result<(), ManifestError> {
        let public = MethodAttributes::empty().with_access(MemberAccess::Public);
        let ctor = self.builder.define_constructor(
            ty,
            public | MethodAttributes::HIDE_BY_SIG,
            false,
        )?;
        let (object, intptr) = (self.core().object, self.core().intptr);
        self.builder
            .add_param(ctor, "object", object, ParamAttributes::empty())?;
        self.builder
            .add_param(ctor, "method", intptr, ParamAttributes::empty())?;

        let invoke = MethodDecl {
            name: "Invoke".to_owned(),
            returns: decl.returns.clone(),
            access: Some("public".to_owned()),
            modifiers: vec!["virtual".to_owned()],
            params: decl.params.clone(),
            ..MethodDecl::default()
        };
        self.lower_method(ty, &invoke, scope, false)?;
        Ok(())
    }

    fn lower_field(
        &mut self,
        ty: TypeHandle,
        decl: &FieldDecl,
        scope: &Scope,
        in_interface: bool,
    ) -> Result<(), ManifestError> {
        let context = format!("field `{}.{}`", scope.type_name(), decl.name);
        let access = member_access(decl.access.as_deref(), default_access(in_interface), &context)?;
        let mut attributes = FieldAttributes::empty().with_access(access);
        let mut is_const = false;
        for modifier in &decl.modifiers {
            match modifier.as_str() {
                "static" => attributes |= FieldAttributes::STATIC,
                "readonly" => attributes |= FieldAttributes::INIT_ONLY,
                "const" => {
                    attributes |= FieldAttributes::STATIC | FieldAttributes::LITERAL;
                    is_const = true;
                }
                other => return Err(invalid_modifier(other, &context)),
            }
        }
        let (field_type, ref_kind) = self.resolve_signature(&decl.ty, scope, &context)?;
        let field = self
            .builder
            .define_field(ty, &decl.name, attributes, field_type)?;
        if ref_kind == RefKind::RefReadonly {
            let marker = self.core().is_read_only_attribute;
            self.builder
                .add_field_attribute(field, CustomAttribute::marker(marker))?;
        }
        match (&decl.value, is_const) {
            (Some(value), true) => {
                let constant = self.constant(value, Some(field_type), scope, &context)?;
                self.builder.set_field_constant(field, constant)?;
            }
            (None, false) => {}
            _ => return Err(ManifestError::InvalidConstant { context }),
        }
        for attribute in &decl.attributes {
            let attribute = self.lower_attribute(attribute, scope, &context)?;
            self.builder.add_field_attribute(field, attribute)?;
        }
        Ok(())
    }

    fn lower_constructor(
        &mut self,
        ty: TypeHandle,
        decl: &ConstructorDecl,
        scope: &Scope,
    ) -> Result<(), ManifestError> {
        let context = format!("constructor of `{}`", scope.type_name());
        let mut is_static = false;
        for modifier in &decl.modifiers {
            match modifier.as_str() {
                "static" => is_static = true,
                other => return Err(invalid_modifier(other, &context)),
            }
        }
        let access = if is_static {
            MemberAccess::Private
        } else {
            member_access(decl.access.as_deref(), MemberAccess::Private, &context)?
        };
        let attributes = MethodAttributes::empty().with_access(access) | MethodAttributes::HIDE_BY_SIG;
        let ctor = self.builder.define_constructor(ty, attributes, is_static)?;
        self.lower_params(ctor, &decl.params, scope, &context)?;
        for attribute in &decl.attributes {
            let attribute = self.lower_attribute(attribute, scope, &context)?;
            self.builder.add_method_attribute(ctor, attribute)?;
        }
        Ok(())
    }

    fn lower_method(
        &mut self,
        ty: TypeHandle,
        decl: &MethodDecl,
        scope: &Scope,
        in_interface: bool,
    ) -> Result<MethodHandle, ManifestError> {
        let context = format!("method `{}.{}`", scope.type_name(), decl.name);
        let modifiers = MethodModifiers::parse(
            &decl.modifiers,
            decl.access.as_deref(),
            in_interface,
            &context,
        )?;
        let mut attributes = modifiers.attributes;
        if decl.name.starts_with("op_") {
            attributes |= MethodAttributes::SPECIAL_NAME;
        }
        let void = self.core().void;
        let method = self
            .builder
            .define_method(ty, &decl.name, attributes, void)?;

        let mut scope = scope.clone();
        let mut own_params = Vec::with_capacity(decl.generic_params.len());
        for param in &decl.generic_params {
            let attrs = generic_param_attributes(param, &context)?;
            let handle = self
                .builder
                .add_method_generic_param(method, &param.name, attrs)?;
            own_params.push(handle);
            scope.generic_params.push((param.name.clone(), handle));
        }
        self.lower_constraints(&decl.generic_params, &own_params, &scope, &context)?;

        let returns = decl.returns.as_deref().unwrap_or("void");
        let (return_type, ref_kind) = self.resolve_signature(returns, &scope, &context)?;
        self.builder.set_return_type(method, return_type)?;
        if ref_kind == RefKind::RefReadonly {
            let marker = self.core().is_read_only_attribute;
            self.builder
                .add_return_attribute(method, CustomAttribute::marker(marker))?;
        }

        let is_extension = self.lower_params(method, &decl.params, &scope, &context)?;
        if is_extension {
            let marker = self.core().extension_attribute;
            self.builder
                .add_method_attribute(method, CustomAttribute::marker(marker))?;
            let already_marked = self
                .builder
                .ty(ty)
                .and_then(|row| row.shape.as_definition())
                .is_some_and(|def| Universe::has_attribute(&def.custom_attributes, marker));
            if !already_marked {
                self.builder
                    .add_type_attribute(ty, CustomAttribute::marker(marker))?;
            }
        }
        if modifiers.is_async {
            let marker = self.core().async_state_machine_attribute;
            self.builder.add_method_attribute(
                method,
                CustomAttribute::with_args(marker, vec![Constant::Type(ty)]),
            )?;
        }
        if modifiers.is_readonly {
            let marker = self.core().is_read_only_attribute;
            self.builder
                .add_method_attribute(method, CustomAttribute::marker(marker))?;
        }
        for attribute in &decl.attributes {
            let attribute = self.lower_attribute(attribute, &scope, &context)?;
            self.builder.add_method_attribute(method, attribute)?;
        }
        for attribute in &decl.return_attributes {
            let attribute = self.lower_attribute(attribute, &scope, &context)?;
            self.builder.add_return_attribute(method, attribute)?;
        }
        Ok(method)
    }

    fn lower_property(
        &mut self,
        ty: TypeHandle,
        decl: &PropertyDecl,
        scope: &Scope,
        in_interface: bool,
    ) -> Result<(), ManifestError> {
        let is_indexer = decl.name == "this";
        let name = if is_indexer { "Item" } else { decl.name.as_str() };
        let context = format!("property `{}.{name}`", scope.type_name());
        let modifiers = MethodModifiers::parse(
            &decl.modifiers,
            decl.access.as_deref(),
            in_interface,
            &context,
        )?;
        if modifiers.is_async {
            return Err(invalid_modifier("async", &context));
        }
        let (property_type, ref_kind) = self.resolve_signature(&decl.ty, scope, &context)?;

        let accessor_access = |accessor: &Option<AccessorDecl>| -> Result<Option<MemberAccess>, ManifestError> {
            match accessor {
                None | Some(AccessorDecl::Present(false)) => Ok(None),
                Some(AccessorDecl::Present(true)) => Ok(Some(modifiers.access)),
                Some(AccessorDecl::Access { access }) => {
                    member_access(Some(access.as_str()), modifiers.access, &context).map(Some)
                }
            }
        };
        let mut get_access = accessor_access(&decl.get)?;
        let set_access = accessor_access(&decl.set)?;
        if get_access.is_none() && set_access.is_none() {
            get_access = Some(modifiers.access);
        }
        let base = modifiers.attributes | MethodAttributes::SPECIAL_NAME;

        let getter = match get_access {
            Some(access) => {
                let getter = self.builder.define_method(
                    ty,
                    &format!("get_{name}"),
                    base.with_access(access),
                    property_type,
                )?;
                self.lower_params(getter, &decl.params, scope, &context)?;
                if ref_kind == RefKind::RefReadonly {
                    let marker = self.core().is_read_only_attribute;
                    self.builder
                        .add_return_attribute(getter, CustomAttribute::marker(marker))?;
                }
                Some(getter)
            }
            None => None,
        };
        let setter = match set_access {
            Some(access) => {
                let void = self.core().void;
                let setter = self.builder.define_method(
                    ty,
                    &format!("set_{name}"),
                    base.with_access(access),
                    void,
                )?;
                self.lower_params(setter, &decl.params, scope, &context)?;
                self.builder
                    .add_param(setter, "value", property_type, ParamAttributes::empty())?;
                if decl.init {
                    let init = self.core().is_external_init;
                    self.builder.add_return_modifier(setter, init)?;
                }
                Some(setter)
            }
            None if decl.init => return Err(invalid_modifier("init", &context)),
            None => None,
        };

        let property = self
            .builder
            .define_property(ty, name, property_type, getter, setter)?;
        for attribute in &decl.attributes {
            let attribute = self.lower_attribute(attribute, scope, &context)?;
            self.builder.add_property_attribute(property, attribute)?;
        }
        if is_indexer {
            let default_member = self.core().default_member_attribute;
            let already_marked = self
                .builder
                .ty(ty)
                .and_then(|row| row.shape.as_definition())
                .is_some_and(|def| Universe::has_attribute(&def.custom_attributes, default_member));
            if !already_marked {
                self.builder.add_type_attribute(
                    ty,
                    CustomAttribute::with_args(default_member, vec![Constant::String("Item".into())]),
                )?;
            }
        }
        Ok(())
    }

    fn lower_event(
        &mut self,
        ty: TypeHandle,
        decl: &EventDecl,
        scope: &Scope,
        in_interface: bool,
    ) -> Result<(), ManifestError> {
        let context = format!("event `{}.{}`", scope.type_name(), decl.name);
        let modifiers = MethodModifiers::parse(
            &decl.modifiers,
            decl.access.as_deref(),
            in_interface,
            &context,
        )?;
        let handler = self.resolve_value(&decl.ty, scope, &context)?;
        let void = self.core().void;
        let attributes = modifiers.attributes | MethodAttributes::SPECIAL_NAME;

        let add = self
            .builder
            .define_method(ty, &format!("add_{}", decl.name), attributes, void)?;
        self.builder
            .add_param(add, "value", handler, ParamAttributes::empty())?;
        let remove = self
            .builder
            .define_method(ty, &format!("remove_{}", decl.name), attributes, void)?;
        self.builder
            .add_param(remove, "value", handler, ParamAttributes::empty())?;

        let event = self
            .builder
            .define_event(ty, &decl.name, handler, Some(add), Some(remove))?;
        for attribute in &decl.attributes {
            let attribute = self.lower_attribute(attribute, scope, &context)?;
            self.builder.add_event_attribute(event, attribute)?;
        }
        Ok(())
    }

    /// Lower a parameter list; returns whether the first parameter is an
    /// extension receiver.
    fn lower_params(
        &mut self,
        method: MethodHandle,
        params: &[ParamDecl],
        scope: &Scope,
        context: &str,
    ) -> Result<bool, ManifestError> {
        let mut is_extension = false;
        for (position, decl) in params.iter().enumerate() {
            let (mut param_type, ref_kind) = self.resolve_signature(&decl.ty, scope, context)?;
            let mut attributes = ParamAttributes::empty();
            let mut markers = Vec::new();
            match decl.modifier.as_deref() {
                None => {}
                Some("ref") if ref_kind == RefKind::Value => {
                    param_type = self.builder.by_ref(param_type)?;
                }
                Some("in") if ref_kind == RefKind::Value => {
                    param_type = self.builder.by_ref(param_type)?;
                    attributes |= ParamAttributes::IN;
                    markers.push(self.core().is_read_only_attribute);
                }
                Some("out") if ref_kind == RefKind::Value => {
                    param_type = self.builder.by_ref(param_type)?;
                    attributes |= ParamAttributes::OUT;
                }
                Some("params") => markers.push(self.core().param_array_attribute),
                Some("this") if position == 0 => is_extension = true,
                Some(other) => return Err(invalid_modifier(other, context)),
            }
            if ref_kind == RefKind::RefReadonly {
                attributes |= ParamAttributes::IN;
                markers.push(self.core().is_read_only_attribute);
            }

            let param = self
                .builder
                .add_param(method, &decl.name, param_type, attributes)?;
            for marker in markers {
                self.builder
                    .add_param_attribute(param, CustomAttribute::marker(marker))?;
            }
            if let Some(value) = &decl.default {
                let param_context = format!("parameter `{}` of {context}", decl.name);
                let constant = self.constant(value, Some(param_type), scope, &param_context)?;
                self.builder.set_param_default(param, constant)?;
            }
            for attribute in &decl.attributes {
                let attribute = self.lower_attribute(attribute, scope, context)?;
                self.builder.add_param_attribute(param, attribute)?;
            }
        }
        Ok(is_extension)
    }

    fn lower_attribute(
        &mut self,
        decl: &AttributeDecl,
        scope: &Scope,
        context: &str,
    ) -> Result<CustomAttribute, ManifestError> {
        let with_suffix = format!("{}Attribute", decl.ty);
        let ty = match self.resolve_value(&with_suffix, scope, context) {
            Ok(ty) => ty,
            Err(ManifestError::UnresolvedType { .. }) => {
                self.resolve_value(&decl.ty, scope, context)?
            }
            Err(err) => return Err(err),
        };
        let mut fixed_args = Vec::with_capacity(decl.args.len());
        for arg in &decl.args {
            fixed_args.push(self.constant(arg, None, scope, context)?);
        }
        let mut named_args = Vec::with_capacity(decl.named.len());
        for (name, value) in &decl.named {
            let value = self.constant(value, None, scope, context)?;
            named_args.push((self.builder.intern(name), value));
        }
        Ok(CustomAttribute {
            ty,
            fixed_args,
            named_args,
        })
    }

    /// Convert a JSON value into a constant, using the target type to
    /// choose between `null`/`default` and string/char.
    fn constant(
        &mut self,
        value: &serde_json::Value,
        target: Option<TypeHandle>,
        scope: &Scope,
        context: &str,
    ) -> Result<Constant, ManifestError> {
        use serde_json::Value;

        let invalid = || ManifestError::InvalidConstant {
            context: context.to_owned(),
        };
        match value {
            Value::Null => match target {
                Some(ty) if self.is_value_type(ty) && !self.is_nullable(ty) => {
                    Ok(Constant::Default)
                }
                _ => Ok(Constant::Null),
            },
            Value::Bool(b) => Ok(Constant::Bool(*b)),
            Value::Number(n) => {
                let is_float = target.is_some_and(|ty| {
                    ty == self.core().single || ty == self.core().double
                });
                if is_float || n.is_f64() {
                    n.as_f64().map(Constant::Float).ok_or_else(invalid)
                } else if let Some(int) = n.as_i64() {
                    Ok(Constant::Int(int))
                } else {
                    n.as_u64().map(Constant::UInt).ok_or_else(invalid)
                }
            }
            Value::String(s) => {
                if target == Some(self.core().char) {
                    let mut chars = s.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Ok(Constant::Char(c)),
                        _ => Err(invalid()),
                    }
                } else {
                    Ok(Constant::String(s.as_str().into()))
                }
            }
            Value::Object(map) => match map.get("typeof") {
                Some(Value::String(reference)) if map.len() == 1 => {
                    let ty = self.resolve_value(reference, scope, context)?;
                    Ok(Constant::Type(ty))
                }
                _ => Err(invalid()),
            },
            Value::Array(_) => Err(invalid()),
        }
    }

    // === Type resolution ===

    fn resolve_signature(
        &mut self,
        text: &str,
        scope: &Scope,
        context: &str,
    ) -> Result<(TypeHandle, RefKind), ManifestError> {
        let parsed = parse(text)?;
        match parsed {
            TypeRef::ByRef { inner, readonly } => {
                let inner = self.resolve(&inner, text, scope, context)?;
                let kind = if readonly {
                    RefKind::RefReadonly
                } else {
                    RefKind::Ref
                };
                Ok((self.builder.by_ref(inner)?, kind))
            }
            other => Ok((self.resolve(&other, text, scope, context)?, RefKind::Value)),
        }
    }

    /// Resolve a type that may not be passed by reference.
    fn resolve_value(
        &mut self,
        text: &str,
        scope: &Scope,
        context: &str,
    ) -> Result<TypeHandle, ManifestError> {
        match self.resolve_signature(text, scope, context)? {
            (ty, RefKind::Value) => Ok(ty),
            _ => Err(invalid_modifier("ref", context)),
        }
    }

    fn resolve(
        &mut self,
        reference: &TypeRef,
        text: &str,
        scope: &Scope,
        context: &str,
    ) -> Result<TypeHandle, ManifestError> {
        let unresolved = || ManifestError::UnresolvedType {
            reference: text.to_owned(),
            context: context.to_owned(),
        };
        match reference {
            TypeRef::Named { path, args } => {
                if let [single] = path.as_slice() {
                    if args.is_empty() {
                        if let Some(param) = scope.generic_param(single) {
                            return Ok(param);
                        }
                        if let Some(keyword) = keyword_type(self.core(), single) {
                            return Ok(keyword);
                        }
                    }
                }
                let definition = self.find_named(path, args.len(), scope).ok_or_else(unresolved)?;
                if args.is_empty() {
                    return Ok(definition);
                }
                let mut resolved = Vec::with_capacity(args.len());
                for arg in args {
                    resolved.push(self.resolve(arg, text, scope, context)?);
                }
                Ok(self.builder.instantiate(definition, &resolved)?)
            }
            TypeRef::Tuple(elements) => {
                let definition = self
                    .core()
                    .value_tuples
                    .get(elements.len().saturating_sub(2))
                    .copied()
                    .filter(|_| elements.len() >= 2)
                    .ok_or_else(unresolved)?;
                let mut resolved = Vec::with_capacity(elements.len());
                for element in elements {
                    resolved.push(self.resolve(element, text, scope, context)?);
                }
                Ok(self.builder.instantiate(definition, &resolved)?)
            }
            TypeRef::Array { element, rank } => {
                let element = self.resolve(element, text, scope, context)?;
                Ok(self.builder.array(element, *rank)?)
            }
            TypeRef::Pointer(element) => {
                let element = self.resolve(element, text, scope, context)?;
                Ok(self.builder.pointer(element)?)
            }
            TypeRef::Nullable(inner) => {
                let inner = self.resolve(inner, text, scope, context)?;
                if self.is_value_type(inner) && !self.is_nullable(inner) {
                    let nullable = self.core().nullable;
                    Ok(self.builder.instantiate(nullable, &[inner])?)
                } else {
                    Ok(inner)
                }
            }
            TypeRef::ByRef { .. } => Err(invalid_modifier("ref", context)),
        }
    }

    /// Look up a dotted name with `arity` type arguments, trying the
    /// enclosing types, the namespace and its parents, the global
    /// namespace, the usings, and finally `System`.
    fn find_named(&self, path: &[String], arity: usize, scope: &Scope) -> Option<TypeHandle> {
        let suffix = if arity == 0 {
            String::new()
        } else {
            format!("`{arity}")
        };
        let nested_only = format!("{}{suffix}", path.join("+"));
        for outer in &scope.enclosing {
            if let Some(found) = self.builder.find_type(&format!("{outer}+{nested_only}")) {
                return Some(found);
            }
        }

        // `A.B.C` may be namespace `A.B` + type `C`, or type `A.B` + nested `C`.
        let relative: Vec<String> = (1..=path.len())
            .rev()
            .map(|split| {
                let mut name = path[..split].join(".");
                for nested in &path[split..] {
                    name.push('+');
                    name.push_str(nested);
                }
                name.push_str(&suffix);
                name
            })
            .collect();

        let mut prefixes = Vec::new();
        let mut namespace = scope.namespace.as_str();
        while !namespace.is_empty() {
            prefixes.push(namespace);
            namespace = namespace.rfind('.').map_or("", |dot| &namespace[..dot]);
        }
        prefixes.push("");
        prefixes.extend(self.usings.iter().map(String::as_str));
        prefixes.push("System");

        prefixes.iter().find_map(|prefix| {
            relative.iter().find_map(|name| {
                if prefix.is_empty() {
                    self.builder.find_type(name)
                } else {
                    self.builder.find_type(&format!("{prefix}.{name}"))
                }
            })
        })
    }

    fn is_value_type(&self, ty: TypeHandle) -> bool {
        let core = self.core();
        let Some(row) = self.builder.ty(ty) else {
            return false;
        };
        match &row.shape {
            TypeShape::Definition(def) => {
                ty != core.value_type
                    && ty != core.enum_
                    && def
                        .base
                        .is_some_and(|base| base == core.value_type || base == core.enum_)
            }
            TypeShape::Instance(instance) => self.is_value_type(instance.definition),
            TypeShape::GenericParam(param) => param
                .attributes
                .contains(GenericParamAttributes::NOT_NULLABLE_VALUE_TYPE_CONSTRAINT),
            TypeShape::Array { .. } | TypeShape::ByRef(_) | TypeShape::Pointer(_) => false,
        }
    }

    fn is_nullable(&self, ty: TypeHandle) -> bool {
        matches!(
            self.builder.ty(ty).map(|row| &row.shape),
            Some(TypeShape::Instance(instance)) if instance.definition == self.core().nullable
        )
    }
}

fn parse(text: &str) -> Result<TypeRef, ManifestError> {
    type_ref::parse(text).map_err(|error| ManifestError::TypeSyntax {
        reference: text.to_owned(),
        error,
    })
}

fn keyword_type(core: &CoreTypes, keyword: &str) -> Option<TypeHandle> {
    let ty = match keyword {
        "object" => core.object,
        "void" => core.void,
        "bool" => core.boolean,
        "char" => core.char,
        "sbyte" => core.sbyte,
        "byte" => core.byte,
        "short" => core.int16,
        "ushort" => core.uint16,
        "int" => core.int32,
        "uint" => core.uint32,
        "long" => core.int64,
        "ulong" => core.uint64,
        "nint" => core.intptr,
        "nuint" => core.uintptr,
        "float" => core.single,
        "double" => core.double,
        "decimal" => core.decimal,
        "string" => core.string,
        _ => return None,
    };
    Some(ty)
}

fn is_special_constraint(constraint: &str) -> bool {
    matches!(constraint, "class" | "struct" | "new()" | "unmanaged" | "notnull")
}

fn invalid_modifier(modifier: &str, context: &str) -> ManifestError {
    ManifestError::InvalidModifier {
        modifier: modifier.to_owned(),
        context: context.to_owned(),
    }
}

fn default_access(in_interface: bool) -> MemberAccess {
    if in_interface {
        MemberAccess::Public
    } else {
        MemberAccess::Private
    }
}

fn member_access(
    access: Option<&str>,
    default: MemberAccess,
    context: &str,
) -> Result<MemberAccess, ManifestError> {
    Ok(match access {
        None => default,
        Some("public") => MemberAccess::Public,
        Some("private") => MemberAccess::Private,
        Some("protected") => MemberAccess::Family,
        Some("internal") => MemberAccess::Assembly,
        Some("protected internal") => MemberAccess::FamilyOrAssembly,
        Some("private protected") => MemberAccess::FamilyAndAssembly,
        Some(other) => return Err(invalid_modifier(other, context)),
    })
}

fn type_attributes(
    decl: &TypeDecl,
    nested: bool,
    context: &str,
) -> Result<TypeAttributes, ManifestError> {
    let visibility = match (decl.access.as_deref(), nested) {
        (None | Some("internal"), false) => TypeVisibility::NotPublic,
        (Some("public"), false) => TypeVisibility::Public,
        (None | Some("private"), true) => TypeVisibility::NestedPrivate,
        (Some("public"), true) => TypeVisibility::NestedPublic,
        (Some("protected"), true) => TypeVisibility::NestedFamily,
        (Some("internal"), true) => TypeVisibility::NestedAssembly,
        (Some("protected internal"), true) => TypeVisibility::NestedFamilyOrAssembly,
        (Some("private protected"), true) => TypeVisibility::NestedFamilyAndAssembly,
        (Some(other), _) => return Err(invalid_modifier(other, context)),
    };
    let mut attributes = TypeAttributes::empty().with_visibility(visibility);
    attributes |= match decl.kind {
        TypeKind::Class => TypeAttributes::empty(),
        TypeKind::Interface => TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT,
        TypeKind::Struct | TypeKind::Enum | TypeKind::Delegate => TypeAttributes::SEALED,
    };
    for modifier in &decl.modifiers {
        attributes |= match (modifier.as_str(), decl.kind) {
            ("static", TypeKind::Class) => TypeAttributes::ABSTRACT | TypeAttributes::SEALED,
            ("abstract", TypeKind::Class) => TypeAttributes::ABSTRACT,
            ("sealed", TypeKind::Class) => TypeAttributes::SEALED,
            ("readonly" | "ref", TypeKind::Struct) => TypeAttributes::empty(),
            (other, _) => return Err(invalid_modifier(other, context)),
        };
    }
    Ok(attributes)
}

fn generic_param_attributes(
    decl: &GenericParamDecl,
    context: &str,
) -> Result<GenericParamAttributes, ManifestError> {
    let mut attributes = match decl.variance.as_deref() {
        None => GenericParamAttributes::empty(),
        Some("out") => GenericParamAttributes::COVARIANT,
        Some("in") => GenericParamAttributes::CONTRAVARIANT,
        Some(other) => return Err(invalid_modifier(other, context)),
    };
    for constraint in &decl.constraints {
        attributes |= match constraint.as_str() {
            "class" => GenericParamAttributes::REFERENCE_TYPE_CONSTRAINT,
            "struct" | "unmanaged" => {
                GenericParamAttributes::NOT_NULLABLE_VALUE_TYPE_CONSTRAINT
                    | GenericParamAttributes::DEFAULT_CONSTRUCTOR_CONSTRAINT
            }
            "new()" => GenericParamAttributes::DEFAULT_CONSTRUCTOR_CONSTRAINT,
            _ => GenericParamAttributes::empty(),
        };
    }
    Ok(attributes)
}

/// Method-like modifiers shared by methods, property accessors, and event
/// accessors.
struct MethodModifiers {
    attributes: MethodAttributes,
    access: MemberAccess,
    is_async: bool,
    is_readonly: bool,
}

impl MethodModifiers {
    fn parse(
        modifiers: &[String],
        access: Option<&str>,
        in_interface: bool,
        context: &str,
    ) -> Result<Self, ManifestError> {
        let access = member_access(access, default_access(in_interface), context)?;
        let mut attributes = MethodAttributes::HIDE_BY_SIG.with_access(access);
        let mut is_async = false;
        let mut is_readonly = false;
        let mut is_static = false;
        for modifier in modifiers {
            match modifier.as_str() {
                "static" => {
                    attributes |= MethodAttributes::STATIC;
                    is_static = true;
                }
                "abstract" => {
                    attributes |= MethodAttributes::ABSTRACT
                        | MethodAttributes::VIRTUAL
                        | MethodAttributes::NEW_SLOT;
                }
                "virtual" => attributes |= MethodAttributes::VIRTUAL | MethodAttributes::NEW_SLOT,
                "override" => attributes |= MethodAttributes::VIRTUAL,
                "sealed" => attributes |= MethodAttributes::FINAL,
                "extern" => attributes |= MethodAttributes::PINVOKE_IMPL,
                "new" => {}
                "async" => is_async = true,
                "readonly" => is_readonly = true,
                other => return Err(invalid_modifier(other, context)),
            }
        }
        if in_interface && !is_static {
            attributes |=
                MethodAttributes::ABSTRACT | MethodAttributes::VIRTUAL | MethodAttributes::NEW_SLOT;
        }
        Ok(Self {
            attributes,
            access,
            is_async,
            is_readonly,
        })
    }
}
