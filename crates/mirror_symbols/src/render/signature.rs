//! Declaration signatures.
//!
//! Layout: `[attributes] modifiers returnType Name<T>(parameters) [: bases]
//! [where clauses]` with a terminator that depends on the kind (`;` for
//! members and delegates, `}` closing a property body, nothing for other
//! type declarations and enum members).
//!
//! Modifier order: access, `static`/`const`, `sealed`, `abstract`/`virtual`,
//! `readonly`, `override`, then `async`/`extern` and the kind keyword.

use std::sync::Arc;

use mirror_meta::{
    strip_arity, CustomAttribute, GenericParamAttributes, MethodAttributes, TypeDef,
    TypeDefinition, TypeHandle, TypeShape, Universe, Variance,
};

use super::constant::push_constant;
use super::display::push_type_qualifier;
use super::{
    push_attribute, push_list, push_type, signature, simple_type_name, visible_attributes,
    SignatureOptions,
};
use crate::rules::{self, OperatorName};
use crate::symbol::{
    ConstructorSymbol, EventSymbol, FieldSymbol, MethodSymbol, ParameterSymbol, PropertySymbol,
    TypeCategory, TypeSymbol,
};
use crate::{Access, Symbol, SymbolCache, SymbolError, SymbolFlags, SymbolKind, SymbolResult};

/// Write the signature of `symbol` into `buf`.
pub fn format_signature_into(
    cache: &SymbolCache,
    symbol: &Symbol,
    options: SignatureOptions,
    buf: &mut String,
) -> SymbolResult<()> {
    let writer = Writer { cache, options };
    match symbol.kind() {
        SymbolKind::Type(ty) => writer.type_declaration(symbol, ty, buf),
        SymbolKind::Method(method) => writer.method(symbol, method, buf),
        SymbolKind::Constructor(ctor) => writer.constructor(symbol, ctor, buf),
        SymbolKind::Field(field) => writer.field(symbol, field, buf),
        SymbolKind::Property(property) => writer.property(symbol, property, buf),
        SymbolKind::Event(event) => writer.event(symbol, event, buf),
        SymbolKind::Parameter(param) => writer.parameter(symbol, param, buf),
    }
}

struct Writer<'c> {
    cache: &'c SymbolCache,
    options: SignatureOptions,
}

impl Writer<'_> {
    fn universe(&self) -> &Universe {
        self.cache.universe()
    }

    fn type_ref(&self, ty: TypeHandle, buf: &mut String) -> SymbolResult<()> {
        push_type(self.cache, ty, self.options.type_refs(), buf)
    }

    /// A possibly by-ref type: `ref T`, `ref readonly T`, or `T`.
    fn ref_type(&self, ty: TypeHandle, readonly: bool, buf: &mut String) -> SymbolResult<()> {
        match self.universe().ty(ty).map(|row| &row.shape) {
            Some(TypeShape::ByRef(inner)) => {
                buf.push_str(if readonly { "ref readonly " } else { "ref " });
                self.type_ref(*inner, buf)
            }
            _ => self.type_ref(ty, buf),
        }
    }

    fn attribute_lines(
        &self,
        attributes: &[CustomAttribute],
        target: Option<&str>,
        buf: &mut String,
    ) -> SymbolResult<()> {
        if self.options.compact {
            return Ok(());
        }
        for attribute in visible_attributes(self.cache, attributes) {
            push_attribute(self.cache, attribute, target, self.options.type_refs(), buf)?;
            buf.push('\n');
        }
        Ok(())
    }

    fn is_interface_member(&self, symbol: &Symbol) -> bool {
        symbol.key().declaring().is_some_and(|ty| {
            rules::type_category(self.universe(), ty) == Some(TypeCategory::Interface)
        })
    }

    /// Access and inheritance modifiers of a member.
    fn member_modifiers(
        &self,
        access: Access,
        flags: SymbolFlags,
        in_interface: bool,
        buf: &mut String,
    ) {
        buf.push_str(access.keyword());
        buf.push(' ');
        if flags.contains(SymbolFlags::STATIC) {
            buf.push_str("static ");
        }
        if flags.contains(SymbolFlags::FINAL | SymbolFlags::OVERRIDE) {
            buf.push_str("sealed ");
        }
        if !in_interface {
            if flags.contains(SymbolFlags::ABSTRACT) {
                buf.push_str("abstract ");
            } else if flags.contains(SymbolFlags::VIRTUAL) {
                buf.push_str("virtual ");
            }
        }
        if flags.contains(SymbolFlags::READONLY) {
            buf.push_str("readonly ");
        }
        if flags.contains(SymbolFlags::OVERRIDE) {
            buf.push_str("override ");
        }
    }

    // === Types ===

    fn type_declaration(
        &self,
        symbol: &Symbol,
        ty: &TypeSymbol,
        buf: &mut String,
    ) -> SymbolResult<()> {
        let universe = self.universe();
        let row = universe
            .ty(ty.handle())
            .ok_or_else(|| SymbolError::not_found(format!("{:?}", ty.handle())))?;
        let def = match &row.shape {
            TypeShape::Definition(def) => def,
            TypeShape::Instance(instance) => {
                let definition = self.cache.resolve_type(instance.definition)?;
                buf.push_str(signature(self.cache, &definition, self.options)?);
                return Ok(());
            }
            TypeShape::Array { .. }
            | TypeShape::ByRef(_)
            | TypeShape::Pointer(_)
            | TypeShape::GenericParam(_) => return self.type_ref(ty.handle(), buf),
        };

        self.attribute_lines(&def.custom_attributes, None, buf)?;
        let category = ty.category(self.cache)?;
        let flags = symbol.flags(self.cache)?;
        buf.push_str(symbol.access(self.cache)?.keyword());
        buf.push(' ');
        match category {
            TypeCategory::Class => {
                if flags.contains(SymbolFlags::STATIC) {
                    buf.push_str("static ");
                } else if flags.contains(SymbolFlags::ABSTRACT) {
                    buf.push_str("abstract ");
                } else if flags.contains(SymbolFlags::FINAL) {
                    buf.push_str("sealed ");
                }
            }
            TypeCategory::Struct => {
                if flags.contains(SymbolFlags::READONLY) {
                    buf.push_str("readonly ");
                }
                if flags.contains(SymbolFlags::REF_LIKE) {
                    buf.push_str("ref ");
                }
            }
            _ => {}
        }

        if category == TypeCategory::Delegate {
            return self.delegate(ty, row, def, buf);
        }

        if let Some(keyword) = category.keyword() {
            buf.push_str(keyword);
            buf.push(' ');
        }
        self.declared_name(row, def, buf)?;

        let mut bases: Vec<TypeHandle> = Vec::new();
        let core = universe.core();
        match category {
            TypeCategory::Class => bases.extend(def.base.filter(|&base| base != core.object)),
            TypeCategory::Enum => {
                if let Some(underlying) = ty.enum_underlying_type(self.cache)? {
                    let underlying = underlying.as_type()?.handle();
                    if underlying != core.int32 {
                        bases.push(underlying);
                    }
                }
            }
            _ => {}
        }
        if category != TypeCategory::Enum {
            bases.extend(def.interfaces.iter().copied());
        }
        if !bases.is_empty() {
            buf.push_str(" : ");
            push_list(buf, bases, |buf, base| self.type_ref(base, buf))?;
        }
        self.where_clauses(&def.generic_params, buf)
    }

    /// `delegate R Name<T>(parameters) where ...;`
    fn delegate(
        &self,
        ty: &TypeSymbol,
        row: &TypeDef,
        def: &TypeDefinition,
        buf: &mut String,
    ) -> SymbolResult<()> {
        buf.push_str("delegate ");
        let invoke = ty.delegate_invoke(self.cache)?;
        let invoke_def = invoke
            .as_ref()
            .and_then(|invoke| invoke.as_method().ok())
            .and_then(|method| self.universe().method(method.handle()));
        match invoke_def {
            Some(invoke_def) => {
                let readonly = self.has_read_only_return(&invoke_def.return_attributes);
                self.ref_type(invoke_def.return_type, readonly, buf)?;
            }
            None => buf.push_str("void"),
        }
        buf.push(' ');
        self.declared_name(row, def, buf)?;
        buf.push('(');
        if let Some(invoke) = &invoke {
            self.parameter_list(&invoke.parameters(self.cache)?, buf)?;
        }
        buf.push(')');
        self.where_clauses(&def.generic_params, buf)?;
        buf.push(';');
        Ok(())
    }

    /// A declared type's own name, qualified on request, with its generic
    /// parameters and their variance.
    fn declared_name(
        &self,
        row: &TypeDef,
        def: &TypeDefinition,
        buf: &mut String,
    ) -> SymbolResult<()> {
        push_type_qualifier(
            self.cache,
            def.declaring_type,
            row.namespace,
            self.options.type_refs(),
            buf,
        )?;
        buf.push_str(strip_arity(self.universe().str(row.name)));
        self.generic_parameter_list(&def.generic_params, buf)
    }

    fn generic_parameter_list(&self, params: &[TypeHandle], buf: &mut String) -> SymbolResult<()> {
        if params.is_empty() {
            return Ok(());
        }
        let universe = self.universe();
        buf.push('<');
        push_list(buf, params, |buf, &param| {
            let variance = universe
                .ty(param)
                .and_then(|row| row.shape.as_generic_param())
                .and_then(|gp| gp.attributes.variance());
            match variance {
                Some(Variance::Covariant) => buf.push_str("out "),
                Some(Variance::Contravariant) => buf.push_str("in "),
                Some(Variance::Invariant) | None => {}
            }
            self.type_ref(param, buf)
        })?;
        buf.push('>');
        Ok(())
    }

    /// ` where T : class, IFoo, new()` for each constrained parameter.
    fn where_clauses(&self, params: &[TypeHandle], buf: &mut String) -> SymbolResult<()> {
        let universe = self.universe();
        let value_type = universe.core().value_type;
        for &param in params {
            let Some(gp) = universe.ty(param).and_then(|row| row.shape.as_generic_param()) else {
                continue;
            };
            let is_struct = gp
                .attributes
                .contains(GenericParamAttributes::NOT_NULLABLE_VALUE_TYPE_CONSTRAINT);
            let is_class = gp
                .attributes
                .contains(GenericParamAttributes::REFERENCE_TYPE_CONSTRAINT);
            let new = !is_struct
                && gp
                    .attributes
                    .contains(GenericParamAttributes::DEFAULT_CONSTRUCTOR_CONSTRAINT);
            let types: Vec<TypeHandle> = gp
                .constraints
                .iter()
                .copied()
                .filter(|&c| !(is_struct && c == value_type))
                .collect();
            if !is_struct && !is_class && !new && types.is_empty() {
                continue;
            }

            buf.push_str(" where ");
            self.type_ref(param, buf)?;
            buf.push_str(" : ");
            let mut first = true;
            let mut separate = |buf: &mut String| {
                if !first {
                    buf.push_str(", ");
                }
                first = false;
            };
            if is_class {
                separate(buf);
                buf.push_str("class");
            } else if is_struct {
                separate(buf);
                buf.push_str("struct");
            }
            for constraint in types {
                separate(buf);
                self.type_ref(constraint, buf)?;
            }
            if new {
                separate(buf);
                buf.push_str("new()");
            }
        }
        Ok(())
    }

    // === Methods ===

    fn has_read_only_return(&self, return_attributes: &[CustomAttribute]) -> bool {
        Universe::has_attribute(
            return_attributes,
            self.universe().core().is_read_only_attribute,
        )
    }

    fn method(&self, symbol: &Symbol, method: &MethodSymbol, buf: &mut String) -> SymbolResult<()> {
        let universe = self.universe();
        let def = universe
            .method(method.handle())
            .ok_or_else(|| SymbolError::not_found(format!("{:?}", method.handle())))?;
        if let Some(instance) = &def.instantiation {
            let definition = self.cache.resolve_method(instance.definition)?;
            buf.push_str(signature(self.cache, &definition, self.options)?);
            return Ok(());
        }

        self.attribute_lines(&def.custom_attributes, None, buf)?;
        self.attribute_lines(&def.return_attributes, Some("return"), buf)?;
        let flags = symbol.flags(self.cache)?;
        let access = symbol.access(self.cache)?;
        self.member_modifiers(access, flags, self.is_interface_member(symbol), buf);
        if flags.contains(SymbolFlags::ASYNC) {
            buf.push_str("async ");
        }
        if def.attributes.contains(MethodAttributes::PINVOKE_IMPL) {
            buf.push_str("extern ");
        }

        let readonly_return = self.has_read_only_return(&def.return_attributes);
        match method.operator(self.cache) {
            Some(OperatorName::Conversion(direction)) => {
                buf.push_str(direction);
                buf.push_str(" operator ");
                self.type_ref(def.return_type, buf)?;
            }
            Some(OperatorName::Symbol(token)) => {
                self.ref_type(def.return_type, readonly_return, buf)?;
                buf.push_str(" operator ");
                buf.push_str(token);
            }
            None => {
                self.ref_type(def.return_type, readonly_return, buf)?;
                buf.push(' ');
                buf.push_str(strip_arity(symbol.name(self.cache)));
                self.generic_parameter_list(&def.generic_params, buf)?;
            }
        }
        buf.push('(');
        self.parameter_list(&method.parameters(self.cache)?, buf)?;
        buf.push(')');
        self.where_clauses(&def.generic_params, buf)?;
        buf.push(';');
        Ok(())
    }

    fn constructor(
        &self,
        symbol: &Symbol,
        ctor: &ConstructorSymbol,
        buf: &mut String,
    ) -> SymbolResult<()> {
        let def = self
            .universe()
            .method(ctor.handle())
            .ok_or_else(|| SymbolError::not_found(format!("{:?}", ctor.handle())))?;
        let declaring = symbol
            .key()
            .declaring()
            .ok_or_else(|| SymbolError::invariant("constructor", "no declaring type"))?;
        self.attribute_lines(&def.custom_attributes, None, buf)?;
        if ctor.is_type_initializer(self.cache) {
            buf.push_str("static ");
        } else {
            buf.push_str(symbol.access(self.cache)?.keyword());
            buf.push(' ');
        }
        buf.push_str(simple_type_name(self.cache, declaring));
        buf.push('(');
        self.parameter_list(&ctor.parameters(self.cache)?, buf)?;
        buf.push_str(");");
        Ok(())
    }

    // === Fields, properties, events ===

    fn field(&self, symbol: &Symbol, field: &FieldSymbol, buf: &mut String) -> SymbolResult<()> {
        let universe = self.universe();
        let def = universe
            .field(field.handle())
            .ok_or_else(|| SymbolError::not_found(format!("{:?}", field.handle())))?;
        let flags = symbol.flags(self.cache)?;
        self.attribute_lines(&def.custom_attributes, None, buf)?;

        let in_enum = symbol.key().declaring().is_some_and(|ty| {
            rules::type_category(universe, ty) == Some(TypeCategory::Enum)
        });
        if in_enum && flags.contains(SymbolFlags::CONSTANT) {
            buf.push_str(symbol.name(self.cache));
            if let Some(value) = field.constant(self.cache) {
                buf.push_str(" = ");
                push_constant(self.cache, value, None, self.options.type_refs(), buf)?;
            }
            return Ok(());
        }

        buf.push_str(symbol.access(self.cache)?.keyword());
        buf.push(' ');
        if flags.contains(SymbolFlags::CONSTANT) {
            buf.push_str("const ");
        } else if flags.contains(SymbolFlags::STATIC) {
            buf.push_str("static ");
        }
        if flags.contains(SymbolFlags::READONLY) {
            buf.push_str("readonly ");
        }
        let readonly_ref = Universe::has_attribute(
            &def.custom_attributes,
            universe.core().is_read_only_attribute,
        );
        self.ref_type(def.ty, readonly_ref, buf)?;
        buf.push(' ');
        buf.push_str(symbol.name(self.cache));
        if flags.contains(SymbolFlags::CONSTANT) {
            if let Some(value) = field.constant(self.cache) {
                buf.push_str(" = ");
                push_constant(self.cache, value, Some(def.ty), self.options.type_refs(), buf)?;
            }
        }
        buf.push(';');
        Ok(())
    }

    fn property(
        &self,
        symbol: &Symbol,
        property: &PropertySymbol,
        buf: &mut String,
    ) -> SymbolResult<()> {
        let universe = self.universe();
        let def = universe
            .property(property.handle())
            .ok_or_else(|| SymbolError::not_found(format!("{:?}", property.handle())))?;
        self.attribute_lines(&def.custom_attributes, None, buf)?;

        let access = symbol.access(self.cache)?;
        let flags = symbol.flags(self.cache)?;
        // On properties READONLY means get-only, which the body shows.
        self.member_modifiers(
            access,
            flags - SymbolFlags::READONLY,
            self.is_interface_member(symbol),
            buf,
        );

        let getter = property.getter(self.cache)?;
        let setter = property.setter(self.cache)?;
        let readonly_ref = def
            .getter
            .and_then(|m| universe.method(m))
            .is_some_and(|m| self.has_read_only_return(&m.return_attributes));
        self.ref_type(def.ty, readonly_ref, buf)?;
        buf.push(' ');
        if property.is_indexer(self.cache) {
            buf.push_str("this[");
            self.parameter_list(&property.index_parameters(self.cache)?, buf)?;
            buf.push(']');
        } else {
            buf.push_str(symbol.name(self.cache));
        }

        buf.push_str(" { ");
        if let Some(getter) = &getter {
            self.accessor_prefix(getter, access, buf)?;
            buf.push_str("get; ");
        }
        if let Some(setter) = &setter {
            self.accessor_prefix(setter, access, buf)?;
            buf.push_str(if property.is_init_only(self.cache) {
                "init; "
            } else {
                "set; "
            });
        }
        buf.push('}');
        Ok(())
    }

    /// An accessor more restrictive than its property carries its own
    /// modifier.
    fn accessor_prefix(
        &self,
        accessor: &Arc<Symbol>,
        property_access: Access,
        buf: &mut String,
    ) -> SymbolResult<()> {
        let access = accessor.access(self.cache)?;
        if access < property_access {
            buf.push_str(access.keyword());
            buf.push(' ');
        }
        Ok(())
    }

    fn event(&self, symbol: &Symbol, event: &EventSymbol, buf: &mut String) -> SymbolResult<()> {
        let def = self
            .universe()
            .event(event.handle())
            .ok_or_else(|| SymbolError::not_found(format!("{:?}", event.handle())))?;
        self.attribute_lines(&def.custom_attributes, None, buf)?;
        let access = symbol.access(self.cache)?;
        let flags = symbol.flags(self.cache)?;
        self.member_modifiers(access, flags, self.is_interface_member(symbol), buf);
        buf.push_str("event ");
        self.type_ref(def.handler_type, buf)?;
        buf.push(' ');
        buf.push_str(symbol.name(self.cache));
        buf.push(';');
        Ok(())
    }

    // === Parameters ===

    fn parameter_list(&self, params: &[Arc<Symbol>], buf: &mut String) -> SymbolResult<()> {
        push_list(buf, params, |buf, param| {
            let payload = param.as_parameter()?;
            self.parameter(param, payload, buf)
        })
    }

    /// `[Attr] this params ref Type name = default`
    fn parameter(
        &self,
        symbol: &Symbol,
        param: &ParameterSymbol,
        buf: &mut String,
    ) -> SymbolResult<()> {
        let def = self
            .universe()
            .param(param.handle())
            .ok_or_else(|| SymbolError::not_found(format!("{:?}", param.handle())))?;
        if !self.options.compact {
            for attribute in visible_attributes(self.cache, &def.custom_attributes) {
                push_attribute(self.cache, attribute, None, self.options.type_refs(), buf)?;
                buf.push(' ');
            }
        }

        let flags = symbol.flags(self.cache)?;
        if flags.contains(SymbolFlags::RECEIVER) {
            buf.push_str("this ");
        }
        if flags.contains(SymbolFlags::PARAMS) {
            buf.push_str("params ");
        }
        let mut ty = def.ty;
        if flags.contains(SymbolFlags::BY_REF) {
            buf.push_str(if flags.contains(SymbolFlags::OUT) {
                "out "
            } else if flags.intersects(SymbolFlags::IN | SymbolFlags::READONLY) {
                "in "
            } else {
                "ref "
            });
            ty = rules::strip_by_ref(self.universe(), ty);
        }
        self.type_ref(ty, buf)?;
        buf.push(' ');
        buf.push_str(symbol.name(self.cache));
        if let Some(default) = param.default_value(self.cache) {
            buf.push_str(" = ");
            push_constant(self.cache, default, Some(ty), self.options.type_refs(), buf)?;
        }
        Ok(())
    }
}
