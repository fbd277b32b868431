//! Kind-specific descriptor payloads.

use std::sync::Arc;

use mirror_meta::{
    Constant, EventHandle, FieldHandle, GenericParamAttributes, MethodHandle, ParamAttributes,
    ParamHandle, PropertyHandle, TypeHandle, TypeShape, Universe, Variance,
};

use super::Symbol;
use crate::memo::Memo;
use crate::{rules, SymbolCache, SymbolError, SymbolResult};

/// What kind of type a type symbol denotes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
    GenericParameter,
    Array,
    ByRef,
    Pointer,
}

impl TypeCategory {
    /// Declaration keyword, for declarable categories.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            TypeCategory::Class => Some("class"),
            TypeCategory::Struct => Some("struct"),
            TypeCategory::Interface => Some("interface"),
            TypeCategory::Enum => Some("enum"),
            TypeCategory::Delegate => Some("delegate"),
            TypeCategory::GenericParameter
            | TypeCategory::Array
            | TypeCategory::ByRef
            | TypeCategory::Pointer => None,
        }
    }
}

fn resolve_types(cache: &SymbolCache, types: &[TypeHandle]) -> SymbolResult<Vec<Arc<Symbol>>> {
    types.iter().map(|&ty| cache.resolve_type(ty)).collect()
}

fn resolve_params(
    cache: &SymbolCache,
    method: MethodHandle,
    count: usize,
) -> SymbolResult<Vec<Arc<Symbol>>> {
    (0..count)
        .map(|position| {
            let position = u16::try_from(position)
                .map_err(|_| SymbolError::invariant(format!("{method:?}"), "too many parameters"))?;
            cache.resolve_parameter(ParamHandle::new(method, position))
        })
        .collect()
}

fn missing(what: impl std::fmt::Debug) -> SymbolError {
    SymbolError::not_found(format!("{what:?}"))
}

// === Types ===

/// A type: declared, constructed, or a generic parameter.
pub struct TypeSymbol {
    handle: TypeHandle,
    awaitable: Memo<bool>,
}

impl TypeSymbol {
    pub(super) fn new(handle: TypeHandle) -> Self {
        Self {
            handle,
            awaitable: Memo::new(),
        }
    }

    #[inline]
    pub fn handle(&self) -> TypeHandle {
        self.handle
    }

    fn shape<'u>(&self, universe: &'u Universe) -> SymbolResult<&'u TypeShape> {
        universe
            .ty(self.handle)
            .map(|row| &row.shape)
            .ok_or_else(|| missing(self.handle))
    }

    pub fn category(&self, cache: &SymbolCache) -> SymbolResult<TypeCategory> {
        rules::type_category(cache.universe(), self.handle).ok_or_else(|| missing(self.handle))
    }

    /// Whether the type prints as a language keyword.
    pub fn is_built_in(&self, cache: &SymbolCache) -> bool {
        rules::is_built_in(cache.universe(), self.handle)
    }

    /// Base class; instances report their definition's base.
    pub fn base_type(&self, cache: &SymbolCache) -> SymbolResult<Option<Arc<Symbol>>> {
        cache
            .universe()
            .base_type(self.handle)
            .map(|base| cache.resolve_type(base))
            .transpose()
    }

    /// Directly implemented interfaces, in declaration order.
    pub fn interfaces(&self, cache: &SymbolCache) -> SymbolResult<Vec<Arc<Symbol>>> {
        match cache.universe().underlying_definition(self.handle) {
            Some(def) => resolve_types(cache, &def.interfaces),
            None => Ok(Vec::new()),
        }
    }

    /// Generic parameters of the (underlying) definition.
    pub fn generic_parameters(&self, cache: &SymbolCache) -> SymbolResult<Vec<Arc<Symbol>>> {
        match cache.universe().underlying_definition(self.handle) {
            Some(def) => resolve_types(cache, &def.generic_params),
            None => Ok(Vec::new()),
        }
    }

    /// Arguments of an instance, or a definition's own parameters.
    pub fn generic_arguments(&self, cache: &SymbolCache) -> SymbolResult<Vec<Arc<Symbol>>> {
        match self.shape(cache.universe())? {
            TypeShape::Instance(instance) => resolve_types(cache, &instance.args),
            TypeShape::Definition(def) => resolve_types(cache, &def.generic_params),
            _ => Ok(Vec::new()),
        }
    }

    /// Element of an array, by-ref, or pointer.
    pub fn element_type(&self, cache: &SymbolCache) -> SymbolResult<Option<Arc<Symbol>>> {
        let element = match self.shape(cache.universe())? {
            TypeShape::Array { element, .. } => *element,
            TypeShape::ByRef(element) | TypeShape::Pointer(element) => *element,
            _ => return Ok(None),
        };
        cache.resolve_type(element).map(Some)
    }

    /// Rank of an array type.
    pub fn array_rank(&self, cache: &SymbolCache) -> Option<u8> {
        match cache.universe().ty(self.handle).map(|row| &row.shape) {
            Some(TypeShape::Array { rank, .. }) => Some(*rank),
            _ => None,
        }
    }

    /// Variance of a generic parameter.
    pub fn variance(&self, cache: &SymbolCache) -> SymbolResult<Variance> {
        let param = self.generic_param(cache)?;
        param
            .variance()
            .ok_or_else(|| SymbolError::invariant(format!("{:?}", self.handle), "reserved variance"))
    }

    /// Special constraint bits of a generic parameter.
    pub fn special_constraints(&self, cache: &SymbolCache) -> SymbolResult<GenericParamAttributes> {
        Ok(self.generic_param(cache)? & GenericParamAttributes::SPECIAL_CONSTRAINT_MASK)
    }

    /// Base class and interface constraints of a generic parameter.
    pub fn constraints(&self, cache: &SymbolCache) -> SymbolResult<Vec<Arc<Symbol>>> {
        match self.shape(cache.universe())? {
            TypeShape::GenericParam(param) => resolve_types(cache, &param.constraints),
            _ => Err(SymbolError::unsupported("non-generic-parameter type", "constraints")),
        }
    }

    fn generic_param(&self, cache: &SymbolCache) -> SymbolResult<GenericParamAttributes> {
        match self.shape(cache.universe())? {
            TypeShape::GenericParam(param) => Ok(param.attributes),
            _ => Err(SymbolError::unsupported("non-generic-parameter type", "variance")),
        }
    }

    /// Underlying integral type of an enum (the `value__` field's type).
    pub fn enum_underlying_type(&self, cache: &SymbolCache) -> SymbolResult<Option<Arc<Symbol>>> {
        let universe = cache.universe();
        if self.category(cache)? != TypeCategory::Enum {
            return Ok(None);
        }
        let enum_value = universe.well_known().enum_value;
        let field = universe
            .underlying_definition(self.handle)
            .into_iter()
            .flat_map(|def| def.fields.iter())
            .filter_map(|&f| universe.field(f))
            .find(|f| f.name == enum_value);
        field.map(|f| cache.resolve_type(f.ty)).transpose()
    }

    /// The `Invoke` method of a delegate type.
    pub fn delegate_invoke(&self, cache: &SymbolCache) -> SymbolResult<Option<Arc<Symbol>>> {
        let universe = cache.universe();
        if self.category(cache)? != TypeCategory::Delegate {
            return Ok(None);
        }
        let invoke = universe.well_known().invoke;
        let method = universe
            .underlying_definition(self.handle)
            .into_iter()
            .flat_map(|def| def.methods.iter().copied())
            .find(|&m| universe.method(m).is_some_and(|def| def.name == invoke));
        method.map(|m| cache.resolve_method(m)).transpose()
    }

    /// Whether `await` applies to a value of this type.
    pub fn is_awaitable(&self, cache: &SymbolCache) -> SymbolResult<bool> {
        self.awaitable
            .get_or_derive(cache.counters(), || Ok(cache.type_is_awaitable(self.handle)))
            .copied()
    }
}

// === Methods ===

/// A method other than a constructor; includes accessors, operators, and
/// generic method instantiations.
pub struct MethodSymbol {
    handle: MethodHandle,
    extension: Memo<bool>,
    awaitable: Memo<bool>,
}

impl MethodSymbol {
    pub(super) fn new(handle: MethodHandle) -> Self {
        Self {
            handle,
            extension: Memo::new(),
            awaitable: Memo::new(),
        }
    }

    #[inline]
    pub fn handle(&self) -> MethodHandle {
        self.handle
    }

    pub fn parameters(&self, cache: &SymbolCache) -> SymbolResult<Vec<Arc<Symbol>>> {
        let def = cache.universe().method(self.handle).ok_or_else(|| missing(self.handle))?;
        resolve_params(cache, self.handle, def.params.len())
    }

    pub fn return_type(&self, cache: &SymbolCache) -> SymbolResult<Arc<Symbol>> {
        let def = cache.universe().method(self.handle).ok_or_else(|| missing(self.handle))?;
        cache.resolve_type(def.return_type)
    }

    /// Own generic parameters of a definition, or arguments of an
    /// instantiation.
    pub fn generic_arguments(&self, cache: &SymbolCache) -> SymbolResult<Vec<Arc<Symbol>>> {
        let def = cache.universe().method(self.handle).ok_or_else(|| missing(self.handle))?;
        match &def.instantiation {
            Some(instance) => resolve_types(cache, &instance.args),
            None => resolve_types(cache, &def.generic_params),
        }
    }

    /// The generic method definition behind an instantiation.
    pub fn generic_definition(&self, cache: &SymbolCache) -> SymbolResult<Arc<Symbol>> {
        let def = cache.universe().method(self.handle).ok_or_else(|| missing(self.handle))?;
        let definition = def.instantiation.as_ref().map_or(self.handle, |i| i.definition);
        cache.resolve_method(definition)
    }

    pub fn is_extension_method(&self, cache: &SymbolCache) -> SymbolResult<bool> {
        self.extension
            .get_or_derive(cache.counters(), || {
                Ok(rules::is_extension_method(cache.universe(), self.handle))
            })
            .copied()
    }

    /// Whether the method's result can be awaited.
    pub fn is_awaitable(&self, cache: &SymbolCache) -> SymbolResult<bool> {
        self.awaitable
            .get_or_derive(cache.counters(), || {
                let def = cache.universe().method(self.handle).ok_or_else(|| missing(self.handle))?;
                cache.resolve_type(def.return_type)?.is_awaitable(cache)
            })
            .copied()
    }

    pub fn is_async(&self, cache: &SymbolCache) -> bool {
        rules::is_async(cache.universe(), self.handle)
    }

    pub fn operator(&self, cache: &SymbolCache) -> Option<rules::OperatorName> {
        rules::method_operator(cache.universe(), self.handle)
    }
}

// === Constructors ===

/// An instance constructor or a type initializer.
pub struct ConstructorSymbol {
    handle: MethodHandle,
}

impl ConstructorSymbol {
    pub(super) fn new(handle: MethodHandle) -> Self {
        Self { handle }
    }

    #[inline]
    pub fn handle(&self) -> MethodHandle {
        self.handle
    }

    pub fn parameters(&self, cache: &SymbolCache) -> SymbolResult<Vec<Arc<Symbol>>> {
        let def = cache.universe().method(self.handle).ok_or_else(|| missing(self.handle))?;
        resolve_params(cache, self.handle, def.params.len())
    }

    /// Whether this is the type initializer (`.cctor`).
    pub fn is_type_initializer(&self, cache: &SymbolCache) -> bool {
        let universe = cache.universe();
        universe
            .method(self.handle)
            .is_some_and(|def| def.name == universe.well_known().cctor)
    }
}

// === Fields ===

pub struct FieldSymbol {
    handle: FieldHandle,
}

impl FieldSymbol {
    pub(super) fn new(handle: FieldHandle) -> Self {
        Self { handle }
    }

    #[inline]
    pub fn handle(&self) -> FieldHandle {
        self.handle
    }

    pub fn field_type(&self, cache: &SymbolCache) -> SymbolResult<Arc<Symbol>> {
        let def = cache.universe().field(self.handle).ok_or_else(|| missing(self.handle))?;
        cache.resolve_type(def.ty)
    }

    /// Value of a literal field.
    pub fn constant<'c>(&self, cache: &'c SymbolCache) -> Option<&'c Constant> {
        cache
            .universe()
            .field(self.handle)
            .and_then(|def| def.constant.as_ref())
    }
}

// === Properties ===

pub struct PropertySymbol {
    handle: PropertyHandle,
}

impl PropertySymbol {
    pub(super) fn new(handle: PropertyHandle) -> Self {
        Self { handle }
    }

    #[inline]
    pub fn handle(&self) -> PropertyHandle {
        self.handle
    }

    pub fn property_type(&self, cache: &SymbolCache) -> SymbolResult<Arc<Symbol>> {
        let def = cache.universe().property(self.handle).ok_or_else(|| missing(self.handle))?;
        cache.resolve_type(def.ty)
    }

    pub fn getter(&self, cache: &SymbolCache) -> SymbolResult<Option<Arc<Symbol>>> {
        let def = cache.universe().property(self.handle).ok_or_else(|| missing(self.handle))?;
        def.getter.map(|m| cache.resolve_method(m)).transpose()
    }

    pub fn setter(&self, cache: &SymbolCache) -> SymbolResult<Option<Arc<Symbol>>> {
        let def = cache.universe().property(self.handle).ok_or_else(|| missing(self.handle))?;
        def.setter.map(|m| cache.resolve_method(m)).transpose()
    }

    /// Index parameters: the getter's parameters, or the setter's without
    /// the trailing value parameter.
    pub fn index_parameters(&self, cache: &SymbolCache) -> SymbolResult<Vec<Arc<Symbol>>> {
        let universe = cache.universe();
        let def = universe.property(self.handle).ok_or_else(|| missing(self.handle))?;
        let count = universe.property_index_params(self.handle).len();
        match def.getter.filter(|&m| universe.method(m).is_some()).or(def.setter) {
            Some(accessor) => resolve_params(cache, accessor, count),
            None => Ok(Vec::new()),
        }
    }

    pub fn is_indexer(&self, cache: &SymbolCache) -> bool {
        !cache.universe().property_index_params(self.handle).is_empty()
    }

    pub fn is_init_only(&self, cache: &SymbolCache) -> bool {
        let universe = cache.universe();
        universe
            .property(self.handle)
            .and_then(|def| def.setter)
            .is_some_and(|setter| rules::is_init_only_setter(universe, setter))
    }
}

// === Events ===

pub struct EventSymbol {
    handle: EventHandle,
}

impl EventSymbol {
    pub(super) fn new(handle: EventHandle) -> Self {
        Self { handle }
    }

    #[inline]
    pub fn handle(&self) -> EventHandle {
        self.handle
    }

    pub fn handler_type(&self, cache: &SymbolCache) -> SymbolResult<Arc<Symbol>> {
        let def = cache.universe().event(self.handle).ok_or_else(|| missing(self.handle))?;
        cache.resolve_type(def.handler_type)
    }

    pub fn add_method(&self, cache: &SymbolCache) -> SymbolResult<Option<Arc<Symbol>>> {
        let def = cache.universe().event(self.handle).ok_or_else(|| missing(self.handle))?;
        def.add.map(|m| cache.resolve_method(m)).transpose()
    }

    pub fn remove_method(&self, cache: &SymbolCache) -> SymbolResult<Option<Arc<Symbol>>> {
        let def = cache.universe().event(self.handle).ok_or_else(|| missing(self.handle))?;
        def.remove.map(|m| cache.resolve_method(m)).transpose()
    }
}

// === Parameters ===

pub struct ParameterSymbol {
    handle: ParamHandle,
}

impl ParameterSymbol {
    pub(super) fn new(handle: ParamHandle) -> Self {
        Self { handle }
    }

    #[inline]
    pub fn handle(&self) -> ParamHandle {
        self.handle
    }

    #[inline]
    pub fn position(&self) -> u16 {
        self.handle.position
    }

    pub fn parameter_type(&self, cache: &SymbolCache) -> SymbolResult<Arc<Symbol>> {
        let def = cache.universe().param(self.handle).ok_or_else(|| missing(self.handle))?;
        cache.resolve_type(def.ty)
    }

    /// The method or constructor declaring the parameter.
    pub fn declaring_method(&self, cache: &SymbolCache) -> SymbolResult<Arc<Symbol>> {
        cache.resolve_method(self.handle.method)
    }

    /// Default value of an optional parameter.
    pub fn default_value<'c>(&self, cache: &'c SymbolCache) -> Option<&'c Constant> {
        cache
            .universe()
            .param(self.handle)
            .filter(|def| def.attributes.contains(ParamAttributes::HAS_DEFAULT))
            .and_then(|def| def.default.as_ref())
    }
}
