//! The symbol cache.
//!
//! Maps [`SymbolKey`] identities to shared [`Symbol`] descriptors, creating
//! each descriptor at most once. Storage is sharded by the key's
//! precomputed hash; each shard is an `RwLock<FxHashMap>` with a read fast
//! path and a double-checked insert under the write lock, so concurrent
//! resolutions of one identity agree on a single `Arc`.
//!
//! Descriptors are never evicted; the cache lives as long as its universe.

mod extensions;

use std::sync::Arc;

use mirror_meta::{
    strip_arity, EventHandle, FieldAttributes, FieldHandle, GenericOwner, MethodHandle,
    ParamHandle, PropertyHandle, TypeDefinition, TypeHandle, TypeShape, Universe,
};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::key::{ArgSignature, NativeHandle, SymbolKey};
use crate::memo::{CacheStats, Counters};
use crate::{Symbol, SymbolError, SymbolResult};

pub use extensions::ExtensionScope;
use extensions::ExtensionIndex;

const NUM_SHARDS: usize = 16;

type Shard = RwLock<FxHashMap<SymbolKey, Arc<Symbol>>>;

/// Shared identity-to-descriptor map over one universe.
pub struct SymbolCache {
    universe: Arc<Universe>,
    shards: [Shard; NUM_SHARDS],
    counters: Counters,
    scope: ExtensionScope,
    extensions: OnceCell<ExtensionIndex>,
}

impl SymbolCache {
    /// A cache over `universe`, scanning every loaded type for awaiter
    /// extensions.
    pub fn new(universe: impl Into<Arc<Universe>>) -> Self {
        Self::with_extension_scope(universe, ExtensionScope::AllLoadedTypes)
    }

    /// A cache whose awaitability rule only considers `GetAwaiter`
    /// extensions declared in `scope`.
    pub fn with_extension_scope(universe: impl Into<Arc<Universe>>, scope: ExtensionScope) -> Self {
        Self {
            universe: universe.into(),
            shards: std::array::from_fn(|_| RwLock::new(FxHashMap::default())),
            counters: Counters::default(),
            scope,
            extensions: OnceCell::new(),
        }
    }

    #[inline]
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    #[inline]
    pub(crate) fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn extension_scope(&self) -> &ExtensionScope {
        &self.scope
    }

    /// Number of descriptors held.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.len())
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "modulo NUM_SHARDS (16) always fits in usize"
    )]
    #[inline]
    fn shard(&self, key: &SymbolKey) -> &Shard {
        &self.shards[(key.hash_value() % NUM_SHARDS as u64) as usize]
    }

    // === Resolution ===

    /// The descriptor for `key`, creating it on first use.
    ///
    /// A key whose handle the universe did not issue, or whose other fields
    /// disagree with the handle's canonical identity, is `SymbolNotFound`.
    pub fn resolve(&self, key: &SymbolKey) -> SymbolResult<Arc<Symbol>> {
        let shard = self.shard(key);
        if let Some(symbol) = shard.read().get(key) {
            self.counters.hit();
            return Ok(Arc::clone(symbol));
        }
        self.insert_slow(shard, key)
    }

    #[tracing::instrument(level = "trace", skip_all, fields(handle = ?key.handle()))]
    fn insert_slow(&self, shard: &Shard, key: &SymbolKey) -> SymbolResult<Arc<Symbol>> {
        let canonical = self.identity_of(key.handle())?;
        if canonical != *key {
            return Err(SymbolError::not_found(format!(
                "{key:?} does not match the identity of {:?}",
                key.handle()
            )));
        }

        let mut guard = shard.write();
        if let Some(symbol) = guard.get(key) {
            self.counters.hit();
            return Ok(Arc::clone(symbol));
        }
        self.counters.miss();
        let symbol = Arc::new(Symbol::new(canonical));
        guard.insert(key.clone(), Arc::clone(&symbol));
        tracing::trace!("created descriptor");
        Ok(symbol)
    }

    /// The canonical identity of a native handle.
    ///
    /// A method handle naming a constructor yields a constructor identity.
    pub fn identity_of(&self, handle: NativeHandle) -> SymbolResult<SymbolKey> {
        let universe = self.universe();
        let not_found = || SymbolError::not_found(format!("{handle:?}"));
        let key = match handle {
            NativeHandle::Type(ty) => {
                let row = universe.ty(ty).ok_or_else(not_found)?;
                let (declaring, args): (Option<TypeHandle>, ArgSignature) = match &row.shape {
                    TypeShape::Definition(def) => (def.declaring_type, ArgSignature::new()),
                    TypeShape::Instance(instance) => (
                        universe
                            .definition(instance.definition)
                            .and_then(|def| def.declaring_type),
                        instance.args.iter().copied().collect(),
                    ),
                    TypeShape::Array { element, .. }
                    | TypeShape::ByRef(element)
                    | TypeShape::Pointer(element) => (None, ArgSignature::from_slice(&[*element])),
                    TypeShape::GenericParam(param) => match param.owner {
                        GenericOwner::Type(owner) => (Some(owner), ArgSignature::new()),
                        GenericOwner::Method(owner) => (
                            universe.method(owner).map(|def| def.declaring_type),
                            ArgSignature::new(),
                        ),
                    },
                };
                SymbolKey::new(row.name, declaring, handle, args)
            }
            NativeHandle::Method(method) | NativeHandle::Constructor(method) => {
                let def = universe.method(method).ok_or_else(not_found)?;
                let is_constructor = universe.is_constructor(method);
                if matches!(handle, NativeHandle::Constructor(_)) && !is_constructor {
                    return Err(not_found());
                }
                let mut args: ArgSignature = def.params.iter().map(|p| p.ty).collect();
                if let Some(instance) = &def.instantiation {
                    args.extend(instance.args.iter().copied());
                }
                let handle = if is_constructor {
                    NativeHandle::Constructor(method)
                } else {
                    NativeHandle::Method(method)
                };
                SymbolKey::new(def.name, Some(def.declaring_type), handle, args)
            }
            NativeHandle::Field(field) => {
                let def = universe.field(field).ok_or_else(not_found)?;
                SymbolKey::new(def.name, Some(def.declaring_type), handle, ArgSignature::new())
            }
            NativeHandle::Property(property) => {
                let def = universe.property(property).ok_or_else(not_found)?;
                let args = universe
                    .property_index_params(property)
                    .iter()
                    .map(|p| p.ty)
                    .collect();
                SymbolKey::new(def.name, Some(def.declaring_type), handle, args)
            }
            NativeHandle::Event(event) => {
                let def = universe.event(event).ok_or_else(not_found)?;
                SymbolKey::new(def.name, Some(def.declaring_type), handle, ArgSignature::new())
            }
            NativeHandle::Parameter(param) => {
                let def = universe.param(param).ok_or_else(not_found)?;
                let declaring = universe.method(param.method).map(|m| m.declaring_type);
                SymbolKey::new(def.name, declaring, handle, ArgSignature::from_slice(&[def.ty]))
            }
        };
        Ok(key)
    }

    /// Resolve a native handle through its canonical identity.
    pub fn resolve_handle(&self, handle: NativeHandle) -> SymbolResult<Arc<Symbol>> {
        let key = self.identity_of(handle)?;
        self.resolve(&key)
    }

    pub fn resolve_type(&self, ty: TypeHandle) -> SymbolResult<Arc<Symbol>> {
        self.resolve_handle(NativeHandle::Type(ty))
    }

    /// Resolve a method; constructors come back as constructor symbols.
    pub fn resolve_method(&self, method: MethodHandle) -> SymbolResult<Arc<Symbol>> {
        self.resolve_handle(NativeHandle::Method(method))
    }

    pub fn resolve_field(&self, field: FieldHandle) -> SymbolResult<Arc<Symbol>> {
        self.resolve_handle(NativeHandle::Field(field))
    }

    pub fn resolve_property(&self, property: PropertyHandle) -> SymbolResult<Arc<Symbol>> {
        self.resolve_handle(NativeHandle::Property(property))
    }

    pub fn resolve_event(&self, event: EventHandle) -> SymbolResult<Arc<Symbol>> {
        self.resolve_handle(NativeHandle::Event(event))
    }

    pub fn resolve_parameter(&self, param: ParamHandle) -> SymbolResult<Arc<Symbol>> {
        self.resolve_handle(NativeHandle::Parameter(param))
    }

    // === Lookup ===

    /// A declared type by full metadata name (`System.String`,
    /// `Acme.Outer+Inner`, `Acme.Box`1`).
    pub fn find_type(&self, full_name: &str) -> SymbolResult<Arc<Symbol>> {
        let ty = self
            .universe
            .find_type(full_name)
            .ok_or_else(|| SymbolError::not_found(format!("type `{full_name}`")))?;
        self.resolve_type(ty)
    }

    /// The first member named `name`, searching nested types, fields,
    /// constructors, properties, events, then methods.
    ///
    /// Nested types match with or without their arity suffix.
    pub fn member(&self, ty: &Symbol, name: &str) -> SymbolResult<Arc<Symbol>> {
        self.member_handles(ty)?
            .into_iter()
            .find(|&handle| self.handle_named(handle, name))
            .map_or_else(
                || Err(self.member_not_found(ty, name)),
                |handle| self.resolve_handle(handle),
            )
    }

    /// Every method overload named `name`, in declaration order.
    pub fn methods_named(&self, ty: &Symbol, name: &str) -> SymbolResult<Vec<Arc<Symbol>>> {
        let def = self.definition_of(ty)?;
        let methods: Vec<_> = def
            .methods
            .iter()
            .filter(|&&m| self.handle_named(NativeHandle::Method(m), name))
            .map(|&m| self.resolve_method(m))
            .collect::<SymbolResult<_>>()?;
        if methods.is_empty() {
            return Err(self.member_not_found(ty, name));
        }
        Ok(methods)
    }

    /// User-visible members in declaration order.
    ///
    /// Accessors behind properties and events, and the `value__` field of
    /// enums, are omitted.
    pub fn members(&self, ty: &Symbol) -> SymbolResult<Vec<Arc<Symbol>>> {
        self.member_handles(ty)?
            .into_iter()
            .map(|handle| self.resolve_handle(handle))
            .collect()
    }

    fn member_handles(&self, ty: &Symbol) -> SymbolResult<Vec<NativeHandle>> {
        let universe = self.universe();
        let def = self.definition_of(ty)?;
        let accessors: FxHashSet<MethodHandle> = def
            .properties
            .iter()
            .filter_map(|&p| universe.property(p))
            .flat_map(|p| [p.getter, p.setter])
            .chain(
                def.events
                    .iter()
                    .filter_map(|&e| universe.event(e))
                    .flat_map(|e| [e.add, e.remove, e.raise]),
            )
            .flatten()
            .collect();

        let constructors = def.methods.iter().filter(|&&m| universe.is_constructor(m));
        let methods = def
            .methods
            .iter()
            .filter(|&&m| !universe.is_constructor(m) && !accessors.contains(&m));
        let fields = def.fields.iter().filter(|&&f| {
            universe
                .field(f)
                .is_some_and(|f| !f.attributes.contains(FieldAttributes::RT_SPECIAL_NAME))
        });

        let mut handles = Vec::new();
        handles.extend(def.nested_types.iter().map(|&t| NativeHandle::Type(t)));
        handles.extend(fields.map(|&f| NativeHandle::Field(f)));
        handles.extend(constructors.map(|&m| NativeHandle::Constructor(m)));
        handles.extend(def.properties.iter().map(|&p| NativeHandle::Property(p)));
        handles.extend(def.events.iter().map(|&e| NativeHandle::Event(e)));
        handles.extend(methods.map(|&m| NativeHandle::Method(m)));
        Ok(handles)
    }

    fn definition_of(&self, ty: &Symbol) -> SymbolResult<&TypeDefinition> {
        let handle = ty.as_type()?.handle();
        self.universe
            .underlying_definition(handle)
            .ok_or_else(|| SymbolError::unsupported("constructed type", "members"))
    }

    fn handle_named(&self, handle: NativeHandle, name: &str) -> bool {
        self.identity_of(handle).is_ok_and(|key| {
            let actual = self.universe.str(key.name());
            actual == name || (matches!(handle, NativeHandle::Type(_)) && strip_arity(actual) == name)
        })
    }

    fn member_not_found(&self, ty: &Symbol, name: &str) -> SymbolError {
        let owner = match ty.as_type() {
            Ok(ty) => self.universe.full_name(ty.handle()),
            Err(_) => String::from("?"),
        };
        SymbolError::not_found(format!("member `{name}` of `{owner}`"))
    }

    /// The generic definition of an instantiated type or method; any other
    /// symbol unchanged.
    pub fn generic_definition(&self, symbol: &Arc<Symbol>) -> SymbolResult<Arc<Symbol>> {
        match symbol.handle() {
            NativeHandle::Type(ty) => {
                let definition = self.universe.generic_definition(ty);
                if definition == ty {
                    Ok(Arc::clone(symbol))
                } else {
                    self.resolve_type(definition)
                }
            }
            NativeHandle::Method(method) => match self
                .universe
                .method(method)
                .and_then(|def| def.instantiation.as_ref())
            {
                Some(instance) => self.resolve_method(instance.definition),
                None => Ok(Arc::clone(symbol)),
            },
            _ => Ok(Arc::clone(symbol)),
        }
    }

    // === Awaitability ===

    fn extension_index(&self) -> &ExtensionIndex {
        self.extensions
            .get_or_init(|| ExtensionIndex::build(&self.universe, &self.scope))
    }

    /// Number of `GetAwaiter` extensions in scope; builds the index.
    pub fn awaiter_extension_count(&self) -> usize {
        self.extension_index().len()
    }

    pub(crate) fn type_is_awaitable(&self, ty: TypeHandle) -> bool {
        extensions::is_awaitable(&self.universe, self.extension_index(), ty)
    }
}

impl std::fmt::Debug for SymbolCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolCache")
            .field("universe", &self.universe)
            .field("symbols", &self.len())
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
