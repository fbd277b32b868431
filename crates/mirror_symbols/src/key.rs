//! Symbol identity.
//!
//! A [`SymbolKey`] addresses one symbol in the cache:
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `name` | Metadata name of the symbol |
//! | `declaring` | Enclosing type, if any |
//! | `handle` | Kind-tagged native handle |
//! | `args` | Argument signature disambiguating overloads and indexers |
//!
//! The hash over all four fields is computed once at construction; `Hash`
//! writes the cached value and `Eq` compares it before the fields.

use std::fmt;
use std::hash::{Hash, Hasher};

use mirror_meta::{
    EventHandle, FieldHandle, MethodHandle, Name, ParamHandle, PropertyHandle, TypeHandle,
};
use rustc_hash::FxHasher;
use smallvec::SmallVec;

/// Argument signature storage; most members take four or fewer.
pub type ArgSignature = SmallVec<[TypeHandle; 4]>;

/// A native handle tagged with the kind of symbol it denotes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NativeHandle {
    Type(TypeHandle),
    Method(MethodHandle),
    Constructor(MethodHandle),
    Field(FieldHandle),
    Property(PropertyHandle),
    Event(EventHandle),
    Parameter(ParamHandle),
}

impl NativeHandle {
    /// Kind name used in messages.
    pub fn kind_name(self) -> &'static str {
        match self {
            NativeHandle::Type(_) => "type",
            NativeHandle::Method(_) => "method",
            NativeHandle::Constructor(_) => "constructor",
            NativeHandle::Field(_) => "field",
            NativeHandle::Property(_) => "property",
            NativeHandle::Event(_) => "event",
            NativeHandle::Parameter(_) => "parameter",
        }
    }
}

/// Identity of a symbol.
#[derive(Clone)]
pub struct SymbolKey {
    name: Name,
    declaring: Option<TypeHandle>,
    handle: NativeHandle,
    args: ArgSignature,
    hash: u64,
}

impl SymbolKey {
    /// Build a key, precomputing its hash.
    pub fn new(
        name: Name,
        declaring: Option<TypeHandle>,
        handle: NativeHandle,
        args: ArgSignature,
    ) -> Self {
        let mut hasher = FxHasher::default();
        name.hash(&mut hasher);
        declaring.hash(&mut hasher);
        handle.hash(&mut hasher);
        args.hash(&mut hasher);
        Self {
            name,
            declaring,
            handle,
            args,
            hash: hasher.finish(),
        }
    }

    #[inline]
    pub fn name(&self) -> Name {
        self.name
    }

    #[inline]
    pub fn declaring(&self) -> Option<TypeHandle> {
        self.declaring
    }

    #[inline]
    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    #[inline]
    pub fn args(&self) -> &[TypeHandle] {
        &self.args
    }

    /// The precomputed hash; also selects the cache shard.
    #[inline]
    pub fn hash_value(&self) -> u64 {
        self.hash
    }
}

impl PartialEq for SymbolKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.handle == other.handle
            && self.name == other.name
            && self.declaring == other.declaring
            && self.args == other.args
    }
}

impl Eq for SymbolKey {}

impl Hash for SymbolKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Debug for SymbolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolKey")
            .field("name", &self.name)
            .field("declaring", &self.declaring)
            .field("handle", &self.handle)
            .field("args", &self.args.as_slice())
            .finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
