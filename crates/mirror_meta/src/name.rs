//! Interned metadata names.
//!
//! Every identifier in a universe (type names, namespaces, member and
//! parameter names) is stored once in a [`StringTable`] and referenced by a
//! 32-bit [`Name`]. The table is filled while the universe is built and is
//! frozen afterwards, so lookups hand out plain `&str` borrows.

use std::fmt;

use rustc_hash::FxHashMap;

/// Interned string identifier.
///
/// Only meaningful for the [`StringTable`] that produced it.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Whether this is the pre-interned empty string.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Append-only string table.
///
/// Single-writer while the universe is under construction; read-only once
/// the universe is frozen.
#[derive(Clone)]
pub struct StringTable {
    map: FxHashMap<Box<str>, Name>,
    strings: Vec<Box<str>>,
}

impl StringTable {
    /// Create a table holding only the empty string.
    pub fn new() -> Self {
        let mut table = Self {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(512),
        };
        table.strings.push(Box::from(""));
        table.map.insert(Box::from(""), Name::EMPTY);
        table
    }

    /// Intern a string, returning its existing `Name` when already present.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` strings are interned.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&name) = self.map.get(s) {
            return name;
        }
        let raw = u32::try_from(self.strings.len())
            .unwrap_or_else(|_| panic!("string table exceeded u32::MAX entries"));
        let name = Name(raw);
        self.strings.push(Box::from(s));
        self.map.insert(Box::from(s), name);
        name
    }

    /// Find the `Name` of an already interned string without inserting.
    #[inline]
    pub fn get(&self, s: &str) -> Option<Name> {
        self.map.get(s).copied()
    }

    /// Look up the string for a `Name`.
    ///
    /// Names from another table resolve to the empty string rather than
    /// panicking; the caller validated the handle that carried the name.
    #[inline]
    pub fn lookup(&self, name: Name) -> &str {
        self.strings
            .get(name.0 as usize)
            .map_or("", |s| &**s)
    }

    /// Number of interned strings, including the empty string.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether only the empty string is present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringTable")
            .field("len", &self.strings.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
