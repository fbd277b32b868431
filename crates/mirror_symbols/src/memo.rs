//! Compute-once cells for derived symbol attributes.
//!
//! Every derived attribute of a descriptor lives in a [`Memo`]. The first
//! reader runs the derivation; concurrent readers block on it and later
//! readers get the stored value. Each derivation bumps the cache-wide
//! derivation counter, which is how tests observe that a second read did no
//! work.

use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::OnceCell;

use crate::SymbolResult;

/// A memoized, possibly failed, derivation.
pub struct Memo<T> {
    cell: OnceCell<SymbolResult<T>>,
}

impl<T> Memo<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Return the stored result, deriving it first if this is the first
    /// read.
    pub fn get_or_derive(
        &self,
        counters: &Counters,
        derive: impl FnOnce() -> SymbolResult<T>,
    ) -> SymbolResult<&T> {
        self.cell
            .get_or_init(|| {
                counters.derivations.fetch_add(1, Ordering::Relaxed);
                derive()
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Whether the derivation has run.
    pub fn is_derived(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Live cache counters.
#[derive(Default)]
pub struct Counters {
    pub(crate) hits: AtomicU64,
    pub(crate) misses: AtomicU64,
    pub(crate) derivations: AtomicU64,
}

impl Counters {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, symbols: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            derivations: self.derivations.load(Ordering::Relaxed),
            symbols,
        }
    }
}

/// Point-in-time cache statistics.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Resolutions answered from the cache.
    pub hits: u64,
    /// Resolutions that validated an identity and built a descriptor.
    pub misses: u64,
    /// Derived attributes computed (memo cells filled).
    pub derivations: u64,
    /// Descriptors held.
    pub symbols: usize,
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests {
    use super::*;
    use crate::SymbolError;

    #[test]
    fn derives_once() {
        let counters = Counters::default();
        let memo = Memo::new();
        let mut calls = 0;

        assert_eq!(
            memo.get_or_derive(&counters, || {
                calls += 1;
                Ok(41 + 1)
            }),
            Ok(&42)
        );
        assert_eq!(memo.get_or_derive(&counters, || Ok(0)), Ok(&42));
        assert_eq!(calls, 1);
        assert!(memo.is_derived());
        assert_eq!(counters.snapshot(0).derivations, 1);
    }

    #[test]
    fn errors_are_memoized() {
        let counters = Counters::default();
        let memo: Memo<u8> = Memo::new();
        let err = SymbolError::unsupported("parameter", "access modifier");

        assert_eq!(
            memo.get_or_derive(&counters, || Err(err.clone())),
            Err(err.clone())
        );
        assert_eq!(memo.get_or_derive(&counters, || Ok(1)), Err(err));
        assert_eq!(counters.snapshot(0).derivations, 1);
    }
}
