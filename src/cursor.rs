//! Cursors and borrowed iterators.

use crate::buckets::{Buckets, Walk};
use crate::iteration::IterationGuard;
use core::iter::FusedIterator;

/// Identity of a table, issued once when the table is built and never
/// handed to another table. Growth and moving the map value keep it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TableId(pub(crate) u64);

/// An open iteration over a [`ChainHashMap`](crate::ChainHashMap),
/// created by `begin` and advanced by `next`.
///
/// A cursor holds the table's iteration lock until it is passed to
/// `end`. It carries no borrow, so the table stays usable for lookups
/// and in-place value updates meanwhile, but `set`/`unset` fail.
/// Dropping a cursor without ending it panics.
#[derive(Debug)]
#[must_use = "a cursor holds the iteration lock until passed to `end`"]
pub struct Cursor {
    pub(crate) owner: TableId,
    pub(crate) walk: Walk,
    pub(crate) open: bool,
}

impl Cursor {
    pub(crate) fn new(owner: TableId) -> Self {
        Self {
            owner,
            walk: Walk::start(),
            open: true,
        }
    }

    /// The table this cursor was opened on.
    pub fn owner(&self) -> TableId {
        self.owner
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        // Fail fast on misuse, but never turn an unwind into an abort.
        if self.open && !std::thread::panicking() {
            panic!("Cursor dropped without ChainHashMap::end");
        }
    }
}

/// Borrowed iterator over the entries of a `ChainHashMap`, in bucket
/// order. Holds the iteration lock while alive.
pub struct Iter<'a, K, V> {
    pub(crate) buckets: &'a Buckets<K, V>,
    pub(crate) walk: Walk,
    pub(crate) remaining: usize,
    pub(crate) _guard: IterationGuard<'a>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let kv = self.walk.step(self.buckets)?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(kv)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
