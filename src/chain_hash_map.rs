//! ChainHashMap: public surface, growth and the cursor protocol.

use crate::buckets::{Buckets, Lookup, Walk};
use crate::config::TableConfig;
use crate::cursor::{Cursor, Iter, TableId};
use crate::error::{Result, TableError};
use crate::iteration::IterationLock;
use crate::policy::{FnPolicy, KeyPolicy, StdPolicy};
use core::borrow::Borrow;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use log::{debug, trace, warn};

// Source of table identities. Never reused, unlike heap addresses.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

struct Inner<K, V, P> {
    id: TableId,
    buckets: Buckets<K, V>,
    load_threshold: f32,
    policy: P,
    lock: IterationLock,
}

/// A chained hash table.
///
/// Keys are compared and hashed by the policy `P`. Each table is issued a
/// fresh [`TableId`] when built; growth replaces the bucket storage
/// wholesale and leaves the id alone.
pub struct ChainHashMap<K, V, P = StdPolicy> {
    inner: Inner<K, V, P>,
}

impl<K, V> ChainHashMap<K, V> {
    /// Default sizing with the standard `Eq + Hash` policy.
    pub fn new() -> Result<Self> {
        Self::with_config(TableConfig::default())
    }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_policy(config, StdPolicy::default())
    }
}

impl<K, V, E, H> ChainHashMap<K, V, FnPolicy<E, H>>
where
    E: Fn(&K, &K) -> bool,
    H: Fn(&K, u32) -> u32,
{
    /// Use caller-supplied equality and `hash(key, bucket_count)` functions.
    pub fn with_fns(config: TableConfig, eq: E, hash: H) -> Result<Self> {
        Self::with_policy(config, FnPolicy::new(eq, hash))
    }
}

impl<K, V, P> ChainHashMap<K, V, P> {
    pub fn with_policy(config: TableConfig, policy: P) -> Result<Self> {
        let buckets = Buckets::with_bucket_count(config.bucket_count()?)?;
        Ok(Self {
            inner: Inner {
                id: TableId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
                buckets,
                load_threshold: config.effective_load_threshold(),
                policy,
                lock: IterationLock::new(),
            },
        })
    }

    pub fn id(&self) -> TableId {
        self.inner.id
    }

    pub fn len(&self) -> usize {
        self.inner.buckets.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.inner.buckets.len() == 0
    }

    pub fn bucket_count(&self) -> u32 {
        self.inner.buckets.bucket_count()
    }

    pub fn load_threshold(&self) -> f32 {
        self.inner.load_threshold
    }

    /// `len / bucket_count`.
    pub fn load_factor(&self) -> f64 {
        f64::from(self.inner.buckets.len()) / f64::from(self.bucket_count())
    }

    pub fn policy(&self) -> &P {
        &self.inner.policy
    }

    /// Number of iterations currently open. Mutation is refused while
    /// this is non-zero.
    pub fn open_cursors(&self) -> u32 {
        self.inner.lock.depth()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        P: KeyPolicy<Q>,
    {
        let inner = &self.inner;
        match inner.buckets.lookup(&inner.policy, key) {
            Lookup::Found(at) => inner.buckets.entry_at(at).map(|(_, v)| v),
            Lookup::Vacant(_) => None,
        }
    }

    /// In-place access to a stored value. Not a structural change, so it
    /// is allowed while cursors are open.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        P: KeyPolicy<Q>,
    {
        let inner = &mut self.inner;
        match inner.buckets.lookup(&inner.policy, key) {
            Lookup::Found(at) => inner.buckets.value_mut(at),
            Lookup::Vacant(_) => None,
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        P: KeyPolicy<Q>,
    {
        let inner = &self.inner;
        matches!(inner.buckets.lookup(&inner.policy, key), Lookup::Found(_))
    }

    /// Insert or update. Returns the previous value when `key` was
    /// already present; that path never grows the table.
    pub fn set(&mut self, key: K, value: V) -> Result<Option<V>>
    where
        P: KeyPolicy<K>,
    {
        self.ensure_unlocked("set")?;
        let inner = &mut self.inner;
        let index = match inner.buckets.lookup(&inner.policy, &key) {
            Lookup::Found(at) => {
                let old = inner.buckets.value_mut(at).map(|v| core::mem::replace(v, value));
                return Ok(old);
            }
            Lookup::Vacant(index) => index,
        };
        let index = if inner.exceeds_threshold() {
            inner.grow()?;
            inner.buckets.index_of(&inner.policy, &key)
        } else {
            index
        };
        inner.buckets.insert_vacant(index, key, value)?;
        Ok(None)
    }

    /// Remove `key`, returning its value. Removing an absent key succeeds
    /// and returns `None`.
    pub fn unset<Q>(&mut self, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        P: KeyPolicy<Q>,
    {
        self.ensure_unlocked("unset")?;
        let inner = &mut self.inner;
        match inner.buckets.lookup(&inner.policy, key) {
            Lookup::Found(at) => Ok(inner.buckets.remove(at).map(|(_, v)| v)),
            Lookup::Vacant(_) => Ok(None),
        }
    }

    /// Open an iteration. The table refuses `set`/`unset` until the
    /// returned cursor is passed to [`end`](Self::end).
    pub fn begin(&self) -> Cursor {
        self.inner.lock.open();
        Cursor::new(self.id())
    }

    /// Advance `cursor`, returning the next entry or `None` once every
    /// bucket has been visited.
    pub fn next<'a>(&'a self, cursor: &mut Cursor) -> Result<Option<(&'a K, &'a V)>> {
        if cursor.owner != self.id() {
            return Err(TableError::ForeignCursor);
        }
        Ok(cursor.walk.step(&self.inner.buckets))
    }

    /// Close `cursor` and release its hold on the iteration lock. A
    /// cursor opened on another table is handed back untouched.
    pub fn end(&self, mut cursor: Cursor) -> core::result::Result<(), Cursor> {
        if cursor.owner != self.id() {
            return Err(cursor);
        }
        cursor.open = false;
        self.inner.lock.close();
        Ok(())
    }

    /// Borrowed iteration in bucket order. The iterator holds the
    /// iteration lock while it is alive.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: &self.inner.buckets,
            walk: Walk::start(),
            remaining: self.len(),
            _guard: self.inner.lock.acquire(),
        }
    }

    fn ensure_unlocked(&self, op: &'static str) -> Result<()> {
        let open_cursors = self.inner.lock.depth();
        if open_cursors > 0 {
            trace!("{} refused: {} open cursor(s)", op, open_cursors);
            return Err(TableError::LockedMutation { open_cursors });
        }
        Ok(())
    }
}

impl<K, V, P> Inner<K, V, P> {
    fn exceeds_threshold(&self) -> bool {
        let projected =
            (f64::from(self.buckets.len()) + 1.0) / f64::from(self.buckets.bucket_count());
        projected > f64::from(self.load_threshold)
    }

    /// Replace the bucket storage with one sized for twice the current
    /// element count and move every entry across.
    fn grow(&mut self) -> Result<()>
    where
        P: KeyPolicy<K>,
    {
        let hint = self
            .buckets
            .len()
            .checked_mul(2)
            .ok_or(TableError::AllocationFailure);
        hint.and_then(|hint| self.rebuild(hint)).map_err(|e| {
            debug!("rehash of {} entries failed: {}", self.buckets.len(), e);
            e
        })
    }

    /// Move every entry into fresh storage sized for `size_hint`. Sizing
    /// and allocation happen before anything is moved, so on error the
    /// table is left as it was.
    fn rebuild(&mut self, size_hint: u32) -> Result<()>
    where
        P: KeyPolicy<K>,
    {
        let bucket_count = TableConfig::new(size_hint, self.load_threshold).bucket_count()?;
        let fresh = Buckets::with_bucket_count(bucket_count)?;
        let len = self.buckets.len();

        let old = core::mem::replace(&mut self.buckets, fresh);
        debug!(
            "rehash: {} -> {} buckets for {} entries",
            old.bucket_count(),
            self.buckets.bucket_count(),
            len
        );
        for (key, value) in old.into_entries() {
            let index = self.buckets.index_of(&self.policy, &key);
            self.buckets.splice_head(index, key, value);
        }
        Ok(())
    }
}

impl<K, V, P> Drop for ChainHashMap<K, V, P> {
    fn drop(&mut self) {
        let open = self.inner.lock.depth();
        if open > 0 {
            warn!("ChainHashMap dropped with {} open cursor(s)", open);
        }
    }
}

impl<'a, K, V, P> IntoIterator for &'a ChainHashMap<K, V, P> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, P> fmt::Debug for ChainHashMap<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
