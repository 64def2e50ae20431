//! Bucket storage: the slot array plus an arena of overflow entries.
//!
//! Each bucket is a chain whose head is the slot itself. Collisions live
//! in `overflow`, linked by generational `NodeKey`s instead of pointers.
//! A head is never removed, only vacated, so its `next` link keeps the
//! rest of the chain reachable.

use crate::error::{Result, TableError};
use crate::policy::KeyPolicy;
use core::borrow::Borrow;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub(crate) struct NodeKey;
}

/// A place in some chain: a bucket head or an overflow entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Position {
    Head(u32),
    Node(NodeKey),
}

/// Result of a chain walk.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Lookup {
    Found(Position),
    /// Not present; new entries for this key go to this bucket's head.
    Vacant(u32),
}

#[derive(Debug)]
struct Slot<K, V> {
    entry: Option<(K, V)>,
    next: Option<NodeKey>,
}

impl<K, V> Slot<K, V> {
    fn vacant() -> Self {
        Self {
            entry: None,
            next: None,
        }
    }
}

#[derive(Debug)]
struct Overflow<K, V> {
    key: K,
    value: V,
    prev: Position,
    next: Option<NodeKey>,
}

#[derive(Debug)]
pub(crate) struct Buckets<K, V> {
    slots: Vec<Slot<K, V>>,
    overflow: SlotMap<NodeKey, Overflow<K, V>>,
    len: u32,
}

impl<K, V> Buckets<K, V> {
    /// All slots start vacant. Fails if the slot array cannot be reserved.
    pub(crate) fn with_bucket_count(bucket_count: u32) -> Result<Self> {
        if bucket_count == 0 {
            return Err(TableError::InvalidConfiguration("bucket count is zero"));
        }
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(bucket_count as usize)
            .map_err(|_| TableError::AllocationFailure)?;
        slots.resize_with(bucket_count as usize, Slot::vacant);
        Ok(Self {
            slots,
            overflow: SlotMap::with_key(),
            len: 0,
        })
    }

    #[inline]
    pub(crate) fn len(&self) -> u32 {
        self.len
    }

    #[inline]
    pub(crate) fn bucket_count(&self) -> u32 {
        self.slots.len() as u32
    }

    pub(crate) fn index_of<Q, P>(&self, policy: &P, key: &Q) -> u32
    where
        Q: ?Sized,
        P: KeyPolicy<Q>,
    {
        let n = self.bucket_count();
        policy.bucket_of(key, n) % n
    }

    /// Walk the bucket's chain from its head looking for a filled entry
    /// whose key matches.
    pub(crate) fn lookup<Q, P>(&self, policy: &P, key: &Q) -> Lookup
    where
        K: Borrow<Q>,
        Q: ?Sized,
        P: KeyPolicy<Q>,
    {
        let index = self.index_of(policy, key);
        let mut at = Position::Head(index);
        loop {
            if let Some((k, _)) = self.entry_at(at) {
                if policy.key_eq(k.borrow(), key) {
                    return Lookup::Found(at);
                }
            }
            match self.next_of(at) {
                Some(n) => at = Position::Node(n),
                None => return Lookup::Vacant(index),
            }
        }
    }

    /// The filled entry at `at`, if any.
    #[inline]
    pub(crate) fn entry_at(&self, at: Position) -> Option<(&K, &V)> {
        match at {
            Position::Head(i) => self
                .slots
                .get(i as usize)
                .and_then(|s| s.entry.as_ref())
                .map(|(k, v)| (k, v)),
            Position::Node(n) => self.overflow.get(n).map(|o| (&o.key, &o.value)),
        }
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, at: Position) -> Option<&mut V> {
        match at {
            Position::Head(i) => self
                .slots
                .get_mut(i as usize)
                .and_then(|s| s.entry.as_mut())
                .map(|(_, v)| v),
            Position::Node(n) => self.overflow.get_mut(n).map(|o| &mut o.value),
        }
    }

    #[inline]
    pub(crate) fn next_of(&self, at: Position) -> Option<NodeKey> {
        match at {
            Position::Head(i) => self.slots.get(i as usize).and_then(|s| s.next),
            Position::Node(n) => self.overflow.get(n).and_then(|o| o.next),
        }
    }

    fn set_next(&mut self, at: Position, next: Option<NodeKey>) {
        match at {
            Position::Head(i) => {
                if let Some(s) = self.slots.get_mut(i as usize) {
                    s.next = next;
                }
            }
            Position::Node(n) => {
                if let Some(o) = self.overflow.get_mut(n) {
                    o.next = next;
                }
            }
        }
    }

    /// Insert a key known to be absent at the head of bucket `index`.
    /// Fails only when the element count would overflow.
    pub(crate) fn insert_vacant(&mut self, index: u32, key: K, value: V) -> Result<Position> {
        if self.len == u32::MAX {
            return Err(TableError::AllocationFailure);
        }
        Ok(self.splice_head(index, key, value))
    }

    /// Place an absent key at bucket `index`. A filled head gets the new
    /// entry spliced in directly behind it; a vacant head is filled in
    /// place and keeps its `next` link.
    ///
    /// The caller guarantees `index < bucket_count` and `len < u32::MAX`.
    pub(crate) fn splice_head(&mut self, index: u32, key: K, value: V) -> Position {
        let head = &mut self.slots[index as usize];
        let at = if head.entry.is_none() {
            head.entry = Some((key, value));
            Position::Head(index)
        } else {
            let next = head.next;
            let node = self.overflow.insert(Overflow {
                key,
                value,
                prev: Position::Head(index),
                next,
            });
            self.slots[index as usize].next = Some(node);
            if let Some(after) = next.and_then(|n| self.overflow.get_mut(n)) {
                after.prev = Position::Node(node);
            }
            Position::Node(node)
        };
        self.len += 1;
        at
    }

    /// Remove the entry at `at`. Overflow entries are unlinked and freed;
    /// a head is only vacated.
    pub(crate) fn remove(&mut self, at: Position) -> Option<(K, V)> {
        let removed = match at {
            Position::Head(i) => self.slots.get_mut(i as usize)?.entry.take()?,
            Position::Node(n) => {
                let node = self.overflow.remove(n)?;
                self.set_next(node.prev, node.next);
                if let Some(after) = node.next.and_then(|k| self.overflow.get_mut(k)) {
                    after.prev = node.prev;
                }
                (node.key, node.value)
            }
        };
        self.len -= 1;
        Some(removed)
    }

    /// Consume the storage, yielding every live entry.
    pub(crate) fn into_entries(self) -> impl Iterator<Item = (K, V)> {
        self.slots
            .into_iter()
            .filter_map(|s| s.entry)
            .chain(self.overflow.into_iter().map(|(_, o)| (o.key, o.value)))
    }
}

/// Iteration state: a bucket index and the chain position to visit next.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Walk {
    index: u32,
    at: Position,
}

impl Walk {
    pub(crate) const fn start() -> Self {
        Self {
            index: 0,
            at: Position::Head(0),
        }
    }

    /// Advance to the next filled entry, visiting buckets in ascending
    /// order and each chain from its head.
    pub(crate) fn step<'a, K, V>(&mut self, buckets: &'a Buckets<K, V>) -> Option<(&'a K, &'a V)> {
        while self.index < buckets.bucket_count() {
            let current = self.at;
            self.at = match buckets.next_of(current) {
                Some(n) => Position::Node(n),
                None => {
                    self.index += 1;
                    Position::Head(self.index)
                }
            };
            if let Some(kv) = buckets.entry_at(current) {
                return Some(kv);
            }
        }
        None
    }
}
