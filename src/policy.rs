//! Key equality and bucket hashing capabilities.
//!
//! A `ChainHashMap` never calls `Eq`/`Hash` directly; it asks its policy.
//! This keeps one table algorithm usable for ordinary `Eq + Hash` keys,
//! for caller-supplied functions, and for identity-keyed tables.

use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Equality and hashing over keys (or borrowed forms of keys) of type `Q`.
///
/// `bucket_of` may return any value; the table reduces it modulo the
/// bucket count. Keys that compare equal must map to the same bucket.
pub trait KeyPolicy<Q: ?Sized> {
    fn key_eq(&self, a: &Q, b: &Q) -> bool;
    fn bucket_of(&self, key: &Q, bucket_count: u32) -> u32;
}

/// `Eq` + `Hash` through a `BuildHasher`. Supports borrowed lookup in the
/// same way `std::collections::HashMap` does.
#[derive(Clone, Debug, Default)]
pub struct StdPolicy<S = DefaultHashBuilder> {
    hasher: S,
}

impl<S> StdPolicy<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }
}

impl<Q, S> KeyPolicy<Q> for StdPolicy<S>
where
    Q: ?Sized + Eq + Hash,
    S: BuildHasher,
{
    #[inline]
    fn key_eq(&self, a: &Q, b: &Q) -> bool {
        a == b
    }

    #[inline]
    fn bucket_of(&self, key: &Q, bucket_count: u32) -> u32 {
        (self.hasher.hash_one(key) % u64::from(bucket_count.max(1))) as u32
    }
}

/// Caller-supplied equality and hash functions.
///
/// `hash` receives the current bucket count, matching the
/// `hash(key, bucket_count) -> u32` contract.
#[derive(Clone, Copy, Debug)]
pub struct FnPolicy<E, H> {
    eq: E,
    hash: H,
}

impl<E, H> FnPolicy<E, H> {
    pub fn new(eq: E, hash: H) -> Self {
        Self { eq, hash }
    }
}

impl<K, E, H> KeyPolicy<K> for FnPolicy<E, H>
where
    E: Fn(&K, &K) -> bool,
    H: Fn(&K, u32) -> u32,
{
    #[inline]
    fn key_eq(&self, a: &K, b: &K) -> bool {
        (self.eq)(a, b)
    }

    #[inline]
    fn bucket_of(&self, key: &K, bucket_count: u32) -> u32 {
        (self.hash)(key, bucket_count)
    }
}

/// Address identity: two keys are equal iff they point at the same
/// place, and the bucket is the address modulo the bucket count.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityPolicy;

#[inline]
fn address<T: ?Sized>(p: *const T) -> usize {
    p.cast::<()>() as usize
}

impl<T: ?Sized> KeyPolicy<*const T> for IdentityPolicy {
    #[inline]
    fn key_eq(&self, a: &*const T, b: &*const T) -> bool {
        address(*a) == address(*b)
    }

    #[inline]
    fn bucket_of(&self, key: &*const T, bucket_count: u32) -> u32 {
        (address(*key) % bucket_count.max(1) as usize) as u32
    }
}

impl<'a, T: ?Sized> KeyPolicy<&'a T> for IdentityPolicy {
    #[inline]
    fn key_eq(&self, a: &&'a T, b: &&'a T) -> bool {
        address::<T>(*a) == address::<T>(*b)
    }

    #[inline]
    fn bucket_of(&self, key: &&'a T, bucket_count: u32) -> u32 {
        (address::<T>(*key) % bucket_count.max(1) as usize) as u32
    }
}
