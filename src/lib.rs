//! chain-hashmap: a single-threaded hash table with separate chaining,
//! an iteration lock, and growth that never invalidates the table handle.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one generic table algorithm parameterized over key and value
//!   types plus a key policy supplying equality and bucket hashing.
//! - Layers:
//!   - Buckets<K, V>: slot array (one embedded chain head per bucket) and
//!     an arena of overflow entries linked by generational keys.
//!   - IterationLock: depth counter of open iterations; structural
//!     mutation is refused while it is non-zero.
//!   - ChainHashMap<K, V, P>: public API. Carries a process-unique id so
//!     cursors stay bound to the table that opened them.
//!
//! Chains
//! - Bucket `i` is addressed by `policy.bucket_of(key, n) % n`. Its head
//!   is the slot itself; collisions are spliced in directly behind the
//!   head, so the head never moves and the newest collision is second.
//! - Removing a head only vacates it. Its `next` link survives, keeping
//!   the rest of the chain reachable. Refilling a vacated head keeps that
//!   link too, so no live overflow entry is ever orphaned.
//! - Overflow entries are freed as soon as they are unlinked.
//!
//! Growth
//! - Before inserting a new key, if `(len + 1) / bucket_count` would
//!   exceed the load threshold, storage is rebuilt with the bucket count
//!   a fresh table of size hint `2 * len` would get, and every entry is
//!   moved across. Reserving the new slot array is the only fallible
//!   step and precedes any move, so a failed growth leaves the table
//!   untouched. Tables never shrink.
//!
//! Iteration
//! - `begin` opens a detached `Cursor` (no borrow held) and bumps the
//!   lock; `next` walks buckets in ascending order and each chain from
//!   its head; `end` closes the cursor. Several cursors may be open at
//!   once. `set`/`unset` return `TableError::LockedMutation` until all
//!   are closed.
//! - `iter()` is the borrowed form; it holds the lock for its lifetime.
//!
//! Notes and non-goals
//! - Single-threaded: no internal synchronization; the table is `!Sync`.
//! - No ordering of keys, no shrinking, no persistence or serialization.
//! - A missing key is never an error.

mod buckets;
mod chain_hash_map;
mod chain_hash_map_proptest;
pub mod config;
mod cursor;
pub mod error;
mod iteration;
pub mod policy;

// Public surface
pub use chain_hash_map::ChainHashMap;
pub use config::{TableConfig, DEFAULT_LOAD_THRESHOLD, DEFAULT_SIZE_HINT};
pub use cursor::{Cursor, Iter, TableId};
pub use error::{Result, TableError};
pub use policy::{FnPolicy, IdentityPolicy, KeyPolicy, StdPolicy};
