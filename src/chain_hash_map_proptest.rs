#![cfg(test)]

// Property tests for ChainHashMap kept inside the crate so they can
// check internal counters alongside the public surface.

use crate::chain_hash_map::ChainHashMap;
use crate::config::TableConfig;
use crate::error::TableError;
use crate::policy::{KeyPolicy, StdPolicy};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::Hasher;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    Unset(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
    LockedSweep(usize, i32),
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (u32, Vec<String>, Vec<OpI>)> {
    let hint = 0u32..6;
    let pool = proptest::collection::vec("[a-z]{0,5}", 1..=24);
    (hint, pool).prop_flat_map(|(hint, pool)| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            2 => idx.clone().prop_map(OpI::Unset),
            1 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::LockedSweep(i, v)),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (hint, pool.clone(), ops))
    })
}

// State-machine equivalence against std::collections::HashMap:
// - `set` returns the replaced value; `unset` returns the removed value or None.
// - `get`/`contains_key` parity, including borrowed `&str` lookup.
// - in-place mutation through `get_mut` is observed by later reads.
// - iteration yields each live entry exactly once.
// - while a cursor is open, `set`/`unset` fail and leave the table unchanged.
// - `len`/`is_empty` parity and load factor within threshold after each op.
fn run_state_machine<P>(
    mut sut: ChainHashMap<Key, i32, P>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    P: KeyPolicy<Key> + KeyPolicy<str>,
{
    let mut model: HashMap<Key, i32> = HashMap::new();
    let id = sut.id();

    for op in ops {
        match op {
            OpI::Set(i, v) => {
                let k = key_from(pool, i);
                let prev = sut.set(k.clone(), v);
                prop_assert_eq!(prev, Ok(model.insert(k, v)));
            }
            OpI::Unset(i) => {
                let k = key_from(pool, i);
                let removed = sut.unset(&k);
                prop_assert_eq!(removed, Ok(model.remove(&k)));
                prop_assert!(sut.get(&k).is_none());
            }
            OpI::Get(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                match (sut.get_mut(&k), model.get_mut(&k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.saturating_add(d);
                        *mv = mv.saturating_add(d);
                    }
                    (None, None) => {}
                    (s, m) => prop_assert!(false, "presence mismatch: {:?} vs {:?}", s, m),
                }
            }
            OpI::Iterate => {
                let seen: Vec<(Key, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let unique: BTreeMap<Key, i32> = seen.iter().cloned().collect();
                prop_assert_eq!(seen.len(), unique.len(), "an entry was yielded twice");
                let expected: BTreeMap<Key, i32> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(unique, expected);
            }
            OpI::LockedSweep(i, v) => {
                let k = key_from(pool, i);
                let mut c = sut.begin();
                let before = sut.len();
                let locked = Err(TableError::LockedMutation { open_cursors: 1 });
                prop_assert_eq!(sut.set(k.clone(), v), locked);
                prop_assert_eq!(sut.unset(&k), locked);
                prop_assert_eq!(sut.len(), before);
                let mut keys = BTreeSet::new();
                while let Some((ck, _)) = sut
                    .next(&mut c)
                    .map_err(|e| TestCaseError::fail(e.to_string()))?
                {
                    prop_assert!(keys.insert(ck.clone()));
                }
                prop_assert!(sut.end(c).is_ok());
                let m_keys: BTreeSet<Key> = model.keys().cloned().collect();
                prop_assert_eq!(keys, m_keys);
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(sut.open_cursors(), 0);
        prop_assert!(sut.load_factor() <= f64::from(sut.load_threshold()));
        prop_assert_eq!(sut.id(), id);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((hint, pool, ops) in arb_scenario()) {
        let sut: ChainHashMap<Key, i32> =
            ChainHashMap::with_config(TableConfig::new(hint, 0.0)).unwrap();
        run_state_machine(sut, &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl std::hash::BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Same invariants with every key in bucket 0, so every operation walks,
// splices and vacates within one long chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((hint, pool, ops) in arb_scenario()) {
        let sut: ChainHashMap<Key, i32, StdPolicy<ConstBuildHasher>> = ChainHashMap::with_policy(
            TableConfig::new(hint, 0.5),
            StdPolicy::with_hasher(ConstBuildHasher),
        )
        .unwrap();
        run_state_machine(sut, &pool, ops)?;
    }
}
