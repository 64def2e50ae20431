// ChainHashMap property tests.
//
// Property 1: growth transparency.
//  - Insert N distinct keys into a table built with a small hint and a
//    random threshold.
//  - Invariant: no insert fails, len() == N, every key maps to its value,
//    identity is unchanged, load factor never exceeds the threshold.
//
// Property 2: iteration completeness.
//  - Build a table from random set/unset operations.
//  - Invariant: a cursor walk and iter() both yield exactly the live pairs,
//    each once; bucket order means the same walk twice gives the same order.
use chain_hashmap::{ChainHashMap, TableConfig};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

proptest! {
    #[test]
    fn prop_growth_keeps_entries(
        keys in proptest::collection::btree_set(any::<u64>(), 0..400),
        hint in 0u32..8,
        threshold in 0.1f32..=1.0,
    ) {
        let mut m = ChainHashMap::with_config(TableConfig::new(hint, threshold)).unwrap();
        let id = m.id();
        for &k in &keys {
            prop_assert_eq!(m.set(k, !k), Ok(None));
            prop_assert!(m.load_factor() <= f64::from(m.load_threshold()));
        }
        prop_assert_eq!(m.len(), keys.len());
        prop_assert_eq!(m.id(), id);
        for &k in &keys {
            prop_assert_eq!(m.get(&k), Some(&!k));
        }
    }
}

proptest! {
    #[test]
    fn prop_iteration_yields_live_pairs_once(
        ops in proptest::collection::vec((any::<bool>(), 0u16..64, any::<u32>()), 0..200)
    ) {
        let mut m = ChainHashMap::with_config(TableConfig::new(1, 0.0)).unwrap();
        let mut model = BTreeMap::new();
        for (insert, k, v) in ops {
            if insert {
                m.set(k, v).unwrap();
                model.insert(k, v);
            } else {
                m.unset(&k).unwrap();
                model.remove(&k);
            }
        }

        let mut c = m.begin();
        let mut walked = Vec::new();
        while let Some((k, v)) = m.next(&mut c).unwrap() {
            walked.push((*k, *v));
        }
        prop_assert!(m.end(c).is_ok());

        let unique: BTreeSet<u16> = walked.iter().map(|(k, _)| *k).collect();
        prop_assert_eq!(unique.len(), walked.len());
        let as_map: BTreeMap<u16, u32> = walked.iter().copied().collect();
        prop_assert_eq!(&as_map, &model);

        let borrowed: Vec<(u16, u32)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(borrowed, walked);
    }
}
