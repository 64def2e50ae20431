// ChainHashMap integration tests.
//
// Each test names the behavior it verifies. Core invariants exercised:
// - Last write wins: get(k) returns the value of the latest set(k, v).
// - Size: len() counts keys set and not since unset; absent unset is a no-op.
// - Growth: inserts never fail for load reasons and keep every entry and
//   the table identity.
// - Policies: std hashing, caller functions and address identity all run
//   the same algorithm.
use chain_hashmap::{
    ChainHashMap, IdentityPolicy, TableConfig, TableError, DEFAULT_LOAD_THRESHOLD,
};

// Test: overwrite and delete on a default-sized table.
// Verifies: size after overwrite, overwritten value, not-found after unset.
#[test_log::test]
fn overwrite_and_delete() {
    let mut m = ChainHashMap::new().unwrap();
    m.set('A', 1).unwrap();
    m.set('B', 2).unwrap();
    m.set('A', 3).unwrap();
    assert_eq!(m.len(), 2);
    assert_eq!(m.get(&'A'), Some(&3));
    assert_eq!(m.get(&'B'), Some(&2));

    m.unset(&'B').unwrap();
    assert_eq!(m.len(), 1);
    assert_eq!(m.get(&'B'), None);
}

// Test: one hundred distinct keys into a table sized for four.
// Verifies: every key retrievable, len == 100, identity unchanged, bucket count grew.
#[test_log::test]
fn hundred_keys_from_small_hint() {
    let mut m = ChainHashMap::with_config(TableConfig::new(4, 0.0)).unwrap();
    let id = m.id();
    let initial_buckets = m.bucket_count();
    for k in 0..100u32 {
        m.set(format!("key-{}", k), k).unwrap();
    }
    assert_eq!(m.len(), 100);
    for k in 0..100u32 {
        assert_eq!(m.get(format!("key-{}", k).as_str()), Some(&k));
    }
    assert!(m.bucket_count() > initial_buckets);
    assert_eq!(m.id(), id);
    assert_eq!(m.load_threshold(), DEFAULT_LOAD_THRESHOLD);
}

// Test: len tracks set/unset precisely, including repeated and absent unsets.
#[test]
fn len_tracks_live_keys() {
    let mut m = ChainHashMap::new().unwrap();
    assert!(m.is_empty());
    for k in 0..10 {
        m.set(k, k).unwrap();
    }
    assert_eq!(m.len(), 10);
    assert_eq!(m.unset(&3), Ok(Some(3)));
    assert_eq!(m.len(), 9);
    assert_eq!(m.unset(&3), Ok(None));
    assert_eq!(m.len(), 9);
    assert_eq!(m.unset(&42), Ok(None));
    assert_eq!(m.len(), 9);
    m.set(3, 30).unwrap();
    assert_eq!(m.len(), 10);
    for k in 0..10 {
        m.unset(&k).unwrap();
    }
    assert!(m.is_empty());
    assert_eq!(m.iter().count(), 0);
}

// Test: updating an existing key never grows the table.
#[test]
fn update_does_not_grow() {
    let mut m = ChainHashMap::with_config(TableConfig::new(3, 1.0)).unwrap();
    for k in 0..4 {
        m.set(k, 0).unwrap();
    }
    let buckets = m.bucket_count();
    assert_eq!(buckets, 4);
    for round in 1..50 {
        for k in 0..4 {
            assert_eq!(m.set(k, round), Ok(Some(round - 1)));
        }
    }
    assert_eq!(m.bucket_count(), buckets);
}

// Test: growth sizes the new storage from twice the element count.
#[test]
fn growth_uses_double_element_count() {
    let mut m = ChainHashMap::with_config(TableConfig::new(1, 1.0)).unwrap();
    assert_eq!(m.bucket_count(), 2);
    m.set(1u8, ()).unwrap();
    m.set(2u8, ()).unwrap();
    // Third key: (2 + 1) / 2 > 1.0, so rebuild for hint 4 -> 5 buckets.
    m.set(3u8, ()).unwrap();
    assert_eq!(m.bucket_count(), 5);
    assert_eq!(m.len(), 3);
}

// Test: caller-supplied functions with a hash that ignores the bucket count.
#[test]
fn caller_functions_are_reduced_modulo_buckets() {
    let mut m = ChainHashMap::with_fns(
        TableConfig::default(),
        |a: &u64, b: &u64| a == b,
        |k: &u64, _buckets: u32| (*k as u32).wrapping_mul(2_654_435_761),
    )
    .unwrap();
    for k in 0..500u64 {
        m.set(k, k * k).unwrap();
    }
    for k in 0..500u64 {
        assert_eq!(m.get(&k), Some(&(k * k)));
    }
}

// Test: case-insensitive keys through a custom equality.
#[test]
fn custom_equality_merges_keys() {
    let mut m = ChainHashMap::with_fns(
        TableConfig::default(),
        |a: &String, b: &String| a.eq_ignore_ascii_case(b),
        |k: &String, n: u32| {
            k.bytes()
                .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b.to_ascii_lowercase())))
                % n
        },
    )
    .unwrap();
    m.set("Hello".to_string(), 1).unwrap();
    assert_eq!(m.set("HELLO".to_string(), 2), Ok(Some(1)));
    assert_eq!(m.len(), 1);
    assert_eq!(m.get(&"hello".to_string()), Some(&2));
}

// Test: identity keys over raw pointers; distinct allocations with equal content are distinct keys.
#[test]
fn identity_keys_by_address() {
    let items: Vec<Box<u32>> = (0..64).map(|_| Box::new(7)).collect();
    let mut m = ChainHashMap::with_policy(TableConfig::new(2, 0.0), IdentityPolicy).unwrap();
    for (i, b) in items.iter().enumerate() {
        let p: *const u32 = &**b;
        m.set(p, i).unwrap();
    }
    assert_eq!(m.len(), 64);
    for (i, b) in items.iter().enumerate() {
        let p: *const u32 = &**b;
        assert_eq!(m.get(&p), Some(&i));
    }
    let other = Box::new(7u32);
    let q: *const u32 = &*other;
    assert_eq!(m.get(&q), None);
}

// Test: degenerate configurations are rejected at construction.
#[test]
fn degenerate_configuration_rejected() {
    let r = ChainHashMap::<u8, u8>::with_config(TableConfig::new(u32::MAX, 1.0));
    assert!(matches!(r, Err(TableError::InvalidConfiguration(_))));
    let r = ChainHashMap::<u8, u8>::with_config(TableConfig::new(0, f32::NAN));
    assert!(matches!(r, Err(TableError::InvalidConfiguration(_))));
}

// Test: error messages are human readable.
#[test]
fn error_display() {
    assert_eq!(
        TableError::LockedMutation { open_cursors: 2 }.to_string(),
        "table is locked by 2 open cursor(s)"
    );
    assert_eq!(TableError::AllocationFailure.to_string(), "allocation failed");
    assert_eq!(
        TableError::ForeignCursor.to_string(),
        "cursor belongs to a different table"
    );
}
