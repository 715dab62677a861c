use avl_collections::avl_tree::{AvlMap, AvlSet};
use rand::Rng;
use simplelog::{Config, LevelFilter, TestLogger};
use std::collections::BTreeMap;

const NUM_OF_OPERATIONS: usize = 20_000;
const CHECK_INTERVAL: usize = 997;

fn init_logger() {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
}

fn seeded_rng() -> rand::XorShiftRng {
    rand::SeedableRng::from_seed([1, 1, 1, 1])
}

// 1.4405 * log2(n + 2) - 0.3277 bounds the height of any avl tree with n nodes
fn max_avl_height(len: usize) -> i32 {
    (1.4405 * ((len + 2) as f64).log2() - 0.3277).floor() as i32
}

#[test]
fn int_test_random_operations() {
    init_logger();
    let mut rng = seeded_rng();
    let mut map = AvlMap::new();
    let mut expected = BTreeMap::new();

    for i in 0..NUM_OF_OPERATIONS {
        let key = rng.gen_range(0, 4096u32);
        if rng.gen::<bool>() {
            let val = rng.next_u32();
            let inserted = !expected.contains_key(&key);
            if inserted {
                expected.insert(key, val);
            }
            assert_eq!(map.insert(key, val), inserted);
        } else {
            assert_eq!(map.remove(&key), expected.remove(&key).is_some());
        }

        assert_eq!(map.size(), expected.len());
        assert_eq!(map.find(&key), expected.get(&key));
        if i % CHECK_INTERVAL == 0 {
            map.check_invariants();
            assert!(map.height() <= max_avl_height(map.size()));
        }
    }

    map.check_invariants();
    assert_eq!(
        map.iter().collect::<Vec<(&u32, &u32)>>(),
        expected.iter().collect::<Vec<(&u32, &u32)>>(),
    );
    assert_eq!(map.min(), expected.keys().next());
    assert_eq!(map.max(), expected.keys().next_back());
}

#[test]
fn int_test_insert_then_remove_everything() {
    init_logger();
    let mut rng = seeded_rng();
    let mut map = AvlMap::with_chunk_size(64);
    let mut keys = Vec::new();

    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.next_u32();
        if map.insert(key, key.wrapping_mul(3)) {
            keys.push(key);
        }
    }
    assert_eq!(map.size(), keys.len());
    map.check_invariants();

    for key in &keys {
        assert_eq!(map.find(key), Some(&key.wrapping_mul(3)));
    }

    rng.shuffle(&mut keys);
    let total = keys.len();
    for (removed, key) in keys.iter().enumerate() {
        assert_eq!(map.remove_entry(key), Some((*key, key.wrapping_mul(3))));
        assert_eq!(map.size(), total - removed - 1);
        if removed % CHECK_INTERVAL == 0 {
            map.check_invariants();
        }
    }

    assert!(map.is_empty());
    assert_eq!(map.height(), -1);
    assert_eq!(map.preorder().next(), None);
    map.check_invariants();
}

#[test]
fn int_test_sorted_inserts_stay_balanced() {
    let mut map = AvlMap::new();
    for key in 0..1023u32 {
        assert!(map.insert(key, ()));
    }
    // ascending runs of 2^k - 1 keys build a perfect tree
    assert_eq!(map.height(), 9);
    map.check_invariants();

    let mut map = AvlMap::new();
    for key in (0..5000u32).rev() {
        assert!(map.insert(key, ()));
    }
    assert!(map.height() <= max_avl_height(5000));
    map.check_invariants();
}

#[test]
fn int_test_remove_absent_is_structural_noop() {
    let mut rng = seeded_rng();
    let mut map = AvlMap::new();
    for _ in 0..1000 {
        let key = rng.gen_range(0, 10_000u32) * 2;
        map.insert(key, key);
    }

    let before: Vec<(u32, u32)> = map.preorder().map(|(k, v)| (*k, *v)).collect();
    let height = map.height();
    for odd in (1..20_000u32).step_by(2).take(500) {
        assert!(!map.remove(&odd));
    }
    let after: Vec<(u32, u32)> = map.preorder().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(before, after);
    assert_eq!(map.height(), height);
}

#[test]
fn int_test_size_after_inserts_and_removes() {
    let mut map = AvlMap::new();
    for key in 0..500u32 {
        assert!(map.insert(key, key));
    }
    for key in (0..500u32).filter(|key| key % 5 == 0) {
        assert!(map.remove(&key));
    }
    assert_eq!(map.size(), 500 - 100);
    map.check_invariants();
}

#[test]
fn int_test_duplicate_rejection() {
    let mut rng = seeded_rng();
    let mut map = AvlMap::new();
    let mut expected = BTreeMap::new();
    for _ in 0..2000 {
        let key = rng.gen_range(0, 256u32);
        let val = rng.next_u32();
        let fresh = !expected.contains_key(&key);
        expected.entry(key).or_insert(val);
        assert_eq!(map.insert(key, val), fresh);
    }
    for (key, val) in &expected {
        assert_eq!(map.find(key), Some(val));
    }
}

#[test]
fn int_test_set_matches_btreemap_keys() {
    let mut rng = seeded_rng();
    let mut set = AvlSet::new();
    let mut expected = BTreeMap::new();

    for _ in 0..NUM_OF_OPERATIONS / 4 {
        let key = rng.gen_range(0, 1024u32);
        if rng.gen::<bool>() {
            assert_eq!(set.insert(key), expected.insert(key, ()).is_none());
        } else {
            assert_eq!(set.remove(&key), expected.remove(&key).is_some());
        }
    }

    assert_eq!(set.len(), expected.len());
    assert_eq!(
        set.into_iter().collect::<Vec<u32>>(),
        expected.keys().cloned().collect::<Vec<u32>>(),
    );
}
