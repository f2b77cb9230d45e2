// Persistent Red-Black tree unit tests

use std::collections::BTreeMap;

use proptest::prelude::*;

use oned::core::rbtree::RBTree;

#[derive(Debug, Clone)]
enum Op {
    Insert(u64, u32),
    Delete(u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u64..64, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        (0u64..64).prop_map(Op::Delete),
    ]
}

fn entries(tree: &RBTree<u32>) -> Vec<(u64, u32)> {
    tree.iter().map(|(k, v)| (k, *v)).collect()
}

proptest! {
    #[test]
    fn prop_valid_after_every_op(ops in prop::collection::vec(op(), 1..200)) {
        let mut tree = RBTree::new();
        let mut oracle = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    let (next, inserted) = tree.insert(k, v);
                    prop_assert_eq!(inserted, oracle.insert(k, v).is_none());
                    prop_assert_eq!(next.get(k), Some(&v));
                    tree = next;
                }
                Op::Delete(k) => {
                    let (next, removed) = tree.delete(k);
                    prop_assert_eq!(removed, oracle.remove(&k).is_some());
                    prop_assert_eq!(next.get(k), None);
                    tree = next;
                }
            }
            prop_assert!(tree.is_valid());
            prop_assert_eq!(tree.len(), oracle.len());
        }

        let expected: Vec<(u64, u32)> = oracle.into_iter().collect();
        prop_assert_eq!(entries(&tree), expected);
    }

    #[test]
    fn prop_old_versions_unchanged(
        base in prop::collection::vec(0u64..256, 1..100),
        later in prop::collection::vec(op(), 1..100),
    ) {
        let tree = base.iter().fold(RBTree::new(), |t, &k| t.insert(k, k as u32).0);
        let snapshot = entries(&tree);

        let mut current = tree.clone();
        for op in later {
            current = match op {
                Op::Insert(k, v) => current.insert(k, v).0,
                Op::Delete(k) => current.delete(k).0,
            };
        }

        prop_assert_eq!(entries(&tree), snapshot);
        prop_assert!(tree.is_valid());
    }

    #[test]
    fn prop_floor_matches_btreemap(
        keys in prop::collection::btree_set(0u64..1000, 0..100),
        probe in 0u64..1100,
    ) {
        let tree = keys.iter().fold(RBTree::new(), |t, &k| t.insert(k, k).0);
        let expected = keys.range(..=probe).next_back().copied();
        prop_assert_eq!(tree.floor(probe).map(|(k, _)| k), expected);
    }

    #[test]
    fn prop_shift_keeps_order_and_shape(
        keys in prop::collection::btree_set(0u64..1000, 1..100),
        pivot in 0u64..1000,
        delta in 0i64..500,
    ) {
        let tree = keys.iter().fold(RBTree::new(), |t, &k| t.insert(k, k).0);
        let shifted = tree.shift_from(pivot, delta);

        prop_assert!(shifted.is_valid());
        prop_assert_eq!(shifted.len(), tree.len());
        for (k, v) in shifted.iter() {
            let expected = if *v >= pivot { *v + delta as u64 } else { *v };
            prop_assert_eq!(k, expected);
        }
    }
}

#[test]
fn test_get_on_empty() {
    let tree: RBTree<String> = RBTree::new();
    assert!(tree.is_empty());
    assert!(tree.is_valid());
    assert_eq!(tree.get(0), None);
    assert_eq!(tree.floor(10), None);
}

#[test]
fn test_versions_share_until_changed() {
    let (v1, _) = RBTree::new().insert(1, "a");
    let v2 = v1.clone();
    assert!(RBTree::same_version(&v1, &v2));

    let (v3, _) = v2.insert(2, "b");
    assert!(!RBTree::same_version(&v1, &v3));
    assert_eq!(v1.len(), 1);
    assert_eq!(v3.len(), 2);
}

#[test]
fn test_versions_readable_across_threads() {
    let tree = (0..1000u64).fold(RBTree::new(), |t, k| t.insert(k, k * 2).0);
    let handles: Vec<_> = (0..4u64)
        .map(|worker| {
            let tree = tree.clone();
            std::thread::spawn(move || {
                let tree = (0..100u64).fold(tree, |t, k| t.delete(k * 4 + worker).0);
                assert!(tree.is_valid());
                tree.len()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 900);
    }
    assert_eq!(tree.len(), 1000);
    assert_eq!(tree.get(4), Some(&8));
}

#[test]
fn test_large_sequential_delete() {
    let mut tree = (0..2000u64).fold(RBTree::new(), |t, k| t.insert(k, ()).0);
    for k in (0..2000u64).step_by(3) {
        tree = tree.delete(k).0;
    }
    assert!(tree.is_valid());
    assert_eq!(tree.len(), 2000 - 667);
    assert_eq!(tree.range_from(1995).map(|(k, _)| k).collect::<Vec<_>>(), vec![1996, 1997, 1999]);
}
