#![no_main]

use std::collections::BTreeSet;

use flatbst::FlatBst;
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on FlatBst against a BTreeSet model
//
// Covers insert, erase, take, bounds, rebalance, bulk rebuild and clear.
// Structural invariants are re-checked after every step.
fuzz_target!(|data: &[u8]| {
    let mut tree: FlatBst<u8> = FlatBst::new();
    let mut model = BTreeSet::new();

    for pair in data.chunks_exact(2) {
        let key = pair[1];

        match pair[0] % 9 {
            0 | 1 => {
                let (handle, inserted) = tree.insert(key);
                assert_eq!(inserted, model.insert(key));
                assert_eq!(tree.get(handle), Some(&key));
            },
            2 => {
                assert_eq!(tree.erase(&key), model.remove(&key));
            },
            3 => {
                assert_eq!(tree.take(&key), model.take(&key));
            },
            4 => {
                let lb = tree.get(tree.lower_bound(&key)).copied();
                assert_eq!(lb, model.range(key..).next().copied());
                let ub = tree.get(tree.upper_bound(&key)).copied();
                let expected = key.checked_add(1).and_then(|k| model.range(k..).next().copied());
                assert_eq!(ub, expected);
            },
            5 => {
                let h = tree.find_handle(&key);
                assert_eq!(h.is_some(), model.contains(&key));
                assert_eq!(tree.find(&key), model.get(&key));
            },
            6 => {
                let stale = tree.find_handle(&key);
                tree.rebalance();
                if model.len() > 1 {
                    assert!(!tree.contains_handle(stale));
                }
                assert_eq!(tree.holes(), 0);
            },
            7 => {
                let mut input = model.iter().rev().copied().collect::<Vec<_>>();
                input.push(key);
                model.insert(key);
                tree.build_from_iter(input);
            },
            8 => {
                tree.clear();
                model.clear();
            },
            _ => unreachable!(),
        }

        assert_eq!(tree.len(), model.len());
        assert_eq!(tree.first(), model.first());
        assert_eq!(tree.last(), model.last());
        assert!(tree.check_invariants().is_ok());
    }

    assert!(tree.iter().eq(model.iter()));
});
