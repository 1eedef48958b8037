#![no_main]

use flatbst::ds::{Handle, SlotArena};
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on SlotArena
//
// Uses u8 handles (63 addressable slots, 2 generation bits) so that slot
// exhaustion and generation wrap-around are both reachable.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut arena: SlotArena<u32, u8> = SlotArena::new();
    let mut all_ids: Vec<Handle<u8>> = Vec::new();

    let mut idx = 0;
    while idx + 1 < data.len() {
        let op = data[idx] % 8;
        let value = u32::from(data[idx + 1]);

        match op {
            0 => {
                // insert
                match arena.insert(value) {
                    Ok(id) => {
                        all_ids.push(id);
                        assert_eq!(arena.get(id), Some(&value));
                        assert!(arena.contains(id));
                    },
                    Err(_) => {
                        assert_eq!(arena.holes(), 0);
                        assert_eq!(arena.slot_count(), 63);
                    },
                }
            },
            1 => {
                // remove
                if !all_ids.is_empty() {
                    let id = all_ids[(value as usize) % all_ids.len()];
                    let old_len = arena.len();
                    if arena.remove(id).is_some() {
                        assert_eq!(arena.len(), old_len - 1);
                        assert!(!arena.contains(id));
                        assert_eq!(arena.get(id), None);
                    }
                }
            },
            2 => {
                // strict lookup agrees with the lenient one
                if !all_ids.is_empty() {
                    let id = all_ids[(value as usize) % all_ids.len()];
                    assert_eq!(arena.try_get(id).ok(), arena.get(id));
                }
            },
            3 => {
                // get_mut
                if !all_ids.is_empty() {
                    let id = all_ids[(value as usize) % all_ids.len()];
                    if let Some(val) = arena.get_mut(id) {
                        *val = value;
                        assert_eq!(arena.get(id), Some(&value));
                    }
                }
            },
            4 => {
                // NONE never resolves
                assert!(!arena.contains(Handle::NONE));
                assert_eq!(arena.get(Handle::NONE), None);
            },
            5 => {
                assert_eq!(arena.len() + arena.holes(), arena.slot_count());
            },
            6 => {
                // iter
                assert_eq!(arena.iter().count(), arena.len());
                for (id, v) in arena.iter() {
                    assert_eq!(arena.get(id), Some(v));
                }
            },
            7 => {
                // clear
                let before = all_ids.clone();
                arena.clear();
                all_ids.clear();

                assert!(arena.is_empty());
                assert_eq!(arena.iter().count(), 0);
                for id in before {
                    assert!(!arena.contains(id));
                }
            },
            _ => unreachable!(),
        }

        assert!(arena.check_invariants().is_ok());
        idx += 2;
    }
});
