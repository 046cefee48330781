#![cfg(test)]

// Property tests for Table kept inside the crate so they can inspect the
// slot array directly.

use crate::table::{Table, TableError};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, u32),
    Get(usize),
    Contains(String),
    Iterate,
    Cursor,
}

fn arb_value() -> impl Strategy<Value = u32> {
    // 0 is the empty sentinel and must be rejected.
    prop_oneof![1 => Just(0u32), 6 => any::<u32>()]
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), arb_value()).prop_map(|(i, v)| OpI::Set(i, v)),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Cursor),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `get` after `set` returns the last stored value; absent keys miss.
// - Setting the empty value fails and changes nothing.
// - `len` equals the number of distinct keys ever set successfully.
// - Capacity is a power of two and `len <= capacity / 2` after every op.
// - Iteration yields each entry exactly once, matching the model.
// - Key storage is never copied after the first insert.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: Table<u32> = Table::new();
        let mut model: HashMap<String, u32> = HashMap::new();
        let mut addrs: HashMap<String, *const u8> = HashMap::new();

        for op in ops {
            match op {
                OpI::Set(i, v) => {
                    let k = &pool[i];
                    match sut.set(k, v) {
                        Ok(key) => {
                            prop_assert!(v != 0, "empty value must be rejected");
                            prop_assert_eq!(key.as_bytes(), k.as_bytes());
                            let addr = key.as_ptr();
                            let first = *addrs.entry(k.clone()).or_insert(addr);
                            prop_assert_eq!(first, addr, "key storage must not move on update");
                            model.insert(k.clone(), v);
                        }
                        Err(TableError::EmptyValue) => prop_assert_eq!(v, 0),
                        Err(e) => prop_assert!(false, "unexpected error: {}", e),
                    }
                }
                OpI::Get(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(k), model.get(k).copied());
                }
                OpI::Contains(s) => {
                    prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
                }
                OpI::Iterate => {
                    let seen: Vec<(String, u32)> = sut
                        .iter()
                        .map(|(k, v)| (k.to_str().unwrap().to_string(), v))
                        .collect();
                    prop_assert_eq!(seen.len(), model.len());
                    let seen: BTreeMap<_, _> = seen.into_iter().collect();
                    let expected: BTreeMap<_, _> =
                        model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    prop_assert_eq!(seen, expected);
                }
                OpI::Cursor => {
                    let mut c = sut.cursor();
                    let mut n = 0;
                    while c.advance() {
                        let k = c.key().unwrap().to_str().unwrap();
                        prop_assert_eq!(c.value(), model.get(k).copied());
                        n += 1;
                    }
                    prop_assert_eq!(n, model.len());
                    prop_assert!(!c.advance());
                }
            }

            // Post-conditions after each op
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            prop_assert!(sut.capacity().is_power_of_two());
            prop_assert!(sut.len() <= sut.capacity() / 2);
            let occupied = sut.slots().iter().filter(|s| s.is_some()).count();
            prop_assert_eq!(occupied, sut.len());
        }

        // Final sweep: every key still lives at its first-insert address.
        for (k, addr) in &addrs {
            let (key, _) = sut.iter().find(|(key, _)| key.as_bytes() == k.as_bytes()).unwrap();
            prop_assert_eq!(key.as_ptr(), *addr);
        }
    }
}
