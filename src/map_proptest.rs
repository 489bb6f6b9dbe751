#![cfg(test)]

// Property tests for Map and Set, kept inside the crate next to the unit
// tests they extend.

use crate::config::TableOptions;
use crate::error::Error;
use crate::map::Map;
use crate::set::Set;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

// Pool-indexed operations so shrinking moves towards earlier keys.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Delete(usize),
    Query(usize),
    HasKey(usize),
    Keys,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-cA-C]{0,3}", 1..=8).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            idx.clone().prop_map(Op::Delete),
            idx.clone().prop_map(Op::Query),
            idx.clone().prop_map(Op::HasKey),
            Just(Op::Keys),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

#[derive(Clone, Copy, Debug)]
enum Flavor {
    Default,
    ConstantHash,
    TwoBuckets,
    CaseFolded,
}

fn options(flavor: Flavor) -> TableOptions<String> {
    match flavor {
        Flavor::Default => TableOptions::new(),
        Flavor::ConstantHash => TableOptions::new().with_hash_fn(|_| "k".to_string()),
        Flavor::TwoBuckets => {
            TableOptions::new().with_hash_fn(|k: &String| (k.len() % 2).to_string())
        }
        Flavor::CaseFolded => TableOptions::new().with_normalize_fn(|k: &String| k.to_lowercase()),
    }
}

fn model_key(flavor: Flavor, k: &str) -> String {
    match flavor {
        Flavor::CaseFolded => k.to_lowercase(),
        _ => k.to_string(),
    }
}

fn arb_flavor() -> impl Strategy<Value = Flavor> {
    prop_oneof![
        Just(Flavor::Default),
        Just(Flavor::ConstantHash),
        Just(Flavor::TwoBuckets),
        Just(Flavor::CaseFolded),
    ]
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences and hash flavors:
// - Round-trip: after insert(k, v), query(k) == v and has_key(k).
// - Overwrite keeps len; delete is idempotent.
// - Distinct keys sharing a digest never merge.
// - Key and value stores hold the same slot count at every step.
// - keys() follows first-insertion order of the logical key.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_map_matches_model(flavor in arb_flavor(), (pool, ops) in arb_scenario()) {
        let mut sut: Map<String, i32> = Map::with_options(options(flavor));
        let mut model: HashMap<String, i32> = HashMap::new();
        let mut order: Vec<String> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(i, v) => {
                    let mk = model_key(flavor, &pool[i]);
                    let prev = sut.insert(pool[i].clone(), v);
                    prop_assert_eq!(prev, model.insert(mk.clone(), v));
                    if !order.contains(&mk) {
                        order.push(mk);
                    }
                }
                Op::Delete(i) => {
                    let mk = model_key(flavor, &pool[i]);
                    prop_assert_eq!(sut.delete(&pool[i]), model.remove(&mk));
                    order.retain(|k| k != &mk);
                    prop_assert!(!sut.has_key(&pool[i]));
                }
                Op::Query(i) => {
                    let mk = model_key(flavor, &pool[i]);
                    match (sut.query(&pool[i]), model.get(&mk)) {
                        (Ok(Some(got)), Some(want)) => prop_assert_eq!(got, want),
                        (Err(Error::MissingKey { .. }), None) => {}
                        (got, want) => prop_assert!(false, "query mismatch: {:?} vs {:?}", got, want),
                    }
                }
                Op::HasKey(i) => {
                    let mk = model_key(flavor, &pool[i]);
                    prop_assert_eq!(sut.has_key(&pool[i]), model.contains_key(&mk));
                }
                Op::Keys => {
                    let keys: Vec<String> = sut.keys().map(|k| model_key(flavor, k)).collect();
                    prop_assert_eq!(&keys, &order);
                    let values: Vec<i32> = sut.values().copied().collect();
                    let expected: Vec<i32> = order.iter().map(|k| model[k]).collect();
                    prop_assert_eq!(values, expected);
                }
            }
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.iter().count(), model.len());
        }
    }
}

// Property: set membership tracks a HashSet model under a degenerate hash.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_set_matches_model(ops in proptest::collection::vec((any::<bool>(), 0u16..40), 1..120)) {
        let opts = TableOptions::with_functions(|k: &u16| (k % 3).to_string(), |a: &u16, b: &u16| a == b);
        let mut sut = Set::with_options(opts);
        let mut model: HashSet<u16> = HashSet::new();
        for (add, k) in ops {
            if add {
                prop_assert_eq!(sut.insert(k), model.insert(k));
            } else {
                prop_assert_eq!(sut.delete(&k), model.remove(&k));
            }
            prop_assert_eq!(sut.query(&k), model.contains(&k));
            prop_assert_eq!(sut.len(), model.len());
        }
    }
}

// Property: batch query equals element-wise query in input order.
proptest! {
    #[test]
    fn prop_query_many_is_elementwise(
        stored in proptest::collection::vec(0u8..16, 0..16),
        probe in proptest::collection::vec(0u8..16, 0..16),
    ) {
        let m: Map<u8, u32> = Map::from_pairs(stored.iter().map(|&k| (k, u32::from(k) * 7)))
            .with_missing_key_policy(crate::MissingKeyPolicy::Default)
            .with_default_value(u32::MAX);
        let batch = m.query_many(&probe).unwrap();
        for (i, k) in probe.iter().enumerate() {
            prop_assert_eq!(batch[i], m.query(k).unwrap());
        }
    }
}
