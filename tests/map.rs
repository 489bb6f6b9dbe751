// Map integration test suite.
//
// Each test documents what behavior is being verified. The core invariants
// exercised:
// - Round-trip: after insert(k, v), query(k) == v and has_key(k).
// - Overwrite: a second insert of an equal key replaces the value without
//   changing len().
// - Delete idempotence: delete(k) twice is a no-op the second time.
// - Missing-key policy: `throw` raises MissingKey, `default` returns the
//   default value; has_key/delete never raise.
// - Collisions: a degenerate hash never merges distinct keys.
// - Normalizer: case folding applies to both hashing and equality.
use deep_hashtable::{Error, Map, MissingKeyPolicy, TableOptions};
use serde::Serialize;
use serde_json::json;

// Test: round-trip and length accounting across overwrites and deletes.
// Verifies: len() == distinct keys inserted minus those deleted.
#[test]
fn length_accounting() {
    let mut m: Map<Vec<u8>, usize> = Map::new();
    for round in 0..3 {
        for k in 0..10u8 {
            m.insert(vec![k, k], round);
        }
    }
    assert_eq!(m.len(), 10);
    for k in 0..10u8 {
        assert_eq!(m.query(&vec![k, k]), Ok(Some(&2)));
    }
    for k in 0..4u8 {
        m.delete(&vec![k, k]);
        m.delete(&vec![k, k]);
    }
    assert_eq!(m.len(), 6);
    assert_eq!(m.keys().count(), 6);
    assert_eq!(m.values().count(), 6);
}

// Test: missing-key policies.
// Verifies: MissingKey is a distinguishable error kind; default returns D.
#[test]
fn missing_key_policies() {
    let mut m: Map<String, i32> = Map::new();
    m.insert("present".to_string(), 1);

    let err = m.query(&"absent".to_string()).unwrap_err();
    assert!(matches!(err, Error::MissingKey { .. }));
    assert!(!m.has_key(&"absent".to_string()));
    assert_eq!(m.delete(&"absent".to_string()), None);

    m.set_missing_key_policy(MissingKeyPolicy::Default);
    m.set_default_value(Some(0));
    assert_eq!(m.query(&"absent".to_string()), Ok(Some(&0)));
    assert_eq!(m.query(&"present".to_string()), Ok(Some(&1)));
}

// Test: collision correctness under a hash mapping every key to one digest.
// Verifies: query(k1) == v1 and query(k2) == v2 hold simultaneously.
#[test]
fn degenerate_hash_keeps_keys_apart() {
    let opts = TableOptions::<(i32, i32)>::new().with_hash_fn(|_| "collide".to_string());
    let mut m = Map::with_options(opts);
    m.insert((1, 2), "v1");
    m.insert((2, 1), "v2");
    assert_eq!(m.query(&(1, 2)), Ok(Some(&"v1")));
    assert_eq!(m.query(&(2, 1)), Ok(Some(&"v2")));

    m.insert((1, 2), "v1b");
    assert_eq!(m.len(), 2);
    assert_eq!(m.query(&(1, 2)), Ok(Some(&"v1b")));
    assert_eq!(m.query(&(2, 1)), Ok(Some(&"v2")));
}

// Test: case-folding normalizer with default hash and equality.
// Verifies: insert("A", 1) then query("a") == 1.
#[test]
fn case_folding_normalizer() {
    let opts = TableOptions::<String>::new().with_normalize_fn(|k| k.to_lowercase());
    let mut m = Map::with_options(opts);
    m.insert("A".to_string(), 1);
    assert_eq!(m.query(&"a".to_string()), Ok(Some(&1)));
    assert!(m.has_key(&"A".to_string()));
}

// Test: dynamic JSON keys.
// Verifies: deep structural equality with exact type match; object field
// order does not matter, integer 1 and float 1.0 are different keys.
#[test]
fn json_document_keys() {
    let mut m: Map<serde_json::Value, &str> = Map::new();
    m.insert(json!({"a": 1, "b": [1, 2, {"c": null}]}), "doc");
    m.insert(json!(1), "int");
    m.insert(json!(1.0), "float");

    assert_eq!(m.get(&json!({"b": [1, 2, {"c": null}], "a": 1})), Some(&"doc"));
    assert_eq!(m.get(&json!({"a": 1, "b": [2, 1, {"c": null}]})), None);
    assert_eq!(m.get(&json!(1)), Some(&"int"));
    assert_eq!(m.get(&json!(1.0)), Some(&"float"));
    assert_eq!(m.len(), 3);
}

// Test: user-defined key types with a custom equality that ignores a field.
// Assumes: the custom hash ignores the same field (caller obligation).
// Verifies: the ignored field does not affect identity.
#[test]
fn custom_equality_on_struct_keys() {
    #[derive(Debug, Clone)]
    struct Account {
        id: u64,
        display_name: String,
    }

    let opts = TableOptions::with_functions(
        |a: &Account| a.id.to_string(),
        |a: &Account, b: &Account| a.id == b.id,
    );
    let mut m = Map::with_options(opts);
    m.insert(
        Account {
            id: 7,
            display_name: "old".into(),
        },
        100,
    );
    let probe = Account {
        id: 7,
        display_name: "new".into(),
    };
    assert_eq!(m.get(&probe), Some(&100));
    assert_eq!(m.get_key(&probe).map(|a| a.display_name.as_str()), Some("old"));
}

// Test: nested serde structures as keys with the default functions.
#[test]
fn nested_struct_keys() {
    #[derive(Serialize, PartialEq, Debug)]
    enum Shape {
        Circle { r: u32 },
        Poly(Vec<(i32, i32)>),
    }

    let mut m = Map::new();
    m.insert(Shape::Circle { r: 1 }, 'c');
    m.insert(Shape::Poly(vec![(0, 0), (1, 0), (0, 1)]), 't');
    assert_eq!(m.get(&Shape::Circle { r: 1 }), Some(&'c'));
    assert_eq!(m.get(&Shape::Poly(vec![(0, 0), (1, 0), (0, 1)])), Some(&'t'));
    assert_eq!(m.get(&Shape::Poly(vec![(0, 0), (0, 1), (1, 0)])), None);
}

// Test: batch subscription.
// Verifies: i-th result equals query(k_i), in input order.
#[test]
fn batch_query_matches_single_queries() {
    let m: Map<char, u32> = "hello".chars().zip(1..).collect();
    let probe = ['o', 'h', 'l', 'e'];
    let batch = m.query_many(&probe).unwrap();
    let single: Vec<_> = probe.iter().map(|k| m.query(k).unwrap()).collect();
    assert_eq!(batch, single);
    // 'l' appears twice; the later value wins.
    assert_eq!(m.get(&'l'), Some(&4));
}

// Test: construction from parallel sequences validates shape.
#[test]
fn from_parallel_rejects_ragged_input() {
    match Map::<i32, i32>::from_parallel(vec![1, 2], vec![1]) {
        Err(Error::Validation(msg)) => assert!(msg.contains("2 keys but 1 values")),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("expected validation error"),
    }
}

// Test: the default hash accepts every serde value.
// Verifies: 128-bit integers beyond u64 and maps keyed by tuples round-trip
// through insert/query/delete, and HashMap keys digest like BTreeMap keys.
#[test]
fn default_hash_accepts_wide_and_composite_keys() {
    let mut wide: Map<u128, i32> = Map::new();
    assert_eq!(wide.insert(u128::MAX, 1), None);
    assert_eq!(wide.insert(u128::MAX - 1, 2), None);
    assert_eq!(wide.len(), 2);
    assert_eq!(wide.query(&u128::MAX), Ok(Some(&1)));
    assert_eq!(wide.delete(&(u128::MAX - 1)), Some(2));

    let mut m: Map<std::collections::HashMap<(i32, i32), i32>, &str> = Map::new();
    let mut key = std::collections::HashMap::new();
    for i in 0..16 {
        key.insert((i, -i), i * 3);
    }
    m.insert(key.clone(), "grid");
    let rebuilt: std::collections::HashMap<(i32, i32), i32> =
        (0..16).rev().map(|i| ((i, -i), i * 3)).collect();
    assert_eq!(m.query(&rebuilt), Ok(Some(&"grid")));
    assert!(m.has_key(&key));
}
