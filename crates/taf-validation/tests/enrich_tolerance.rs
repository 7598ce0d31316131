//! Property tests for enrichment tolerance: any JSON value survives
//! enrichment, and existing structure is never removed.

use proptest::prelude::*;
use serde_json::Value;

use taf_validation::enrich;

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9:TZ _-]{0,24}".prop_map(Value::from),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::from),
            prop::collection::btree_map("[a-zA-Z]{1,14}", inner, 0..6)
                .prop_map(|fields| Value::Object(fields.into_iter().collect())),
        ]
    })
}

/// Keys and array slots present before enrichment must still exist after.
fn structure_preserved(before: &Value, after: &Value) -> bool {
    match (before, after) {
        (Value::Object(old), Value::Object(new)) => old.iter().all(|(key, old_value)| {
            new.get(key)
                .is_some_and(|new_value| structure_preserved(old_value, new_value))
        }),
        (Value::Array(old), Value::Array(new)) => {
            old.len() == new.len()
                && old
                    .iter()
                    .zip(new.iter())
                    .all(|(o, n)| structure_preserved(o, n))
        }
        // Scalars may be rewritten (a missing weather becomes "NSW") but
        // never turn into a different shape class by enrichment.
        _ => !before.is_object() && !before.is_array(),
    }
}

proptest! {
    #[test]
    fn enrich_completes_and_preserves_structure(mut doc in arb_json()) {
        let before = doc.clone();
        enrich(&mut doc);
        prop_assert!(structure_preserved(&before, &doc));
    }

    #[test]
    fn enrich_is_idempotent_on_scalars(mut doc in prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        ".*".prop_map(Value::from),
    ]) {
        let before = doc.clone();
        enrich(&mut doc);
        prop_assert_eq!(before, doc);
    }
}
