//! Recursive merge of manifest documents.

use serde_json::Value;
use strand_types::Manifest;

/// Merge `patch` over `base`.
///
/// Objects merge key by key, recursing into keys present on both sides.
/// Everything else (arrays, scalars, `null`) in the patch replaces the
/// base value wholesale. Keys absent from the patch are kept.
pub fn deep_merge(base: &Value, patch: &Value) -> Value {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            let mut merged = base.clone();
            for (key, value) in patch {
                let next = match base.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (_, patch) => patch.clone(),
    }
}

/// Merge a patch into a stored manifest, keeping the stored identifier.
///
/// `fallback_id` is used when the stored manifest carries no identifier.
pub fn merge_manifest(existing: &Manifest, patch: &Manifest, fallback_id: &str) -> Manifest {
    let id = existing.id().unwrap_or(fallback_id).to_string();
    let mut merged = existing.as_map().clone();
    for (key, value) in patch.as_map() {
        let next = match merged.get(key) {
            Some(current) => deep_merge(current, value),
            None => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    let mut manifest = Manifest::from(merged);
    manifest.set_id(id);
    manifest
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn manifest(value: Value) -> Manifest {
        Manifest::from_value(value).unwrap()
    }

    #[test]
    fn nested_objects_merge() {
        let base = json!({"metadata": {"name": "a", "tags": {"x": 1}}, "components": ["b1"]});
        let patch = json!({"metadata": {"tags": {"y": 2}}});
        assert_eq!(
            deep_merge(&base, &patch),
            json!({"metadata": {"name": "a", "tags": {"x": 1, "y": 2}}, "components": ["b1"]})
        );
    }

    #[test]
    fn arrays_replace() {
        let base = json!({"components": ["b1", "b2"]});
        let patch = json!({"components": ["b3"]});
        assert_eq!(deep_merge(&base, &patch), json!({"components": ["b3"]}));
    }

    #[test]
    fn null_and_scalars_replace() {
        let base = json!({"a": {"deep": true}, "b": 1});
        let patch = json!({"a": null, "b": "one"});
        assert_eq!(deep_merge(&base, &patch), json!({"a": null, "b": "one"}));
    }

    #[test]
    fn object_replaces_scalar() {
        let base = json!({"a": 1});
        let patch = json!({"a": {"b": 2}});
        assert_eq!(deep_merge(&base, &patch), json!({"a": {"b": 2}}));
    }

    #[test]
    fn identifier_is_locked() {
        let existing = manifest(json!({"id": "P1", "metadata": {"name": "x"}, "components": []}));
        let patch = manifest(json!({"id": "OTHER", "metadata": {"name": "y"}}));
        let merged = merge_manifest(&existing, &patch, "P1");
        assert_eq!(merged.id(), Some("P1"));
        assert_eq!(merged.metadata().unwrap()["name"], json!("y"));
    }

    #[test]
    fn missing_identifier_uses_fallback() {
        let existing = manifest(json!({"metadata": {}}));
        let patch = manifest(json!({"id": "OTHER"}));
        assert_eq!(merge_manifest(&existing, &patch, "B1").id(), Some("B1"));
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z]{0,6}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-c]{1,2}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn arb_manifest() -> impl Strategy<Value = Manifest> {
        (
            prop::collection::btree_map("[a-d]{1,2}", arb_json(), 0..5),
            "[a-z]{1,4}",
        )
            .prop_map(|(fields, id)| {
                let mut m = manifest(Value::Object(fields.into_iter().collect()));
                m.set_id(id);
                m
            })
    }

    proptest! {
        #[test]
        fn merge_never_changes_identifier(existing in arb_manifest(), patch in arb_manifest()) {
            let merged = merge_manifest(&existing, &patch, "fallback");
            prop_assert_eq!(merged.id(), existing.id());
        }

        #[test]
        fn empty_patch_is_identity(base in arb_json()) {
            prop_assert_eq!(deep_merge(&base, &json!({})), match &base {
                Value::Object(_) => base.clone(),
                _ => json!({}),
            });
        }

        #[test]
        fn merge_is_idempotent(base in arb_json(), patch in arb_json()) {
            let once = deep_merge(&base, &patch);
            let twice = deep_merge(&once, &patch);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn patch_leaves_win(existing in arb_manifest(), patch in arb_manifest()) {
            let merged = merge_manifest(&existing, &patch, "fallback");
            for (key, value) in patch.as_map() {
                if key == "id" || value.is_object() {
                    continue;
                }
                prop_assert_eq!(merged.get(key), Some(value));
            }
        }

        #[test]
        fn keys_absent_from_patch_survive(existing in arb_manifest(), patch in arb_manifest()) {
            let merged = merge_manifest(&existing, &patch, "fallback");
            for (key, value) in existing.as_map() {
                if !patch.as_map().contains_key(key) {
                    prop_assert_eq!(merged.get(key), Some(value));
                }
            }
        }
    }
}
