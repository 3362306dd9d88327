use serde_json::Value;
use strand_types::manifest::{COMPONENTS_FIELD, ID_FIELD, METADATA_FIELD, SEQUENCE_FIELD};
use strand_types::{Manifest, SequenceHash};
use tracing::debug;

use crate::entity::EntityKind;

/// Decides whether a manifest is acceptable for storage.
///
/// The store consults the validator before `write` and `merge` (and before
/// `create` when configured to), and rejects with `InvalidModel` when it
/// returns `false`.
pub trait ManifestValidator: Send + Sync {
    fn validate(&self, kind: EntityKind, manifest: &Manifest) -> bool;
}

/// Structural checks on the fields the store and its callers rely on.
///
/// - `id` is a non-empty string
/// - `metadata` is an object
/// - `components` is an array of strings
/// - a block's `sequence`, when present, is an object whose `hash` (if any)
///   is a hex digest
///
/// Unknown fields are accepted.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    fn check(kind: EntityKind, manifest: &Manifest) -> Result<(), String> {
        match manifest.get(ID_FIELD) {
            Some(Value::String(id)) if !id.is_empty() => {}
            _ => return Err(format!("`{ID_FIELD}` must be a non-empty string")),
        }
        if !matches!(manifest.get(METADATA_FIELD), Some(Value::Object(_))) {
            return Err(format!("`{METADATA_FIELD}` must be an object"));
        }
        match manifest.get(COMPONENTS_FIELD) {
            Some(Value::Array(items)) if items.iter().all(Value::is_string) => {}
            _ => return Err(format!("`{COMPONENTS_FIELD}` must be an array of strings")),
        }
        if kind == EntityKind::Block {
            match manifest.get(SEQUENCE_FIELD) {
                None | Some(Value::Null) => {}
                Some(Value::Object(sequence)) => match sequence.get("hash") {
                    None | Some(Value::Null) => {}
                    Some(Value::String(hash)) if SequenceHash::parse(hash).is_ok() => {}
                    Some(_) => return Err("`sequence.hash` must be a hex digest".into()),
                },
                Some(_) => return Err(format!("`{SEQUENCE_FIELD}` must be an object")),
            }
        }
        Ok(())
    }
}

impl ManifestValidator for SchemaValidator {
    fn validate(&self, kind: EntityKind, manifest: &Manifest) -> bool {
        match Self::check(kind, manifest) {
            Ok(()) => true,
            Err(reason) => {
                debug!(%kind, id = ?manifest.id(), %reason, "manifest rejected");
                false
            }
        }
    }
}

/// Accepts every manifest.
#[derive(Clone, Copy, Debug, Default)]
pub struct PermissiveValidator;

impl ManifestValidator for PermissiveValidator {
    fn validate(&self, _kind: EntityKind, _manifest: &Manifest) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest(value: Value) -> Manifest {
        Manifest::from_value(value).unwrap()
    }

    #[test]
    fn minimal_manifests_are_valid() {
        let v = SchemaValidator;
        assert!(v.validate(EntityKind::Project, &Manifest::new("P1")));
        assert!(v.validate(EntityKind::Block, &Manifest::new("B1")));
    }

    #[test]
    fn unknown_fields_are_accepted() {
        let m = manifest(json!({"id": "P1", "metadata": {}, "components": [], "extra": [1, 2]}));
        assert!(SchemaValidator.validate(EntityKind::Project, &m));
    }

    #[test]
    fn missing_or_empty_id_is_rejected() {
        let v = SchemaValidator;
        assert!(!v.validate(
            EntityKind::Project,
            &manifest(json!({"metadata": {}, "components": []}))
        ));
        assert!(!v.validate(
            EntityKind::Project,
            &manifest(json!({"id": "", "metadata": {}, "components": []}))
        ));
        assert!(!v.validate(
            EntityKind::Project,
            &manifest(json!({"id": 7, "metadata": {}, "components": []}))
        ));
    }

    #[test]
    fn components_must_be_strings() {
        let m = manifest(json!({"id": "P1", "metadata": {}, "components": ["B1", 2]}));
        assert!(!SchemaValidator.validate(EntityKind::Project, &m));
        let m = manifest(json!({"id": "P1", "metadata": {}, "components": "B1"}));
        assert!(!SchemaValidator.validate(EntityKind::Project, &m));
    }

    #[test]
    fn metadata_must_be_object() {
        let m = manifest(json!({"id": "P1", "metadata": [], "components": []}));
        assert!(!SchemaValidator.validate(EntityKind::Project, &m));
    }

    #[test]
    fn block_sequence_hash_is_checked() {
        let v = SchemaValidator;
        let ok = manifest(
            json!({"id": "B1", "metadata": {}, "components": [], "sequence": {"hash": "abcd"}}),
        );
        assert!(v.validate(EntityKind::Block, &ok));

        let bad = manifest(
            json!({"id": "B1", "metadata": {}, "components": [], "sequence": {"hash": "not hex"}}),
        );
        assert!(!v.validate(EntityKind::Block, &bad));

        let not_object = manifest(
            json!({"id": "B1", "metadata": {}, "components": [], "sequence": "abcd"}),
        );
        assert!(!v.validate(EntityKind::Block, &not_object));
    }

    #[test]
    fn permissive_accepts_anything() {
        assert!(PermissiveValidator.validate(EntityKind::Block, &Manifest::default()));
    }
}
