use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TypeError;
use crate::sequence::SequenceHash;

/// Field holding the entity's own identifier.
pub const ID_FIELD: &str = "id";
/// Field holding the free-form metadata object.
pub const METADATA_FIELD: &str = "metadata";
/// Field holding the ordered list of child block identifiers.
pub const COMPONENTS_FIELD: &str = "components";
/// Field holding a block's optional sequence reference.
pub const SEQUENCE_FIELD: &str = "sequence";

/// The JSON document stored for a project or a block.
///
/// A manifest is a JSON object with at least `id`, `metadata` and
/// `components`. Any other fields are carried through untouched, so the
/// store never loses data it does not understand. Shape checks beyond
/// "is an object" belong to the validator, not to this type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(Map<String, Value>);

impl Manifest {
    /// Create a minimal manifest with an id, empty metadata and no components.
    pub fn new(id: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert(ID_FIELD.into(), Value::String(id.into()));
        map.insert(METADATA_FIELD.into(), Value::Object(Map::new()));
        map.insert(COMPONENTS_FIELD.into(), Value::Array(Vec::new()));
        Self(map)
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, TypeError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(TypeError::NotAnObject(json_kind(&other).to_string())),
        }
    }

    /// Parse a manifest from JSON text.
    pub fn from_json(text: &str) -> Result<Self, TypeError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| TypeError::Serialization(e.to_string()))?;
        Self::from_value(value)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, TypeError> {
        serde_json::to_string_pretty(&self.0).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(Value::as_str)
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.0.insert(ID_FIELD.into(), Value::String(id.into()));
    }

    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.0.get(METADATA_FIELD).and_then(Value::as_object)
    }

    /// The sequence this block references through `sequence.hash`, if any.
    pub fn sequence_hash(&self) -> Option<SequenceHash> {
        self.0
            .get(SEQUENCE_FIELD)
            .and_then(|s| s.get("hash"))
            .and_then(Value::as_str)
            .and_then(|h| SequenceHash::parse(h).ok())
    }

    pub fn set_sequence_hash(&mut self, hash: &SequenceHash) {
        let entry = self
            .0
            .entry(SEQUENCE_FIELD)
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(seq) = entry {
            seq.insert("hash".into(), Value::String(hash.to_string()));
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Manifest> for Value {
    fn from(manifest: Manifest) -> Self {
        manifest.into_value()
    }
}

impl From<Map<String, Value>> for Manifest {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Manifest {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_has_required_fields() {
        let m = Manifest::new("p1");
        assert_eq!(m.id(), Some("p1"));
        assert!(m.metadata().unwrap().is_empty());
        assert_eq!(m.get(COMPONENTS_FIELD), Some(&json!([])));
    }

    #[test]
    fn from_value_rejects_non_objects() {
        let err = Manifest::from_value(json!([1, 2])).unwrap_err();
        assert_eq!(err, TypeError::NotAnObject("array".into()));
    }

    #[test]
    fn unknown_fields_survive_roundtrip() {
        let value = json!({"id": "b1", "metadata": {}, "components": [], "some": "field"});
        let m = Manifest::from_value(value.clone()).unwrap();
        let text = m.to_json_pretty().unwrap();
        let back = Manifest::from_json(&text).unwrap();
        assert_eq!(back.into_value(), value);
    }

    #[test]
    fn sequence_reference() {
        let mut m = Manifest::new("b1");
        assert!(m.sequence_hash().is_none());
        m.set_sequence_hash(&SequenceHash::parse("abcd").unwrap());
        assert_eq!(m.sequence_hash().unwrap().as_str(), "abcd");
        assert_eq!(m.get("sequence").unwrap(), &json!({"hash": "abcd"}));
    }

    #[test]
    fn sequence_reference_replaces_non_object() {
        let mut m = Manifest::from_value(json!({"id": "b1", "sequence": "junk"})).unwrap();
        m.set_sequence_hash(&SequenceHash::parse("ff").unwrap());
        assert_eq!(m.sequence_hash().unwrap().as_str(), "ff");
    }

    #[test]
    fn from_json_reports_parse_errors() {
        assert!(matches!(
            Manifest::from_json("{not json"),
            Err(TypeError::Serialization(_))
        ));
    }
}
