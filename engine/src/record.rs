//! Record types for storing data.

use crate::value::canonical_string;
use crate::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the one reserved field.
pub const ID_FIELD: &str = "id";

/// A single schema-less document: a string-keyed mapping of JSON values.
///
/// The `id` field identifies the record within its collection. Ids are
/// compared through their canonical string form, so `7` and `"7"` address the
/// same record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Get a field value. JSON `null` is returned as-is.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Get a field value, treating JSON `null` as absent.
    pub fn get_present(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    /// Set a field, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Remove a field.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// The raw `id` value, if any.
    pub fn id(&self) -> Option<&Value> {
        self.0.get(ID_FIELD)
    }

    /// Whether the record carries an `id` field.
    pub fn has_id(&self) -> bool {
        self.0.contains_key(ID_FIELD)
    }

    /// Canonical string form of the `id` field.
    pub fn id_string(&self) -> Option<RecordId> {
        self.id().map(canonical_string)
    }

    /// Whether this record is addressed by `id`.
    pub fn matches_id(&self, id: &str) -> bool {
        self.id().is_some_and(|v| canonical_string(v) == id)
    }

    /// Force the `id` field to a string value.
    pub fn set_id(&mut self, id: impl Into<RecordId>) {
        self.0.insert(ID_FIELD.to_string(), Value::String(id.into()));
    }

    /// Copy every field of `patch` onto this record except `id`.
    pub fn merge(&mut self, patch: &Record) {
        for (key, value) in patch.iter() {
            if key == ID_FIELD {
                continue;
            }
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Iterate over fields.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Build a record from any JSON value. Non-object values yield an empty
    /// record, matching how request bodies that fail to decode are treated.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::new(),
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
