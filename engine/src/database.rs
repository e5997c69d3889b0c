//! In-memory database: named collections of records.
//!
//! The serialized form is the backing file format: one JSON object whose
//! members are collection names mapping to arrays of records.

use crate::value::as_integer_id;
use crate::{CollectionName, Record, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalize a collection name for lookup: trimmed and lowercased.
pub fn normalize_name(name: &str) -> CollectionName {
    name.trim().to_lowercase()
}

/// An ordered sequence of records. Order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    records: Vec<Record>,
}

impl Collection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Index of the first record whose id matches.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.matches_id(id))
    }

    /// Get the first record whose id matches.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.matches_id(id))
    }

    /// Append a record.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Overwrite the record at `index`.
    pub fn replace_at(&mut self, index: usize, record: Record) {
        self.records[index] = record;
    }

    /// Remove the record at `index`, keeping the order of the rest.
    pub fn remove_at(&mut self, index: usize) -> Record {
        self.records.remove(index)
    }

    /// All records in order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Next generated id: one past the largest integer id, `"1"` if none.
    /// Ids that are not integers are skipped. `None` once the largest id is
    /// `i64::MAX`.
    pub fn next_id(&self) -> Option<RecordId> {
        let max = self
            .records
            .iter()
            .filter_map(|r| r.id().and_then(as_integer_id))
            .fold(0, i64::max);
        max.checked_add(1).map(|n| n.to_string())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<Record> for Collection {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// All collections by name.
///
/// A BTreeMap keeps the serialized member order deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Database {
    collections: BTreeMap<CollectionName, Collection>,
}

impl Database {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a collection by its already-normalized name.
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Mutable lookup by already-normalized name.
    pub fn collection_mut(&mut self, name: &str) -> Option<&mut Collection> {
        self.collections.get_mut(name)
    }

    /// Get a collection, creating it empty if absent.
    pub fn ensure_collection(&mut self, name: &str) -> &mut Collection {
        self.collections.entry(name.to_string()).or_default()
    }

    /// Whether a collection exists.
    pub fn contains(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Collection names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &CollectionName> {
        self.collections.keys()
    }

    /// Number of collections.
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Total records across all collections.
    pub fn record_count(&self) -> usize {
        self.collections.values().map(Collection::len).sum()
    }
}
