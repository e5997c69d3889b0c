//! Record service - collection-scoped CRUD on top of the [`Store`].
//!
//! Every operation normalizes the collection name first, so `Books`,
//! ` books ` and `books` address the same collection. Reads take the shared
//! lock and clone only the records they return. Writes do their existence
//! checks, mutation and save inside one exclusive-lock section.

use crate::database::normalize_name;
use crate::error::{Error, Result};
use crate::query::{ListQuery, Page};
use crate::{Record, Store};
use std::sync::Arc;

/// CRUD operations over named collections.
#[derive(Debug, Clone)]
pub struct RecordService {
    store: Arc<Store>,
}

impl RecordService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Filter, sort and paginate a collection.
    ///
    /// A collection that does not exist reads as empty with `total == 0`.
    pub fn get_all(&self, collection: &str, query: &ListQuery) -> Page<Record> {
        let name = normalize_name(collection);
        self.store.read(|db| match db.collection(&name) {
            Some(c) => query.execute(c.records()).map(Record::clone),
            None => Page::empty(query.pagination),
        })
    }

    /// First record whose id matches, if any.
    pub fn get_by_id(&self, collection: &str, id: &str) -> Option<Record> {
        let name = normalize_name(collection);
        self.store
            .read(|db| db.collection(&name).and_then(|c| c.get(id)).cloned())
    }

    /// Append a record, creating the collection if needed.
    ///
    /// A body without an `id` gets one past the largest integer id in the
    /// collection.
    pub fn create(&self, collection: &str, mut body: Record) -> Result<Record> {
        let name = normalize_name(collection);
        self.store.write(|db| {
            let c = db.ensure_collection(&name);
            if !body.has_id() {
                let id = c
                    .next_id()
                    .ok_or_else(|| Error::IdsExhausted(name.clone()))?;
                body.set_id(id);
            }
            c.push(body.clone());
            tracing::debug!(collection = %name, id = ?body.id_string(), "created record");
            Ok(body)
        })
    }

    /// Upsert the record with `id`. Any `id` in `body` is replaced by `id`.
    pub fn replace(&self, collection: &str, id: &str, mut body: Record) -> Result<Record> {
        let name = normalize_name(collection);
        body.set_id(id);
        self.store.write(|db| {
            let c = db
                .collection_mut(&name)
                .ok_or_else(|| Error::CollectionNotFound(name.clone()))?;
            match c.position(id) {
                Some(index) => c.replace_at(index, body.clone()),
                None => c.push(body.clone()),
            }
            tracing::debug!(collection = %name, id, "replaced record");
            Ok(body)
        })
    }

    /// Merge `fields` into the record with `id`. An `id` in `fields` is
    /// ignored.
    pub fn update(&self, collection: &str, id: &str, fields: &Record) -> Result<Record> {
        let name = normalize_name(collection);
        self.store.write(|db| {
            let c = db
                .collection_mut(&name)
                .ok_or_else(|| Error::CollectionNotFound(name.clone()))?;
            let index = c
                .position(id)
                .ok_or_else(|| Error::EntryNotFound(id.to_string()))?;

            let mut updated = c.records()[index].clone();
            updated.merge(fields);
            c.replace_at(index, updated.clone());
            tracing::debug!(collection = %name, id, "updated record");
            Ok(updated)
        })
    }

    /// Remove the record with `id`, keeping the order of the rest.
    pub fn delete(&self, collection: &str, id: &str) -> Result<Record> {
        let name = normalize_name(collection);
        self.store.write(|db| {
            let c = db
                .collection_mut(&name)
                .ok_or_else(|| Error::CollectionNotFound(name.clone()))?;
            let index = c
                .position(id)
                .ok_or_else(|| Error::EntryNotFound(id.to_string()))?;

            let removed = c.remove_at(index);
            tracing::debug!(collection = %name, id, "deleted record");
            Ok(removed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn service() -> (TempDir, RecordService) {
        let dir = TempDir::new().unwrap();
        let store = Store::load(dir.path().join("db.json")).unwrap();
        (dir, RecordService::new(Arc::new(store)))
    }

    fn body(value: Value) -> Record {
        Record::from_value(value)
    }

    #[test]
    fn first_generated_id_is_one() {
        let (_dir, svc) = service();
        let created = svc.create("books", body(json!({"title": "Dune"}))).unwrap();
        assert_eq!(created.get("id"), Some(&json!("1")));
    }

    #[test]
    fn generated_id_follows_max_integer_id() {
        let (_dir, svc) = service();
        for id in ["2", "5", "x"] {
            svc.create("books", body(json!({"id": id}))).unwrap();
        }
        let created = svc.create("books", body(json!({"title": "t"}))).unwrap();
        assert_eq!(created.id_string().as_deref(), Some("6"));
    }

    #[test]
    fn supplied_id_is_kept_as_is() {
        let (_dir, svc) = service();
        let created = svc.create("books", body(json!({"id": 42}))).unwrap();
        assert_eq!(created.get("id"), Some(&json!(42)));
        assert!(svc.get_by_id("books", "42").is_some());
    }

    #[test]
    fn collection_names_are_normalized() {
        let (_dir, svc) = service();
        svc.create("  Books ", body(json!({"title": "Dune"}))).unwrap();

        assert!(svc.get_by_id("BOOKS", "1").is_some());
        assert_eq!(svc.get_all("books", &ListQuery::new()).total, 1);
        assert!(svc.store().read(|db| db.contains("books")));
    }

    #[test]
    fn missing_collection_reads_empty() {
        let (_dir, svc) = service();
        let page = svc.get_all("nothing", &ListQuery::new());
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert!(svc.get_by_id("nothing", "1").is_none());
    }

    #[test]
    fn replace_is_upsert_and_strips_body_id() {
        let (_dir, svc) = service();
        svc.create("books", body(json!({"title": "a"}))).unwrap();

        let stored = svc
            .replace("books", "7", body(json!({"id": "x", "title": "t"})))
            .unwrap();
        assert_eq!(Value::from(stored), json!({"id": "7", "title": "t"}));
        assert_eq!(svc.get_all("books", &ListQuery::new()).total, 2);

        let stored = svc
            .replace("books", "1", body(json!({"title": "b"})))
            .unwrap();
        assert_eq!(Value::from(stored), json!({"id": "1", "title": "b"}));

        let page = svc.get_all("books", &ListQuery::new());
        assert_eq!(page.total, 2);
        assert!(page.items[0].matches_id("1"));
    }

    #[test]
    fn replace_requires_collection() {
        let (_dir, svc) = service();
        let result = svc.replace("books", "1", body(json!({})));
        assert!(matches!(result, Err(Error::CollectionNotFound(name)) if name == "books"));
        assert!(svc.store().read(|db| db.is_empty()));
    }

    #[test]
    fn update_merges_and_ignores_id() {
        let (_dir, svc) = service();
        svc.create("books", body(json!({"title": "Dune", "year": 1965})))
            .unwrap();

        let updated = svc
            .update("books", "1", &body(json!({"id": "9", "year": 1966, "author": "Herbert"})))
            .unwrap();
        assert_eq!(
            Value::from(updated),
            json!({"id": "1", "title": "Dune", "year": 1966, "author": "Herbert"})
        );
        assert!(svc.get_by_id("books", "9").is_none());
    }

    #[test]
    fn update_and_delete_report_not_found() {
        let (_dir, svc) = service();
        let patch = body(json!({"a": 1}));

        assert!(matches!(
            svc.update("books", "1", &patch),
            Err(Error::CollectionNotFound(_))
        ));
        assert!(matches!(
            svc.delete("books", "1"),
            Err(Error::CollectionNotFound(_))
        ));

        svc.create("books", body(json!({}))).unwrap();
        assert!(matches!(
            svc.update("books", "2", &patch),
            Err(Error::EntryNotFound(id)) if id == "2"
        ));
        assert!(matches!(
            svc.delete("books", "2"),
            Err(Error::EntryNotFound(_))
        ));
    }

    #[test]
    fn delete_preserves_order() {
        let (_dir, svc) = service();
        for _ in 0..3 {
            svc.create("books", body(json!({}))).unwrap();
        }
        let removed = svc.delete("books", "2").unwrap();
        assert!(removed.matches_id("2"));

        let page = svc.get_all("books", &ListQuery::new());
        let ids: Vec<_> = page.items.iter().filter_map(Record::id_string).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn get_all_applies_query() {
        let (_dir, svc) = service();
        for price in [5, 15, 25, 35] {
            svc.create("books", body(json!({"price": price}))).unwrap();
        }
        let query = ListQuery::from_params([("price_gte", "10"), ("_sort", "-price"), ("_per_page", "2")]);
        let page = svc.get_all("books", &query);

        assert_eq!(page.total, 3);
        let prices: Vec<_> = page.items.iter().filter_map(|r| r.get("price").cloned()).collect();
        assert_eq!(prices, vec![json!(35), json!(25)]);
    }
}
