//! # mockdb Engine
//!
//! The core of mockdb: a schema-less JSON record store with a query engine,
//! meant to back generic REST mocks where collection shapes are not known
//! ahead of time.
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A [`Record`] is a string-keyed mapping of JSON values. The only reserved
//! field is `id`, compared through its canonical string form.
//!
//! ### Collections and the Database
//!
//! A [`Collection`] is an insertion-ordered sequence of records. The
//! [`Database`] maps normalized (trimmed, lowercased) collection names to
//! collections. Collections are created lazily on first write.
//!
//! ### Store
//!
//! The [`Store`] holds the database behind one reader/writer lock and
//! persists it to a single JSON file after every mutation, while still
//! holding the exclusive lock.
//!
//! ### Queries
//!
//! [`ListQuery`] turns a query-string map into filter clauses (`price_gte=10`,
//! `title_like=dune`), a multi-key [`SortSpec`] (`_sort=-year,title`) and a
//! [`Pagination`] window (`_page`, `_per_page`, `_limit`).
//!
//! ### Service
//!
//! [`RecordService`] implements collection-scoped CRUD: list, get, create
//! (with generated ids), replace (upsert), update (merge) and delete.
//!
//! ## Quick Start
//!
//! ```rust
//! use mockdb_engine::{ListQuery, Record, RecordService, Store};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = Store::load(dir.path().join("db.json")).unwrap();
//! let service = RecordService::new(Arc::new(store));
//!
//! let created = service
//!     .create("Books", Record::from_value(json!({"title": "Dune", "year": 1965})))
//!     .unwrap();
//! assert_eq!(created.id_string().as_deref(), Some("1"));
//!
//! let page = service.get_all("books", &ListQuery::from_params([("year_gte", "1960")]));
//! assert_eq!(page.total, 1);
//! ```

pub mod database;
pub mod error;
pub mod query;
pub mod record;
pub mod service;
pub mod store;
pub mod value;

// Re-export main types at crate root
pub use database::{normalize_name, Collection, Database};
pub use error::Error;
pub use query::{
    Filter, FilterClause, ListQuery, Operator, Page, Pagination, SortKey, SortSpec,
};
pub use record::{Record, ID_FIELD};
pub use service::RecordService;
pub use store::Store;

/// Type aliases for clarity
pub type RecordId = String;
pub type CollectionName = String;
