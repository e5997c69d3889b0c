//! Query engine: filtering, sorting and pagination over record sequences.
//!
//! Everything here is pure. [`ListQuery`] is the parsed form of a list
//! request's query string and [`ListQuery::execute`] runs it over a slice of
//! records:
//!
//! 1. keep records matching every [`FilterClause`]
//! 2. count them (the page `total`)
//! 3. stable-sort if a [`SortSpec`] was given
//! 4. cut the requested [`Pagination`] window
//!
//! ```rust
//! use mockdb_engine::{ListQuery, Record};
//! use serde_json::json;
//!
//! let records: Vec<Record> = (1..=5)
//!     .map(|i| Record::from_value(json!({"id": i.to_string(), "n": i})))
//!     .collect();
//!
//! let query = ListQuery::from_params([("_page", "2"), ("_per_page", "2")]);
//! let page = query.execute(&records);
//! assert_eq!(page.total, 5);
//! assert_eq!(page.items.len(), 2);
//! assert!(page.items[0].matches_id("3"));
//! ```

mod filter;
mod page;
mod sort;

pub use filter::{split_key, Filter, FilterClause, Operator};
pub use page::{Page, Pagination, DEFAULT_PAGE, DEFAULT_PER_PAGE};
pub use sort::{SortKey, SortSpec};

use crate::record::Record;

/// Page number control.
pub const PAGE: &str = "_page";
/// Page size control.
pub const PER_PAGE: &str = "_per_page";
/// Legacy page size control, honored only without `_per_page`.
pub const LIMIT: &str = "_limit";
/// Sort fields control.
pub const SORT: &str = "_sort";
/// Legacy sort direction control.
pub const ORDER: &str = "_order";
/// Reserved full-text search control.
pub const SEARCH: &str = "_q";

/// Parsed list request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filter: Filter,
    pub sort: SortSpec,
    pub pagination: Pagination,
    /// Value of `_q`. Accepted but not applied.
    pub search: Option<String>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a first-value-per-key parameter map into filters and controls.
    ///
    /// Keys starting with `_` are controls; unrecognized controls are
    /// ignored. Any other key with a non-empty value becomes a filter clause.
    pub fn from_params<K, V>(params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::default();
        let mut page = None;
        let mut per_page = None;
        let mut limit = None;
        let mut sort = None;
        let mut order = None;

        for (key, value) in params {
            let (key, value) = (key.as_ref(), value.as_ref());
            if value.is_empty() {
                continue;
            }
            match key {
                PAGE => page = Some(value.to_string()),
                PER_PAGE => per_page = Some(value.to_string()),
                LIMIT => limit = Some(value.to_string()),
                SORT => sort = Some(value.to_string()),
                ORDER => order = Some(value.to_string()),
                SEARCH => query.search = Some(value.to_string()),
                k if k.starts_with('_') => {
                    tracing::debug!(control = %k, "ignoring unrecognized control parameter");
                }
                k => query.filter.push(FilterClause::from_param(k, value)),
            }
        }

        query.pagination =
            Pagination::from_controls(page.as_deref(), per_page.as_deref(), limit.as_deref());

        if let Some(sort) = sort {
            let spec = SortSpec::parse(&sort);
            query.sort = match order {
                Some(order) => spec.with_order(&order),
                None => spec,
            };
        }

        query
    }

    pub fn with_filter(mut self, clause: FilterClause) -> Self {
        self.filter.push(clause);
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Run the query over `records`, borrowing the page items.
    pub fn execute<'a>(&self, records: &'a [Record]) -> Page<&'a Record> {
        if self.search.is_some() {
            tracing::debug!("full-text search (_q) is not supported, ignoring");
        }

        let mut matched = self.filter.apply(records);
        let total = matched.len();
        self.sort.sort(&mut matched);

        let window = self.pagination.window(total);
        matched.truncate(window.end);
        let items = matched.split_off(window.start);

        Page {
            items,
            total,
            page: self.pagination.page,
            per_page: self.pagination.per_page,
        }
    }
}
