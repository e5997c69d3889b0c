//! Record handlers - bridge async requests onto the synchronous engine.
//!
//! The engine holds a blocking lock and writes the database file on every
//! mutation, so each call runs on the blocking thread pool.

use crate::error::{AppError, Result};
use mockdb_engine::query::PAGE;
use mockdb_engine::{Error, ListQuery, Page, Record, RecordService};
use serde_json::Value;
use std::collections::HashMap;

/// Reduce a raw query string to its first value per key.
pub fn first_values(pairs: Vec<(String, String)>) -> HashMap<String, String> {
    let mut params = HashMap::with_capacity(pairs.len());
    for (key, value) in pairs {
        params.entry(key).or_insert(value);
    }
    params
}

/// Decode a request body leniently.
///
/// Anything that is not a JSON object becomes an empty record.
pub fn decode_body(bytes: &[u8]) -> Record {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => Record::from_value(value),
        Err(e) => {
            if !bytes.is_empty() {
                tracing::debug!("Ignoring undecodable request body: {}", e);
            }
            Record::new()
        }
    }
}

/// Build a `Link` header value (`first`, `prev`, `next`, `last`) for a list
/// read that spans more than one page.
///
/// The request's own query string is kept as sent, with `_page` replaced.
pub fn page_links<T>(path: &str, raw_query: Option<&str>, page: &Page<T>) -> Option<String> {
    let last = page.pages();
    if last <= 1 {
        return None;
    }

    let kept: Vec<&str> = raw_query
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty() && pair.split('=').next() != Some(PAGE))
        .collect();

    let link = |number: usize, rel: &str| {
        let target = format!("{}={}", PAGE, number);
        let query = kept
            .iter()
            .copied()
            .chain(std::iter::once(target.as_str()))
            .collect::<Vec<_>>()
            .join("&");
        format!("<{}?{}>; rel=\"{}\"", path, query, rel)
    };

    let mut links = vec![link(1, "first")];
    if let Some(prev) = page.prev_page() {
        links.push(link(prev, "prev"));
    }
    if let Some(next) = page.next_page() {
        links.push(link(next, "next"));
    }
    links.push(link(last, "last"));
    Some(links.join(", "))
}

/// List a collection.
pub async fn handle_list(
    service: &RecordService,
    collection: String,
    params: HashMap<String, String>,
) -> Result<Page<Record>> {
    let service = service.clone();
    let query = ListQuery::from_params(params);
    let page = tokio::task::spawn_blocking(move || service.get_all(&collection, &query)).await?;
    Ok(page)
}

/// Fetch one record.
pub async fn handle_get(service: &RecordService, collection: String, id: String) -> Result<Record> {
    let service = service.clone();
    tokio::task::spawn_blocking(move || {
        service
            .get_by_id(&collection, &id)
            .ok_or(AppError::Engine(Error::EntryNotFound(id)))
    })
    .await?
}

/// Create a record.
pub async fn handle_create(
    service: &RecordService,
    collection: String,
    body: Record,
) -> Result<Record> {
    let service = service.clone();
    let record = tokio::task::spawn_blocking(move || service.create(&collection, body)).await??;
    tracing::info!("Created record {:?}", record.id_string());
    Ok(record)
}

/// Replace (or insert) a record under a fixed id.
pub async fn handle_replace(
    service: &RecordService,
    collection: String,
    id: String,
    body: Record,
) -> Result<Record> {
    let service = service.clone();
    let record =
        tokio::task::spawn_blocking(move || service.replace(&collection, &id, body)).await??;
    Ok(record)
}

/// Merge fields into an existing record.
pub async fn handle_update(
    service: &RecordService,
    collection: String,
    id: String,
    body: Record,
) -> Result<Record> {
    let service = service.clone();
    let record =
        tokio::task::spawn_blocking(move || service.update(&collection, &id, &body)).await??;
    Ok(record)
}

/// Delete a record.
pub async fn handle_delete(service: &RecordService, collection: String, id: String) -> Result<()> {
    let service = service.clone();
    let removed = tokio::task::spawn_blocking(move || service.delete(&collection, &id)).await??;
    tracing::info!("Deleted record {:?}", removed.id_string());
    Ok(())
}
