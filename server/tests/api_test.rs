//! Integration tests for the REST interface.
//!
//! Each test spawns the router on an ephemeral port with a fresh database
//! file and drives it over HTTP.

use mockdb_engine::{RecordService, Store};
use mockdb_server::{create_router, AppState};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

struct TestApp {
    base_url: String,
    db_path: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn spawn_app() -> TestApp {
    spawn_app_with(None).await
}

async fn spawn_app_with(seed: Option<Value>) -> TestApp {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("db.json");
    if let Some(seed) = seed {
        std::fs::write(&db_path, seed.to_string()).unwrap();
    }

    let store = Store::load(&db_path).expect("Failed to load store");
    let app = create_router(AppState::new(RecordService::new(Arc::new(store))));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{}", addr),
        db_path,
        _dir: dir,
    }
}

fn client() -> Client {
    Client::new()
}

async fn create(app: &TestApp, collection: &str, body: Value) -> Value {
    let response = client()
        .post(app.url(&format!("/{}", collection)))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

async fn list(app: &TestApp, path_and_query: &str) -> (usize, Vec<Value>) {
    let response = client().get(app.url(path_and_query)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let total = response.headers()["x-total-count"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    (total, response.json().await.unwrap())
}

fn ids(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| match &item["id"] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

async fn seed_books(app: &TestApp) {
    for book in [
        json!({"title": "Dune", "author": "Herbert", "year": 1965, "price": 9.5}),
        json!({"title": "Emma", "author": "Austen", "year": 1815, "price": 4}),
        json!({"title": "Ubik", "author": "Dick", "year": 1969, "price": 12}),
        json!({"title": "Solaris", "author": "Lem", "year": 1961, "price": 8}),
        json!({"title": "Persuasion", "author": "Austen", "year": 1817, "price": 6}),
    ] {
        create(app, "books", book).await;
    }
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn health_and_root() {
    let app = spawn_app().await;

    let response = client().get(app.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let response = client().get(app.url("/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.text().await.unwrap().is_empty());
}

// ============================================================================
// CRUD
// ============================================================================

#[tokio::test]
async fn create_assigns_sequential_ids() {
    let app = spawn_app().await;

    let first = create(&app, "todos", json!({"title": "a"})).await;
    let second = create(&app, "todos", json!({"title": "b"})).await;

    assert_eq!(first["id"], "1");
    assert_eq!(second["id"], "2");
    assert_eq!(second["title"], "b");
}

#[tokio::test]
async fn create_keeps_supplied_id() {
    let app = spawn_app().await;

    let created = create(&app, "todos", json!({"id": "abc", "title": "a"})).await;
    assert_eq!(created["id"], "abc");

    let next = create(&app, "todos", json!({})).await;
    assert_eq!(next["id"], "1");
}

#[tokio::test]
async fn create_with_invalid_body_stores_empty_record() {
    let app = spawn_app().await;

    let response = client()
        .post(app.url("/notes"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"id": "1"}));
}

#[tokio::test]
async fn get_by_id() {
    let app = spawn_app().await;
    create(&app, "books", json!({"title": "Dune"})).await;

    let response = client().get(app.url("/books/1")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "Dune");

    let response = client().get(app.url("/books/99")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("not found"));

    let response = client().get(app.url("/missing/1")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn numeric_ids_match_path_strings() {
    let app = spawn_app_with(Some(json!({"posts": [{"id": 7, "title": "seeded"}]}))).await;

    let response = client().get(app.url("/posts/7")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let created = create(&app, "posts", json!({})).await;
    assert_eq!(created["id"], "8");
}

#[tokio::test]
async fn create_conflicts_when_generated_ids_run_out() {
    let max = i64::MAX.to_string();
    let app = spawn_app_with(Some(json!({"posts": [{"id": max}]}))).await;

    for _ in 0..2 {
        let response = client()
            .post(app.url("/posts"))
            .json(&json!({"title": "late"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    let (total, _) = list(&app, "/posts").await;
    assert_eq!(total, 1);
}

#[tokio::test]
async fn put_replaces_and_forces_path_id() {
    let app = spawn_app().await;
    create(&app, "books", json!({"title": "Dune", "year": 1965})).await;

    let response = client()
        .put(app.url("/books/1"))
        .json(&json!({"id": "999", "title": "Dune Messiah"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"id": "1", "title": "Dune Messiah"}));

    let response = client().get(app.url("/books/999")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_upserts_into_existing_collection() {
    let app = spawn_app().await;
    create(&app, "books", json!({"title": "Dune"})).await;

    let response = client()
        .put(app.url("/books/42"))
        .json(&json!({"title": "New"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (total, _) = list(&app, "/books").await;
    assert_eq!(total, 2);

    let response = client()
        .put(app.url("/nothing/1"))
        .json(&json!({"title": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_merges_fields() {
    let app = spawn_app().await;
    create(&app, "books", json!({"title": "Dune", "year": 1965})).await;

    let response = client()
        .patch(app.url("/books/1"))
        .json(&json!({"id": "5", "year": 1966, "read": true}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({"id": "1", "title": "Dune", "year": 1966, "read": true})
    );

    let response = client()
        .patch(app.url("/books/2"))
        .json(&json!({"year": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_returns_no_content() {
    let app = spawn_app().await;
    create(&app, "books", json!({"title": "Dune"})).await;

    let response = client().delete(app.url("/books/1")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.text().await.unwrap().is_empty());

    let response = client().delete(app.url("/books/1")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client().delete(app.url("/ghosts/1")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn collection_names_are_case_insensitive() {
    let app = spawn_app().await;
    create(&app, "Books", json!({"title": "Dune"})).await;

    let (total, _) = list(&app, "/BOOKS").await;
    assert_eq!(total, 1);

    let response = client().get(app.url("/bOoKs/1")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn writes_are_persisted_to_disk() {
    let app = spawn_app().await;
    create(&app, "books", json!({"title": "Dune"})).await;

    let on_disk: Value =
        serde_json::from_str(&std::fs::read_to_string(&app.db_path).unwrap()).unwrap();
    assert_eq!(on_disk, json!({"books": [{"id": "1", "title": "Dune"}]}));
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn list_missing_collection_is_empty() {
    let app = spawn_app().await;

    let (total, items) = list(&app, "/nothing").await;
    assert_eq!(total, 0);
    assert!(items.is_empty());
}

#[tokio::test]
async fn list_filters() {
    let app = spawn_app().await;
    seed_books(&app).await;

    let (total, items) = list(&app, "/books?author=Austen").await;
    assert_eq!(total, 2);
    assert_eq!(ids(&items), vec!["2", "5"]);

    let (total, _) = list(&app, "/books?year_gte=1961&year_lt=1969").await;
    assert_eq!(total, 2);

    let (total, items) = list(&app, "/books?title_like=UB").await;
    assert_eq!(total, 1);
    assert_eq!(items[0]["title"], "Ubik");

    let (total, _) = list(&app, "/books?author_ne=Austen").await;
    assert_eq!(total, 3);

    // empty values are ignored
    let (total, _) = list(&app, "/books?author=").await;
    assert_eq!(total, 5);

    // unknown operators are treated as plain fields that never exist
    let (total, _) = list(&app, "/books?price_between=1").await;
    assert_eq!(total, 0);
}

#[tokio::test]
async fn list_sorts() {
    let app = spawn_app().await;
    seed_books(&app).await;

    let (_, items) = list(&app, "/books?_sort=year").await;
    assert_eq!(ids(&items), vec!["2", "5", "4", "1", "3"]);

    let (_, items) = list(&app, "/books?_sort=-price").await;
    assert_eq!(ids(&items), vec!["3", "1", "4", "5", "2"]);

    let (_, items) = list(&app, "/books?_sort=author,-year").await;
    assert_eq!(ids(&items), vec!["5", "2", "3", "1", "4"]);

    let (_, items) = list(&app, "/books?_sort=year&_order=desc").await;
    assert_eq!(ids(&items), vec!["3", "1", "4", "5", "2"]);
}

#[tokio::test]
async fn list_sorts_fields_mixing_numbers_and_text() {
    let app = spawn_app().await;
    for k in 0..66 {
        let n = match k % 3 {
            0 => json!(k),
            1 => json!(k.to_string()),
            _ => json!(format!("{}x", k)),
        };
        create(&app, "items", json!({"n": n})).await;
    }

    let (total, items) = list(&app, "/items?_sort=n&_per_page=100").await;
    assert_eq!(total, 66);
    assert_eq!(items.len(), 66);
}

#[tokio::test]
async fn list_paginates_with_total_count() {
    let app = spawn_app().await;
    for i in 0..25 {
        create(&app, "items", json!({"n": i})).await;
    }

    let (total, items) = list(&app, "/items").await;
    assert_eq!(total, 25);
    assert_eq!(items.len(), 10);

    let (total, items) = list(&app, "/items?_page=3").await;
    assert_eq!(total, 25);
    assert_eq!(ids(&items).first().map(String::as_str), Some("21"));
    assert_eq!(items.len(), 5);

    let (_, items) = list(&app, "/items?_page=2&_per_page=7").await;
    assert_eq!(ids(&items).first().map(String::as_str), Some("8"));
    assert_eq!(items.len(), 7);

    let (_, items) = list(&app, "/items?_limit=3").await;
    assert_eq!(items.len(), 3);

    let (total, items) = list(&app, "/items?_page=9").await;
    assert_eq!(total, 25);
    assert!(items.is_empty());

    // invalid controls fall back to defaults
    let (_, items) = list(&app, "/items?_page=zero&_per_page=-4").await;
    assert_eq!(items.len(), 10);
}

#[tokio::test]
async fn list_links_neighbouring_pages() {
    let app = spawn_app().await;
    for i in 0..25 {
        create(&app, "items", json!({"n": i})).await;
    }

    let response = client()
        .get(app.url("/items?_page=2&n_gte=0"))
        .send()
        .await
        .unwrap();
    let link = response.headers()["link"].to_str().unwrap().to_string();
    assert!(link.contains("</items?n_gte=0&_page=1>; rel=\"first\""));
    assert!(link.contains("</items?n_gte=0&_page=1>; rel=\"prev\""));
    assert!(link.contains("</items?n_gte=0&_page=3>; rel=\"next\""));
    assert!(link.contains("</items?n_gte=0&_page=3>; rel=\"last\""));

    // One page of results: no Link header
    let response = client()
        .get(app.url("/items?_per_page=50"))
        .send()
        .await
        .unwrap();
    assert!(response.headers().get("link").is_none());
}

#[tokio::test]
async fn list_uses_first_value_of_repeated_keys() {
    let app = spawn_app().await;
    seed_books(&app).await;

    let (total, items) = list(&app, "/books?author=Dick&author=Austen").await;
    assert_eq!(total, 1);
    assert_eq!(items[0]["title"], "Ubik");
}

// ============================================================================
// CORS
// ============================================================================

#[tokio::test]
async fn cors_exposes_total_count() {
    let app = spawn_app().await;

    let response = client()
        .get(app.url("/books"))
        .header("origin", "http://example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    let exposed = response.headers()["access-control-expose-headers"]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains("x-total-count"));
}
