//! mockdb Server - REST interface over the mockdb engine.
//!
//! Any path segment names a collection: `GET /books` lists, `POST /books`
//! creates and `/books/{id}` addresses a single record. Collections need no
//! declaration and are created on first write.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;

use axum::http::{header, HeaderName, Method};
use axum::Router;
use mockdb_engine::RecordService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: RecordService,
}

impl AppState {
    pub fn new(service: RecordService) -> Self {
        Self { service }
    }
}

/// Build the application router with tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE])
                .expose_headers([
                    HeaderName::from_static(routes::TOTAL_COUNT_HEADER),
                    header::LINK,
                ]),
        )
        .with_state(state)
}
