//! Collection endpoint routes.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, header::HeaderName, HeaderMap, HeaderValue, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use mockdb_engine::Record;

use crate::error::Result;
use crate::handlers::{
    decode_body, first_values, handle_create, handle_delete, handle_get, handle_list,
    handle_replace, handle_update, page_links,
};
use crate::AppState;

/// Header carrying the filtered (pre-pagination) match count of a list read.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Create collection routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{name}", get(list_handler).post(create_handler))
        .route(
            "/{name}/{id}",
            get(get_handler)
                .put(replace_handler)
                .patch(update_handler)
                .delete(delete_handler),
        )
}

/// GET /{name} - Filtered, sorted, paginated list.
///
/// `X-Total-Count` carries the match count; `Link` points at the first,
/// previous, next and last pages when there is more than one.
async fn list_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    uri: Uri,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse> {
    let page = handle_list(&state.service, name, first_values(pairs)).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(TOTAL_COUNT_HEADER),
        HeaderValue::from(page.total),
    );
    if let Some(links) = page_links(uri.path(), uri.query(), &page) {
        match HeaderValue::from_str(&links) {
            Ok(value) => {
                headers.insert(header::LINK, value);
            }
            Err(e) => tracing::debug!("Skipping Link header: {}", e),
        }
    }

    Ok((headers, Json(page.items)))
}

/// GET /{name}/{id} - Fetch one record.
async fn get_handler(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Json<Record>> {
    let record = handle_get(&state.service, name, id).await?;
    Ok(Json(record))
}

/// POST /{name} - Create a record.
async fn create_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Record>)> {
    let record = handle_create(&state.service, name, decode_body(&body)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /{name}/{id} - Replace or insert a record.
async fn replace_handler(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Record>> {
    let record = handle_replace(&state.service, name, id, decode_body(&body)).await?;
    Ok(Json(record))
}

/// PATCH /{name}/{id} - Merge fields into a record.
async fn update_handler(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Record>> {
    let record = handle_update(&state.service, name, id, decode_body(&body)).await?;
    Ok(Json(record))
}

/// DELETE /{name}/{id} - Delete a record.
async fn delete_handler(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> Result<StatusCode> {
    handle_delete(&state.service, name, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
