use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, Query, State},
    Json,
    http::StatusCode,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use crate::item::{ItemPatch, TodoItem};
use crate::server::AppState;
use crate::server::error::ApiError;
use crate::storage::page::{Page, DEFAULT_LIMIT};

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub status: &'static str,
}

/// Parse a route id: ASCII digits only, positive, fits in an i64.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::bad_request("invalid id"));
    }
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request("invalid id"))
}

/// Id from the route segment; a segment axum can't decode is an invalid id
fn route_id(path: Result<Path<String>, PathRejection>) -> Result<i64, ApiError> {
    let Path(raw) = path.map_err(|e| {
        tracing::debug!("Rejected id segment: {}", e);
        ApiError::bad_request("invalid id")
    })?;
    parse_id(&raw)
}

/// Read an integer query parameter, falling back to `default` when it is
/// missing or malformed.
fn query_int(params: &HashMap<String, String>, key: &str, default: i64) -> i64 {
    params
        .get(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_json(body: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Rejected request body: {}", e);
        ApiError::bad_request("invalid json")
    })
}

pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<TodoItem>>, ApiError> {
    let page = Page::new(
        query_int(&params, "limit", DEFAULT_LIMIT),
        query_int(&params, "offset", 0),
    );

    let items = state.store
        .with_store(move |store| store.list(page))
        .await
        .map_err(|e| ApiError::from_store(e, "db list error"))?;

    Ok(Json(items))
}

pub async fn create_item(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<TodoItem>), ApiError> {
    let body = parse_json(&body)?;
    let text = body
        .get("text")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| ApiError::bad_request("missing text"))?;

    let created = state.store
        .with_store(move |store| store.create(&text))
        .await
        .map_err(|e| {
            tracing::error!("db create error: {}", e);
            ApiError::internal("db create error")
        })?;

    tracing::debug!("Created item {}", created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_item(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<Json<TodoItem>, ApiError> {
    let id = route_id(path)?;
    let patch = ItemPatch::from_json(&parse_json(&body)?);

    let updated = state.store
        .with_store(move |store| store.update(id, &patch))
        .await
        .map_err(|e| {
            tracing::debug!("Update of item {} failed: {}", id, e);
            ApiError::not_found("not found or update failed")
        })?;

    Ok(Json(updated))
}

pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = route_id(path)?;

    let removed = state.store
        .with_store(move |store| store.delete(id))
        .await
        .map_err(|e| {
            tracing::error!("Delete of item {} failed: {}", id, e);
            ApiError::not_found("not found")
        })?;

    if removed == 0 {
        tracing::debug!("Delete of item {} matched no rows", id);
    }
    Ok(Json(DeleteResponse { status: "deleted" }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("not found")
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}
