//! HTTP handlers: resolve the controller by path segment, translate the
//! body, run the operation, emit the built document.

use crate::document::BuiltDocument;
use crate::error::ApiError;
use crate::request::{self, BulkItem, Translated};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

impl IntoResponse for BuiltDocument {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.document)).into_response()
    }
}

fn resolve(
    state: &AppState,
    path_segment: &str,
) -> Result<Arc<dyn crate::controller::JsonApiController>, ApiError> {
    state
        .controller(path_segment)
        .cloned()
        .ok_or_else(|| ApiError::UnknownType(path_segment.to_string()))
}

/// Path ids that do not parse coerce to 0, which never exists — missing and
/// malformed ids take the same not-found path.
fn parse_id(id: &str) -> i64 {
    id.parse().unwrap_or(0)
}

fn page_param(params: &HashMap<String, String>) -> u32 {
    params
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1)
}

/// Single-resource operations accept only the single body shape; anything
/// else validates as an empty attribute map.
fn single_attrs(body: &Value) -> Map<String, Value> {
    match request::translate(body) {
        Translated::Single { attributes, .. } => attributes,
        _ => Map::new(),
    }
}

/// Collection operations accept only the bulk shape.
fn bulk_items(body: &Value) -> Vec<BulkItem> {
    match request::translate(body) {
        Translated::Bulk(items) => items,
        _ => Vec::new(),
    }
}

pub async fn index(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<BuiltDocument, ApiError> {
    resolve(&state, &path_segment)?.index(page_param(&params)).await
}

pub async fn details(
    State(state): State<AppState>,
    Path((path_segment, id)): Path<(String, String)>,
) -> Result<BuiltDocument, ApiError> {
    resolve(&state, &path_segment)?.details(parse_id(&id)).await
}

pub async fn create(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Json(body): Json<Value>,
) -> Result<BuiltDocument, ApiError> {
    resolve(&state, &path_segment)?.create(single_attrs(&body)).await
}

pub async fn create_by_id(
    State(state): State<AppState>,
    Path((path_segment, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<BuiltDocument, ApiError> {
    resolve(&state, &path_segment)?
        .create_by_id(parse_id(&id), single_attrs(&body))
        .await
}

pub async fn collection_replace(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Json(body): Json<Value>,
) -> Result<BuiltDocument, ApiError> {
    resolve(&state, &path_segment)?
        .collection_replace(bulk_items(&body))
        .await
}

pub async fn element_replace(
    State(state): State<AppState>,
    Path((path_segment, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<BuiltDocument, ApiError> {
    resolve(&state, &path_segment)?
        .element_replace(parse_id(&id), single_attrs(&body))
        .await
}

pub async fn collection_update(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Json(body): Json<Value>,
) -> Result<BuiltDocument, ApiError> {
    resolve(&state, &path_segment)?
        .collection_update(bulk_items(&body))
        .await
}

pub async fn element_update(
    State(state): State<AppState>,
    Path((path_segment, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<BuiltDocument, ApiError> {
    resolve(&state, &path_segment)?
        .element_update(parse_id(&id), single_attrs(&body))
        .await
}

pub async fn collection_delete(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
) -> Result<BuiltDocument, ApiError> {
    resolve(&state, &path_segment)?.collection_delete().await
}

pub async fn element_delete(
    State(state): State<AppState>,
    Path((path_segment, id)): Path<(String, String)>,
) -> Result<BuiltDocument, ApiError> {
    resolve(&state, &path_segment)?.element_delete(parse_id(&id)).await
}
