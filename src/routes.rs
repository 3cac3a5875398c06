//! Router construction: resource routes plus common health/version routes.
//! Paths are parameterized so the handlers resolve the resource type from
//! the segment at request time.

use crate::handlers::{
    collection_delete, collection_replace, collection_update, create, create_by_id, details,
    element_delete, element_replace, element_update, index,
};
use crate::state::AppState;
use axum::{routing::get, Json, Router};
use serde::Serialize;

/// The ten resource routes.
pub fn resource_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/:path_segment",
            get(index)
                .post(create)
                .put(collection_replace)
                .patch(collection_update)
                .delete(collection_delete),
        )
        .route(
            "/:path_segment/:id",
            get(details)
                .post(create_by_id)
                .put(element_replace)
                .patch(element_update)
                .delete(element_delete),
        )
        .with_state(state)
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Common routes (no state): GET /health, GET /version.
pub fn common_routes() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
}
