//! Typed errors and HTTP mapping.
//!
//! Anything that escapes an operation is converted into a well-formed
//! JSON:API error document here; no failure propagates to the transport
//! layer as an unhandled fault.

use crate::document::{Document, ErrorObject, Meta};
use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("unknown resource type: {0}")]
    UnknownType(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, title) = match &self {
            ApiError::UnknownType(_) => (StatusCode::NOT_FOUND, "Resource could not found"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        };
        let document = Document {
            errors: Some(vec![ErrorObject {
                status: status.as_u16().to_string(),
                title: title.to_string(),
                detail: self.to_string(),
                data: None,
            }]),
            meta: Some(Meta::with_status(&status.as_u16().to_string())),
            ..Document::default()
        };
        (status, Json(document)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_maps_to_404() {
        let response = ApiError::UnknownType("gadgets".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_errors_map_to_500() {
        let response = ApiError::Store(StoreError::Backend("down".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
