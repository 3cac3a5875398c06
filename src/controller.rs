//! Per-resource-type operation interface.
//!
//! Every operation defaults to the static 501 document, so a resource type
//! only overrides what it actually exposes; `DefaultController` wires all
//! ten operations to a `DocumentBuilder` for the common full-CRUD case.

use crate::builder::DocumentBuilder;
use crate::catalog;
use crate::document::BuiltDocument;
use crate::error::ApiError;
use crate::request::BulkItem;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// The ten operations of the JSON:API surface. Default bodies answer 501 so
/// unimplemented operations still return useful, well-formed documents.
#[async_trait]
pub trait JsonApiController: Send + Sync {
    async fn index(&self, _page: u32) -> Result<BuiltDocument, ApiError> {
        Ok(catalog::not_implemented())
    }

    async fn details(&self, _id: i64) -> Result<BuiltDocument, ApiError> {
        Ok(catalog::not_implemented())
    }

    async fn create(&self, _attrs: Map<String, Value>) -> Result<BuiltDocument, ApiError> {
        Ok(catalog::not_implemented())
    }

    async fn create_by_id(
        &self,
        _id: i64,
        _attrs: Map<String, Value>,
    ) -> Result<BuiltDocument, ApiError> {
        Ok(catalog::not_implemented())
    }

    async fn collection_replace(
        &self,
        _items: Vec<BulkItem>,
    ) -> Result<BuiltDocument, ApiError> {
        Ok(catalog::not_implemented())
    }

    async fn element_replace(
        &self,
        _id: i64,
        _attrs: Map<String, Value>,
    ) -> Result<BuiltDocument, ApiError> {
        Ok(catalog::not_implemented())
    }

    async fn collection_update(
        &self,
        _items: Vec<BulkItem>,
    ) -> Result<BuiltDocument, ApiError> {
        Ok(catalog::not_implemented())
    }

    async fn element_update(
        &self,
        _id: i64,
        _attrs: Map<String, Value>,
    ) -> Result<BuiltDocument, ApiError> {
        Ok(catalog::not_implemented())
    }

    async fn collection_delete(&self) -> Result<BuiltDocument, ApiError> {
        Ok(catalog::not_implemented())
    }

    async fn element_delete(&self, _id: i64) -> Result<BuiltDocument, ApiError> {
        Ok(catalog::not_implemented())
    }
}

/// Full-CRUD controller: every operation delegates to the builder.
pub struct DefaultController {
    builder: DocumentBuilder,
}

impl DefaultController {
    pub fn new(builder: DocumentBuilder) -> Self {
        DefaultController { builder }
    }
}

#[async_trait]
impl JsonApiController for DefaultController {
    async fn index(&self, page: u32) -> Result<BuiltDocument, ApiError> {
        self.builder.index(page).await
    }

    async fn details(&self, id: i64) -> Result<BuiltDocument, ApiError> {
        self.builder.details(id).await
    }

    async fn create(&self, attrs: Map<String, Value>) -> Result<BuiltDocument, ApiError> {
        self.builder.create(attrs).await
    }

    async fn create_by_id(
        &self,
        id: i64,
        attrs: Map<String, Value>,
    ) -> Result<BuiltDocument, ApiError> {
        self.builder.create_by_id(id, attrs).await
    }

    async fn collection_replace(
        &self,
        items: Vec<BulkItem>,
    ) -> Result<BuiltDocument, ApiError> {
        self.builder.collection_replace(items).await
    }

    async fn element_replace(
        &self,
        id: i64,
        attrs: Map<String, Value>,
    ) -> Result<BuiltDocument, ApiError> {
        self.builder.element_replace(id, attrs).await
    }

    async fn collection_update(
        &self,
        items: Vec<BulkItem>,
    ) -> Result<BuiltDocument, ApiError> {
        self.builder.collection_update(items).await
    }

    async fn element_update(
        &self,
        id: i64,
        attrs: Map<String, Value>,
    ) -> Result<BuiltDocument, ApiError> {
        self.builder.element_update(id, attrs).await
    }

    async fn collection_delete(&self) -> Result<BuiltDocument, ApiError> {
        self.builder.collection_delete().await
    }

    async fn element_delete(&self, id: i64) -> Result<BuiltDocument, ApiError> {
        self.builder.element_delete(id).await
    }
}
