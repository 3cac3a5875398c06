//! JSON:API SDK: resource document codec and HTTP surface library.

pub mod builder;
pub mod catalog;
pub mod codec;
pub mod controller;
pub mod descriptor;
pub mod document;
pub mod error;
pub mod handlers;
pub mod pagination;
pub mod relationships;
pub mod request;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;

pub use builder::{DocumentBuilder, DEFAULT_PAGE_SIZE};
pub use controller::{DefaultController, JsonApiController};
pub use descriptor::{Registry, ResourceDescriptor};
pub use document::{BuiltDocument, Document, ErrorObject};
pub use error::ApiError;
pub use request::{translate, BulkItem, Translated};
pub use routes::{common_routes, resource_routes};
pub use state::AppState;
pub use store::{InMemoryStore, Related, RelatedResource, Resource, ResourceStore, StoreError};
pub use validation::{Rule, RuleSet, RuleValidator, ValidationEngine};
