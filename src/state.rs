//! Shared application state for all routes.

use crate::controller::JsonApiController;
use std::collections::HashMap;
use std::sync::Arc;

/// Controllers keyed by plural type name (the URL path segment). Built once
/// at startup; read-only afterwards.
#[derive(Clone, Default)]
pub struct AppState {
    controllers: Arc<HashMap<String, Arc<dyn JsonApiController>>>,
}

impl AppState {
    pub fn new(controllers: HashMap<String, Arc<dyn JsonApiController>>) -> Self {
        AppState {
            controllers: Arc::new(controllers),
        }
    }

    pub fn controller(&self, path_segment: &str) -> Option<&Arc<dyn JsonApiController>> {
        self.controllers.get(path_segment)
    }
}
