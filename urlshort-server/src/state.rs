//! Application state shared across handlers

use std::sync::Arc;

use urlshort_registry::Registry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    registry: Arc<Registry>,
}

impl AppState {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { registry }),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }
}
