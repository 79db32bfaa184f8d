//! Shared application state injected into every Axum handler.

use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::db::DocumentStore;

/// State shared across all HTTP handlers.
///
/// Built once by `main`; the store handle is never replaced afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Document store every handler reads from and writes to.
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store", &self.store.backend())
            .finish()
    }
}
