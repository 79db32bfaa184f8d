//! Document store abstraction layer.
//!
//! [`DocumentStore`] is the single seam between the HTTP handlers and
//! persistence. The production implementation is
//! [`firestore::FirestoreStore`]; [`sqlite::SqliteStore`] and
//! [`memory::MemoryStore`] serve local development and tests. The concrete
//! store is chosen once by [`connect`] and shared as `Arc<dyn DocumentStore>`
//! through [`crate::state::AppState`].

pub mod document;
pub mod firestore;
pub mod memory;
pub mod sqlite;
pub mod unavailable;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

pub use document::{Direction, Document, FieldValue, Query, StoredDocument};

use crate::config::{Config, StoreBackend};
use firestore::FirestoreStore;
use memory::MemoryStore;
use sqlite::SqliteStore;
use unavailable::UnavailableStore;

/// Every failure a store backend can report.
///
/// The `Display` text is what callers see in a 500 response.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The service credential could not be loaded or exchanged for a token.
    #[error("credentials error: {0}")]
    Credentials(String),

    /// The HTTP request to the store never produced a response.
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("store returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A stored document or store response could not be interpreted.
    #[error("malformed document: {0}")]
    Decode(String),

    /// The query cannot be expressed by this backend.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The store failed to initialise at startup (degraded mode).
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

/// A schemaless collection-of-documents store.
///
/// Every call is a single best-effort attempt: implementations do not retry
/// and do not deduplicate.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Short backend name for logs and `/health`.
    fn backend(&self) -> &'static str;

    /// Persist `document` under a store-generated id and return that id.
    async fn create(&self, collection: &str, document: Document) -> Result<String, StoreError>;

    /// Run a structured query.
    async fn query(&self, query: &Query) -> Result<Vec<StoredDocument>, StoreError>;
}

/// Build the store selected by `cfg.store`.
///
/// When initialisation fails and `cfg.allow_degraded_start` is set, the error
/// is logged and an [`UnavailableStore`] carrying it is returned instead, so
/// the server starts and every store call reports the failure.
pub async fn connect(cfg: &Config) -> Result<Arc<dyn DocumentStore>, StoreError> {
    let result: Result<Arc<dyn DocumentStore>, StoreError> = match cfg.store {
        StoreBackend::Firestore => FirestoreStore::from_config(cfg)
            .await
            .map(|s| Arc::new(s) as Arc<dyn DocumentStore>),
        StoreBackend::Sqlite => SqliteStore::connect(&cfg.database_url)
            .await
            .map(|s| Arc::new(s) as Arc<dyn DocumentStore>),
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    };

    match result {
        Ok(store) => Ok(store),
        Err(e) if cfg.allow_degraded_start => {
            warn!(
                backend = %cfg.store,
                error = %e,
                "document store initialisation failed; serving in degraded mode"
            );
            Ok(Arc::new(UnavailableStore::new(e.to_string())))
        }
        Err(e) => Err(e),
    }
}
