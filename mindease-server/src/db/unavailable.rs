//! Placeholder store installed when startup initialisation failed and the
//! server was allowed to start anyway.

use async_trait::async_trait;

use super::document::{Document, Query, StoredDocument};
use super::{DocumentStore, StoreError};

#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl DocumentStore for UnavailableStore {
    fn backend(&self) -> &'static str {
        "unavailable"
    }

    async fn create(&self, _collection: &str, _document: Document) -> Result<String, StoreError> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }

    async fn query(&self, _query: &Query) -> Result<Vec<StoredDocument>, StoreError> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }
}
