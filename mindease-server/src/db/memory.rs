//! Process-local [`DocumentStore`] used for development and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::document::{Direction, Document, Query, StoredDocument};
use super::{DocumentStore, StoreError};

/// Keeps every collection as an insertion-ordered `Vec`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<StoredDocument>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("memory store lock poisoned".to_owned())
}

fn matches_filters(doc: &StoredDocument, query: &Query) -> bool {
    query.filters.iter().all(|filter| {
        doc.fields
            .get(&filter.field)
            .is_some_and(|value| value.matches(&filter.value))
    })
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let mut collections = self.collections.lock().map_err(|_| poisoned())?;
        collections
            .entry(collection.to_owned())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                fields: document,
            });
        Ok(id)
    }

    async fn query(&self, query: &Query) -> Result<Vec<StoredDocument>, StoreError> {
        let collections = self.collections.lock().map_err(|_| poisoned())?;
        let Some(docs) = collections.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<StoredDocument> = docs
            .iter()
            .filter(|doc| matches_filters(doc, query))
            .cloned()
            .collect();
        drop(collections);

        if let Some(order) = &query.order_by {
            hits.retain(|doc| doc.fields.contains_key(&order.field));
            // Ties keep the newest insert first when descending.
            if order.direction == Direction::Descending {
                hits.reverse();
            }
            hits.sort_by(|a, b| {
                let ord = a.fields[&order.field].compare(&b.fields[&order.field]);
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            hits.truncate(limit);
        }
        Ok(hits)
    }
}
