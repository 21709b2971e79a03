use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::store::{Collection, DocumentStore};

/// Process-local store used for development and tests.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, BTreeMap<String, Value>>>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(anyhow!("Memory store is closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(&self, collection: Collection, key: &str) -> Result<Option<Value>> {
        self.ensure_open()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    async fn find(&self, collection: Collection) -> Result<Vec<Value>> {
        self.ensure_open()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn save(&self, collection: Collection, key: &str, document: Value) -> Result<()> {
        self.ensure_open()?;
        debug!("Saving {} document {}", collection, key);
        let mut collections = self.collections.write().await;
        collections
            .entry(collection)
            .or_default()
            .insert(key.to_string(), document);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_document_is_none() {
        let store = MemoryStore::new();
        let doc = store.find_one(Collection::UniversalTimeslots, "2025-06-10").await.unwrap();
        assert!(doc.is_none());
        assert!(store.find(Collection::Therapists).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_replaces_whole_document() {
        let store = MemoryStore::new();
        store
            .save(Collection::UniversalTimeslots, "2025-06-10", json!({"date": "2025-06-10", "slots": [1, 2]}))
            .await
            .unwrap();
        store
            .save(Collection::UniversalTimeslots, "2025-06-10", json!({"date": "2025-06-10"}))
            .await
            .unwrap();

        let doc = store.find_one(Collection::UniversalTimeslots, "2025-06-10").await.unwrap().unwrap();
        assert_eq!(doc, json!({"date": "2025-06-10"}));
        assert_eq!(store.find(Collection::UniversalTimeslots).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_closed_store_rejects_calls() {
        let store = MemoryStore::new();
        store.close().await.unwrap();
        assert!(store.find(Collection::Bookings).await.is_err());
        assert!(store.save(Collection::Bookings, "b1", json!({})).await.is_err());
    }
}
