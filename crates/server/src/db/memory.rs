//! Process-local document backend.
//!
//! Used by tests and for running the server without a database
//! (`PRODUCT_GRAPH_STORE=memory`). Contents are lost on restart.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use product_graph_core::{DocumentKey, Keyspace};
use serde_json::Value;
use tokio::sync::RwLock;

use super::StoreError;
use super::store::{Document, DocumentBackend, MutationResult};

#[derive(Debug)]
struct Stored {
    body: Value,
    cas: i64,
}

/// In-memory [`DocumentBackend`].
///
/// A single write lock serializes mutations, giving the same per-key
/// atomicity as the database backend.
#[derive(Debug)]
pub struct MemoryBackend {
    documents: RwLock<HashMap<(Keyspace, DocumentKey), Stored>>,
    available: AtomicBool,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate an outage: while unavailable every operation fails with
    /// `StoreError::Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of documents across all keyspaces.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the backend holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn get(&self, keyspace: &Keyspace, key: &DocumentKey) -> Result<Document, StoreError> {
        self.check_available()?;
        let documents = self.documents.read().await;
        documents
            .get(&(*keyspace, key.clone()))
            .map(|stored| Document {
                key: key.clone(),
                body: stored.body.clone(),
                cas: stored.cas,
            })
            .ok_or_else(|| StoreError::NotFound { key: key.clone() })
    }

    async fn insert(
        &self,
        keyspace: &Keyspace,
        key: &DocumentKey,
        body: &Value,
    ) -> Result<MutationResult, StoreError> {
        self.check_available()?;
        let mut documents = self.documents.write().await;
        let slot = (*keyspace, key.clone());
        if documents.contains_key(&slot) {
            return Err(StoreError::Conflict { key: key.clone() });
        }
        documents.insert(
            slot,
            Stored {
                body: body.clone(),
                cas: 1,
            },
        );
        Ok(MutationResult { cas: 1 })
    }

    async fn replace(
        &self,
        keyspace: &Keyspace,
        key: &DocumentKey,
        body: &Value,
    ) -> Result<MutationResult, StoreError> {
        self.check_available()?;
        let mut documents = self.documents.write().await;
        let stored = documents
            .get_mut(&(*keyspace, key.clone()))
            .ok_or_else(|| StoreError::NotFound { key: key.clone() })?;
        stored.body = body.clone();
        stored.cas += 1;
        Ok(MutationResult { cas: stored.cas })
    }

    async fn remove(
        &self,
        keyspace: &Keyspace,
        key: &DocumentKey,
    ) -> Result<MutationResult, StoreError> {
        self.check_available()?;
        let mut documents = self.documents.write().await;
        documents
            .remove(&(*keyspace, key.clone()))
            .map(|stored| MutationResult { cas: stored.cas })
            .ok_or_else(|| StoreError::NotFound { key: key.clone() })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }

    async fn close(&self) {
        self.set_available(false);
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    const KS: Keyspace = Keyspace::PRODUCTS;

    #[tokio::test]
    async fn test_insert_then_get() {
        let backend = MemoryBackend::new();
        let key = DocumentKey::generate();

        let result = backend.insert(&KS, &key, &json!({"name": "Widget"})).await.unwrap();
        assert_eq!(result.cas, 1);

        let document = backend.get(&KS, &key).await.unwrap();
        assert_eq!(document.body, json!({"name": "Widget"}));
        assert_eq!(document.cas, 1);
    }

    #[tokio::test]
    async fn test_insert_existing_key_conflicts() {
        let backend = MemoryBackend::new();
        let key = DocumentKey::generate();

        backend.insert(&KS, &key, &json!({"name": "first"})).await.unwrap();
        let err = backend
            .insert(&KS, &key, &json!({"name": "second"}))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Conflict { .. }));
        // The original document is untouched
        let document = backend.get(&KS, &key).await.unwrap();
        assert_eq!(document.body, json!({"name": "first"}));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let backend = MemoryBackend::new();
        let key = DocumentKey::generate();
        assert!(matches!(
            backend.get(&KS, &key).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_replace_overwrites_whole_body() {
        let backend = MemoryBackend::new();
        let key = DocumentKey::generate();

        backend
            .insert(&KS, &key, &json!({"name": "Widget", "price": 9.99}))
            .await
            .unwrap();
        let result = backend
            .replace(&KS, &key, &json!({"quantity": 3}))
            .await
            .unwrap();
        assert_eq!(result.cas, 2);

        let document = backend.get(&KS, &key).await.unwrap();
        assert_eq!(document.body, json!({"quantity": 3}));
    }

    #[tokio::test]
    async fn test_replace_missing_is_not_found() {
        let backend = MemoryBackend::new();
        let key = DocumentKey::generate();
        let err = backend.replace(&KS, &key, &json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove() {
        let backend = MemoryBackend::new();
        let key = DocumentKey::generate();

        backend.insert(&KS, &key, &json!({})).await.unwrap();
        backend.remove(&KS, &key).await.unwrap();

        assert!(backend.is_empty().await);
        assert!(matches!(
            backend.remove(&KS, &key).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_offline_backend_is_unavailable() {
        let backend = MemoryBackend::new();
        let key = DocumentKey::generate();

        backend.set_available(false);
        assert!(matches!(
            backend.insert(&KS, &key, &json!({})).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(backend.ping().await.is_err());

        backend.set_available(true);
        assert!(backend.ping().await.is_ok());
        assert_eq!(backend.len().await, 0);
    }

    #[tokio::test]
    async fn test_close_takes_backend_offline() {
        let backend = MemoryBackend::new();
        backend.close().await;
        assert!(matches!(backend.ping().await, Err(StoreError::Unavailable(_))));
    }
}
