//! Document store handles.
//!
//! [`DocumentStore`] is the process-wide handle created at startup. Resolvers
//! ask it for a [`Collection`], which binds a keyspace to the shared backend
//! and exposes the four key-addressed primitives.

use std::sync::Arc;

use async_trait::async_trait;
use product_graph_core::{DocumentKey, Keyspace};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::PgPool;

use super::{MemoryBackend, PgBackend, StoreError};

/// A document fetched from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Key the document is stored under.
    pub key: DocumentKey,
    /// Stored JSON body.
    pub body: Value,
    /// Mutation counter, bumped by every write.
    pub cas: i64,
}

impl Document {
    /// Decode the body into a typed value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Internal` if the body does not match `T`.
    pub fn content_as<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        T::deserialize(&self.body).map_err(|e| {
            StoreError::Internal(format!("undecodable document {}: {e}", self.key))
        })
    }
}

/// Outcome of a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationResult {
    /// Mutation counter after the write.
    pub cas: i64,
}

/// Storage engine behind a [`DocumentStore`].
///
/// Every method performs exactly one atomic operation on one document.
#[async_trait]
pub trait DocumentBackend: Send + Sync + 'static {
    /// Fetch the document stored under `key`.
    async fn get(&self, keyspace: &Keyspace, key: &DocumentKey) -> Result<Document, StoreError>;

    /// Store `body` under `key`, failing with `Conflict` if the key exists.
    async fn insert(
        &self,
        keyspace: &Keyspace,
        key: &DocumentKey,
        body: &Value,
    ) -> Result<MutationResult, StoreError>;

    /// Overwrite the whole body stored under `key`, failing with `NotFound` if absent.
    async fn replace(
        &self,
        keyspace: &Keyspace,
        key: &DocumentKey,
        body: &Value,
    ) -> Result<MutationResult, StoreError>;

    /// Delete the document stored under `key`, failing with `NotFound` if absent.
    async fn remove(
        &self,
        keyspace: &Keyspace,
        key: &DocumentKey,
    ) -> Result<MutationResult, StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release every resource held by the backend.
    async fn close(&self);

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Process-wide document store handle.
///
/// Cheaply cloneable; all clones share one backend (and its connection pool).
#[derive(Clone)]
pub struct DocumentStore {
    backend: Arc<dyn DocumentBackend>,
}

impl DocumentStore {
    /// Wrap an arbitrary backend.
    #[must_use]
    pub fn new(backend: impl DocumentBackend) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Wrap a backend the caller keeps a handle to.
    #[must_use]
    pub fn shared(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    /// Store backed by a `PostgreSQL` pool.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self::new(PgBackend::new(pool))
    }

    /// Empty process-local store.
    #[must_use]
    pub fn memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Handle to the collection at `keyspace`.
    #[must_use]
    pub fn collection(&self, keyspace: Keyspace) -> Collection {
        Collection {
            backend: Arc::clone(&self.backend),
            keyspace,
        }
    }

    /// Handle to the product collection.
    #[must_use]
    pub fn products(&self) -> Collection {
        self.collection(Keyspace::PRODUCTS)
    }

    /// Check that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the backend cannot be reached.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.backend.ping().await
    }

    /// Close the backend. Further operations fail with `Unavailable`.
    pub async fn close(&self) {
        self.backend.close().await;
    }

    /// Short backend name for logs.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("backend", &self.backend.name())
            .finish()
    }
}

/// Handle to one collection of the document store.
#[derive(Clone)]
pub struct Collection {
    backend: Arc<dyn DocumentBackend>,
    keyspace: Keyspace,
}

impl Collection {
    /// The keyspace this handle addresses.
    #[must_use]
    pub const fn keyspace(&self) -> Keyspace {
        self.keyspace
    }

    /// Fetch the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no document exists under `key`.
    pub async fn get(&self, key: &DocumentKey) -> Result<Document, StoreError> {
        self.backend.get(&self.keyspace, key).await
    }

    /// Insert `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if a document already exists under `key`.
    pub async fn insert<T: Serialize + Sync>(
        &self,
        key: &DocumentKey,
        value: &T,
    ) -> Result<MutationResult, StoreError> {
        let body = encode(key, value)?;
        self.backend.insert(&self.keyspace, key, &body).await
    }

    /// Replace the whole document under `key` with `value`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no document exists under `key`.
    pub async fn replace<T: Serialize + Sync>(
        &self,
        key: &DocumentKey,
        value: &T,
    ) -> Result<MutationResult, StoreError> {
        let body = encode(key, value)?;
        self.backend.replace(&self.keyspace, key, &body).await
    }

    /// Remove the document under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no document exists under `key`.
    pub async fn remove(&self, key: &DocumentKey) -> Result<MutationResult, StoreError> {
        self.backend.remove(&self.keyspace, key).await
    }
}

fn encode<T: Serialize>(key: &DocumentKey, value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value)
        .map_err(|e| StoreError::Internal(format!("unencodable document {key}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use product_graph_core::Product;
    use serde_json::json;

    use super::*;

    fn widget() -> Product {
        Product {
            name: Some("Widget".to_string()),
            price: Some(9.99),
            quantity: Some(10),
            tags: Some(vec![Some("tools".to_string())]),
        }
    }

    #[tokio::test]
    async fn test_typed_round_trip_through_collection() {
        let products = DocumentStore::memory().products();
        let key = DocumentKey::generate();

        products.insert(&key, &widget()).await.unwrap();
        let document = products.get(&key).await.unwrap();

        assert_eq!(document.key, key);
        assert_eq!(document.content_as::<Product>().unwrap(), widget());
    }

    #[tokio::test]
    async fn test_collections_are_isolated_by_keyspace() {
        let store = DocumentStore::memory();
        let other = store.collection(Keyspace::new("store-bucket", "products-scope", "archive"));
        let key = DocumentKey::generate();

        store.products().insert(&key, &widget()).await.unwrap();

        assert!(matches!(
            other.get(&key).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_content_as_reports_undecodable_body() {
        let document = Document {
            key: DocumentKey::parse("bad").unwrap(),
            body: json!({ "quantity": "ten" }),
            cas: 1,
        };
        let err = document.content_as::<Product>().unwrap_err();
        assert!(matches!(err, StoreError::Internal(ref msg) if msg.contains("bad")));
    }

    #[test]
    fn test_debug_names_backend() {
        assert_eq!(
            format!("{:?}", DocumentStore::memory()),
            "DocumentStore { backend: \"memory\" }"
        );
    }
}
