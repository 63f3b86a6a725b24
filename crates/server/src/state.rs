//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::DocumentStore;
use crate::graphql::{ProductSchema, build_schema};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// document store and the executable schema.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: DocumentStore,
    schema: ProductSchema,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The schema is built once here and shared by every request.
    #[must_use]
    pub fn new(store: DocumentStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                schema: build_schema(),
            }),
        }
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        &self.inner.store
    }

    /// Get a reference to the executable GraphQL schema.
    #[must_use]
    pub fn schema(&self) -> &ProductSchema {
        &self.inner.schema
    }
}
