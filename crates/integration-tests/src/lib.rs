//! Integration tests for Product Graph.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no external services)
//! cargo test -p product-graph-integration-tests
//!
//! # Tests against PostgreSQL and a running server
//! TEST_DATABASE_URL=postgres://localhost/product_graph_test \
//!     cargo test -p product-graph-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `graphql_api` - GraphQL operations over HTTP against the in-memory store
//! - `health` - Liveness, readiness and the GraphiQL page
//! - `postgres_store` - The `PostgreSQL` backend (ignored by default)
//! - `live_server` - A running server (ignored by default)

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use product_graph_server::db::{DocumentStore, MemoryBackend};
use product_graph_server::routes;
use product_graph_server::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

/// The full router over a fresh in-memory store.
pub struct TestApp {
    router: Router,
    backend: Arc<MemoryBackend>,
}

impl TestApp {
    /// Build the application with an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let backend = Arc::new(MemoryBackend::new());
        let store = DocumentStore::shared(backend.clone());

        Self {
            router: routes::app(AppState::new(store)),
            backend,
        }
    }

    /// The backing store, for inspection and outage simulation.
    #[must_use]
    pub fn backend(&self) -> &MemoryBackend {
        &self.backend
    }

    /// Send a GET request.
    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request");
        self.send(request).await
    }

    /// POST a GraphQL operation with variables.
    pub async fn graphql(&self, query: &str, variables: Value) -> TestResponse {
        let body = json!({ "query": query, "variables": variables });
        let request = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request");
        self.send(request).await
    }

    /// Send an arbitrary request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Parse the body as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("JSON body")
    }

    /// The body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// A response header as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `extensions.code` of the first GraphQL error, if any.
    #[must_use]
    pub fn error_code(&self) -> Option<String> {
        self.json()
            .pointer("/errors/0/extensions/code")
            .and_then(Value::as_str)
            .map(String::from)
    }
}
