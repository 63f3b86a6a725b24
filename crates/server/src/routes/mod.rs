//! HTTP routes.
//!
//! # Route Structure
//!
//! ```text
//! POST /graphql        - GraphQL queries and mutations
//! GET  /graphql        - GraphiQL explorer
//! GET  /health         - Liveness check
//! GET  /health/ready   - Readiness check (pings the document store)
//! ```

pub mod graphql;
pub mod health;

use axum::{Router, body::Body, http::Request, routing::get};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Build the application router with its middleware stack.
///
/// Sentry layers are added by the binary so tests can build the router
/// without an initialized Sentry client.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/graphql", get(graphql::graphiql).post(graphql::graphql))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
