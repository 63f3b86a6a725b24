//! Document store access.
//!
//! # Keyspaces
//!
//! Documents are addressed by `(bucket, scope, collection, key)`. The server
//! only ever touches [`Keyspace::PRODUCTS`](product_graph_core::Keyspace::PRODUCTS).
//!
//! # Backends
//!
//! - [`postgres::PgBackend`] - `documents` table with a `jsonb` body
//! - [`memory::MemoryBackend`] - process-local map for tests and local development
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p product-graph-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;
pub mod store;

use std::str::FromStr;

use product_graph_core::DocumentKey;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;

use crate::config::DatabaseConfig;

pub use memory::MemoryBackend;
pub use postgres::PgBackend;
pub use store::{Collection, Document, DocumentBackend, DocumentStore, MutationResult};

/// Classified document store failure.
///
/// Driver errors never leave the db layer unclassified.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document exists under the key.
    #[error("document not found: {key}")]
    NotFound { key: DocumentKey },

    /// A document already exists under the key.
    #[error("document already exists: {key}")]
    Conflict { key: DocumentKey },

    /// The store could not be reached or the pool is exhausted.
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// Any other failure, including bodies that cannot be decoded.
    #[error("document store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Map a driver error raised while operating on `key`.
    #[must_use]
    pub fn classify(err: sqlx::Error, key: &DocumentKey) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound { key: key.clone() },
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                Self::Conflict { key: key.clone() }
            }
            sqlx::Error::Database(ref db_err) if is_connection_state(db_err.code().as_deref()) => {
                Self::Unavailable(err.to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Unavailable(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }

    /// Stable machine-readable name of the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Unavailable(_) => "unavailable",
            Self::Internal(_) => "internal",
        }
    }
}

/// SQLSTATE raised when `statement_timeout` cancels a statement.
const QUERY_CANCELED: &str = "57014";

/// SQLSTATE classes that mean the server, not the statement, is the problem:
/// 08 connection exception, 53 insufficient resources, 57P operator intervention,
/// plus statements cancelled by the profile's statement timeout.
fn is_connection_state(code: Option<&str>) -> bool {
    code.is_some_and(|c| {
        c.starts_with("08") || c.starts_with("53") || c.starts_with("57P") || c == QUERY_CANCELED
    })
}

/// Create a `PostgreSQL` connection pool tuned by the configured profile.
///
/// The pool is created once at startup and shared by every request; each
/// store primitive checks a connection out for the duration of that call.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection string is invalid or the
/// connection cannot be established.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let mut options = PgConnectOptions::from_str(config.url.expose_secret())?;
    if let Some(username) = &config.username {
        options = options.username(username);
    }
    if let Some(password) = &config.password {
        options = options.password(password.expose_secret());
    }
    let statement_timeout_ms = config.profile.statement_timeout().as_millis();
    options = options.options([("statement_timeout", statement_timeout_ms.to_string())]);

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.max_connections.min(2))
        .acquire_timeout(config.profile.acquire_timeout())
        .connect_with(options)
        .await
}
