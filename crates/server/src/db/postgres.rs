//! `PostgreSQL` document backend.
//!
//! All collections share one table, `documents`, keyed by
//! `(bucket, scope, collection, key)` with a `jsonb` body. Queries are built
//! at runtime so the crate compiles without a live database.

use async_trait::async_trait;
use product_graph_core::{DocumentKey, Keyspace};
use serde_json::Value;
use sqlx::PgPool;
use sqlx::pool::PoolConnection;
use sqlx::types::Json;

use super::StoreError;
use super::store::{Document, DocumentBackend, MutationResult};

/// [`DocumentBackend`] over a shared `PgPool`.
///
/// Each primitive checks one connection out of the pool and returns it when
/// the call finishes, whether it succeeded or not.
#[derive(Debug, Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    /// Create a backend over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn acquire(
        &self,
        key: &DocumentKey,
    ) -> Result<PoolConnection<sqlx::Postgres>, StoreError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| StoreError::classify(e, key))
    }
}

#[async_trait]
impl DocumentBackend for PgBackend {
    async fn get(&self, keyspace: &Keyspace, key: &DocumentKey) -> Result<Document, StoreError> {
        let mut conn = self.acquire(key).await?;

        let row: Option<(Json<Value>, i64)> = sqlx::query_as(
            r"
            SELECT body, cas
            FROM documents
            WHERE bucket = $1 AND scope = $2 AND collection = $3 AND key = $4
            ",
        )
        .bind(keyspace.bucket)
        .bind(keyspace.scope)
        .bind(keyspace.collection)
        .bind(key)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| StoreError::classify(e, key))?;

        row.map(|(Json(body), cas)| Document {
            key: key.clone(),
            body,
            cas,
        })
        .ok_or_else(|| StoreError::NotFound { key: key.clone() })
    }

    async fn insert(
        &self,
        keyspace: &Keyspace,
        key: &DocumentKey,
        body: &Value,
    ) -> Result<MutationResult, StoreError> {
        let mut conn = self.acquire(key).await?;

        let cas: Option<i64> = sqlx::query_scalar(
            r"
            INSERT INTO documents (bucket, scope, collection, key, body)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (bucket, scope, collection, key) DO NOTHING
            RETURNING cas
            ",
        )
        .bind(keyspace.bucket)
        .bind(keyspace.scope)
        .bind(keyspace.collection)
        .bind(key)
        .bind(Json(body))
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| StoreError::classify(e, key))?;

        cas.map(|cas| MutationResult { cas })
            .ok_or_else(|| StoreError::Conflict { key: key.clone() })
    }

    async fn replace(
        &self,
        keyspace: &Keyspace,
        key: &DocumentKey,
        body: &Value,
    ) -> Result<MutationResult, StoreError> {
        let mut conn = self.acquire(key).await?;

        let cas: Option<i64> = sqlx::query_scalar(
            r"
            UPDATE documents
            SET body = $5, cas = cas + 1, updated_at = NOW()
            WHERE bucket = $1 AND scope = $2 AND collection = $3 AND key = $4
            RETURNING cas
            ",
        )
        .bind(keyspace.bucket)
        .bind(keyspace.scope)
        .bind(keyspace.collection)
        .bind(key)
        .bind(Json(body))
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| StoreError::classify(e, key))?;

        cas.map(|cas| MutationResult { cas })
            .ok_or_else(|| StoreError::NotFound { key: key.clone() })
    }

    async fn remove(
        &self,
        keyspace: &Keyspace,
        key: &DocumentKey,
    ) -> Result<MutationResult, StoreError> {
        let mut conn = self.acquire(key).await?;

        let cas: Option<i64> = sqlx::query_scalar(
            r"
            DELETE FROM documents
            WHERE bucket = $1 AND scope = $2 AND collection = $3 AND key = $4
            RETURNING cas
            ",
        )
        .bind(keyspace.bucket)
        .bind(keyspace.scope)
        .bind(keyspace.collection)
        .bind(key)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| StoreError::classify(e, key))?;

        cas.map(|cas| MutationResult { cas })
            .ok_or_else(|| StoreError::NotFound { key: key.clone() })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
