//! Unified error handling with Sentry integration.
//!
//! Provides a unified `ApiError` type. Resolvers convert it into a GraphQL
//! error with a stable `extensions.code`; plain HTTP handlers turn it into a
//! status code. Server-side failures are captured to Sentry before the client
//! sees a sanitized message.

use async_graphql::ErrorExtensions;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use product_graph_core::KeyError;
use thiserror::Error;

use crate::db::StoreError;

/// Application-level error type for the GraphQL API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Document store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A nullable argument the operation cannot work without was omitted.
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    /// The supplied id cannot be a document key.
    #[error("invalid id: {0}")]
    InvalidId(#[from] KeyError),
}

impl ApiError {
    /// GraphQL `extensions.code` for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Store(StoreError::NotFound { .. }) => "NOT_FOUND",
            Self::Store(StoreError::Conflict { .. }) => "CONFLICT",
            Self::Store(StoreError::Unavailable(_)) => "UNAVAILABLE",
            Self::Store(StoreError::Internal(_)) => "INTERNAL",
            Self::MissingArgument(_) | Self::InvalidId(_) => "BAD_USER_INPUT",
        }
    }

    /// Stable machine-readable name of the failure, for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Store(err) => err.kind(),
            Self::MissingArgument(_) => "missing_argument",
            Self::InvalidId(_) => "invalid_id",
        }
    }

    /// Whether the failure is on our side rather than the caller's.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::Unavailable(_) | StoreError::Internal(_))
        )
    }

    /// Message safe to show to clients.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Store(StoreError::Unavailable(_)) => {
                "Document store temporarily unavailable".to_string()
            }
            Self::Store(StoreError::Internal(_)) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Log the error (and capture server errors to Sentry), then convert it
    /// into the GraphQL error returned for `operation`.
    #[must_use]
    pub fn into_graphql(self, operation: &'static str, request_id: &str) -> async_graphql::Error {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                operation,
                request_id,
                error = %self,
                code = self.code(),
                error_kind = self.kind(),
                sentry_event_id = %event_id,
                "Resolver error"
            );
        } else {
            tracing::warn!(
                operation,
                request_id,
                error = %self,
                code = self.code(),
                error_kind = self.kind(),
                "Resolver error"
            );
        }

        self.extend()
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.client_message()).extend_with(|_, e| e.set("code", self.code()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
            Self::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(StoreError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingArgument(_) | Self::InvalidId(_) => StatusCode::BAD_REQUEST,
        };

        (status, self.client_message()).into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;
