//! Product Graph Server - GraphQL API over the product document collection.
//!
//! Startup order: configuration, Sentry, tracing, document store, listener.
//! The store is opened before the listener binds and closed only after the
//! server has drained in-flight requests.
//!
//! Migrations are never applied here; run `pg-cli migrate` first.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::borrow::Cow;
use std::process::ExitCode;

use product_graph_server::config::{ConfigError, ServerConfig, StoreConfig};
use product_graph_server::db::{self, DocumentStore};
use product_graph_server::routes;
use product_graph_server::state::AppState;
use sentry::integrations::tracing::{self as sentry_tracing, EventFilter};
use thiserror::Error;
use tracing::{Level, Metadata};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "product_graph_server=info,tower_http=debug";

/// Failures that stop the server from starting or serving.
#[derive(Debug, Error)]
enum StartupError {
    #[error("failed to open document store: {0}")]
    Store(#[from] sqlx::Error),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => return config_failure(&e),
    };

    // Sentry goes first so the tracing layer below reports to a live client
    let _sentry = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: config.sentry_environment.clone().map(Cow::Owned),
                traces_sample_rate: config.sentry_traces_sample_rate,
                attach_stacktrace: true,
                ..Default::default()
            },
        ))
    });

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_filter))
        .init();

    if config.sentry_dsn.is_some() {
        tracing::info!("Sentry initialized");
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(serve(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server stopped");
            ExitCode::FAILURE
        }
    }
}

/// Report a configuration error before logging is set up.
#[allow(clippy::print_stderr)]
fn config_failure(err: &ConfigError) -> ExitCode {
    eprintln!("configuration error: {err}");
    ExitCode::FAILURE
}

/// Warnings and errors become Sentry events; info and debug become breadcrumbs.
fn sentry_filter(metadata: &Metadata<'_>) -> EventFilter {
    match *metadata.level() {
        Level::ERROR | Level::WARN => EventFilter::Event,
        Level::INFO | Level::DEBUG => EventFilter::Breadcrumb,
        _ => EventFilter::Ignore,
    }
}

async fn serve(config: ServerConfig) -> Result<(), StartupError> {
    let store = open_store(&config).await?;

    let app = routes::app(AppState::new(store.clone()))
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(source) => {
            store.close().await;
            return Err(StartupError::Bind { addr, source });
        }
    };

    tracing::info!("Server running on {}", config.graphql_url());

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    store.close().await;
    tracing::info!(backend = store.backend_name(), "Document store closed");

    served.map_err(StartupError::Serve)
}

/// Open the document store selected by configuration.
async fn open_store(config: &ServerConfig) -> Result<DocumentStore, StartupError> {
    match &config.store {
        StoreConfig::Postgres(database) => {
            let pool = db::create_pool(database).await?;
            tracing::info!(
                profile = database.profile.as_str(),
                max_connections = database.max_connections,
                "Database pool created"
            );
            Ok(DocumentStore::postgres(pool))
        }
        StoreConfig::Memory => {
            tracing::warn!("Using in-memory document store; data is lost on shutdown");
            Ok(DocumentStore::memory())
        }
    }
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining requests");
}
