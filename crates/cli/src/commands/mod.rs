//! CLI subcommands.

pub mod migrate;
pub mod schema;
pub mod seed;

use product_graph_server::config::{ConfigError, DatabaseConfig, ServerConfig, StoreConfig};
use product_graph_server::db::StoreError;

/// Errors surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("`{0}` needs a database; set PRODUCT_GRAPH_STORE=postgres")]
    RequiresPostgres(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Load the database settings shared with the server.
fn database_config(command: &'static str) -> Result<DatabaseConfig, CliError> {
    match ServerConfig::from_env()?.store {
        StoreConfig::Postgres(database) => Ok(database),
        StoreConfig::Memory => Err(CliError::RequiresPostgres(command)),
    }
}
