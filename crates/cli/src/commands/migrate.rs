//! Database migration command.
//!
//! Applies `crates/server/migrations/` to the database named by
//! `PRODUCT_GRAPH_DATABASE_URL` (or `DATABASE_URL`).

use product_graph_server::db;

use super::{CliError, database_config};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is unreachable,
/// or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let database = database_config("migrate")?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    pool.close().await;
    tracing::info!("Migrations complete!");
    Ok(())
}
