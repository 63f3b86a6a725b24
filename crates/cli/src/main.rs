//! Product Graph CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the documents table
//! pg-cli migrate
//!
//! # Insert sample products
//! pg-cli seed --count 20
//!
//! # Print the GraphQL schema
//! pg-cli schema > schema.graphql
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Insert sample products
//! - `schema` - Print the GraphQL SDL

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "pg-cli")]
#[command(author, version, about = "Product Graph CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert sample products into the product collection
    Seed {
        /// Number of products to insert
        #[arg(short, long, default_value_t = 5)]
        count: usize,
    },
    /// Print the GraphQL schema (SDL)
    Schema,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { count } => commands::seed::products(count).await?,
        Commands::Schema => commands::schema::print(),
    }
    Ok(())
}
