//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (postgres store)
//! - `PRODUCT_GRAPH_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `PRODUCT_GRAPH_STORE` - Document store backend: `postgres` or `memory` (default: postgres)
//! - `PRODUCT_GRAPH_DATABASE_USERNAME` - Overrides the username in the connection string
//! - `PRODUCT_GRAPH_DATABASE_PASSWORD` - Overrides the password in the connection string
//! - `PRODUCT_GRAPH_CONNECTION_PROFILE` - `default` or `wan-development` (default: wan-development)
//! - `PRODUCT_GRAPH_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `PRODUCT_GRAPH_HOST` - Bind address (default: 0.0.0.0)
//! - `PRODUCT_GRAPH_PORT` - Listen port (default: 4000)
//! - `PRODUCT_GRAPH_PUBLIC_URL` - URL logged at startup (default: derived from host and port)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry performance sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Where product documents are persisted
    pub store: StoreConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Externally reachable URL, if it differs from the bind address
    pub public_url: Option<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. production, staging)
    pub sentry_environment: Option<String>,
    /// Fraction of transactions sent to Sentry performance monitoring
    pub sentry_traces_sample_rate: f32,
}

/// Document store backend selection.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// `PostgreSQL` document table behind a connection pool.
    Postgres(DatabaseConfig),
    /// Process-local store; contents are lost on restart.
    Memory,
}

/// Database connection settings.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Connection string (may embed credentials)
    pub url: SecretString,
    /// Username overriding the one in `url`
    pub username: Option<String>,
    /// Password overriding the one in `url`
    pub password: Option<SecretString>,
    /// Timeout tuning for the network distance to the database
    pub profile: ConnectionProfile,
    /// Maximum pooled connections
    pub max_connections: u32,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("profile", &self.profile)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Named timeout profile for database connections.
///
/// `WanDevelopment` relaxes every timeout for databases reached over the
/// public internet, where round trips of hundreds of milliseconds are normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionProfile {
    Default,
    #[default]
    WanDevelopment,
}

impl ConnectionProfile {
    /// Time allowed to establish or check out a pooled connection.
    #[must_use]
    pub const fn acquire_timeout(self) -> Duration {
        match self {
            Self::Default => Duration::from_secs(10),
            Self::WanDevelopment => Duration::from_secs(20),
        }
    }

    /// Server-side limit on a single statement.
    #[must_use]
    pub const fn statement_timeout(self) -> Duration {
        match self {
            Self::Default => Duration::from_millis(2500),
            Self::WanDevelopment => Duration::from_secs(20),
        }
    }

    /// Profile name as accepted by `PRODUCT_GRAPH_CONNECTION_PROFILE`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::WanDevelopment => "wan-development",
        }
    }
}

impl FromStr for ConnectionProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "wan-development" | "wandevelopment" | "wan_development" => Ok(Self::WanDevelopment),
            other => Err(format!(
                "unknown connection profile '{other}' (expected 'default' or 'wan-development')"
            )),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let store = match env.or_default("PRODUCT_GRAPH_STORE", "postgres").as_str() {
            "postgres" => StoreConfig::Postgres(DatabaseConfig::from_env(&env)?),
            "memory" => StoreConfig::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "PRODUCT_GRAPH_STORE".to_string(),
                    format!("unknown store '{other}' (expected 'postgres' or 'memory')"),
                ));
            }
        };
        let host = env.parsed::<IpAddr>("PRODUCT_GRAPH_HOST", "0.0.0.0")?;
        let port = env.parsed::<u16>("PRODUCT_GRAPH_PORT", "4000")?;
        let sentry_traces_sample_rate = env.parsed::<f32>("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            store,
            host,
            port,
            public_url: env.optional("PRODUCT_GRAPH_PUBLIC_URL"),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the URL clients should use to reach the GraphQL endpoint.
    ///
    /// Unspecified bind addresses (`0.0.0.0`, `::`) are reported as `localhost`.
    #[must_use]
    pub fn graphql_url(&self) -> String {
        if let Some(url) = &self.public_url {
            return url.clone();
        }

        let host = if self.host.is_unspecified() {
            "localhost".to_string()
        } else {
            match self.host {
                IpAddr::V4(ip) => ip.to_string(),
                IpAddr::V6(ip) => format!("[{ip}]"),
            }
        };
        format!("http://{host}:{}/graphql", self.port)
    }
}

impl DatabaseConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            url: env.database_url("PRODUCT_GRAPH_DATABASE_URL")?,
            username: env.optional("PRODUCT_GRAPH_DATABASE_USERNAME"),
            password: env
                .optional("PRODUCT_GRAPH_DATABASE_PASSWORD")
                .map(SecretString::from),
            profile: env.parsed("PRODUCT_GRAPH_CONNECTION_PROFILE", "wan-development")?,
            max_connections: env.parsed(
                "PRODUCT_GRAPH_MAX_CONNECTIONS",
                &DEFAULT_MAX_CONNECTIONS.to_string(),
            )?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source wrapper shared by the loaders above.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable. Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a variable (or its default) and parse it.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }
}
