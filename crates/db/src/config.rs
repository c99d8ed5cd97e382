//! # Store Configuration
//!
//! Connection settings for the relational and document stores, read from
//! environment variables.
//!
//! ## Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string for doctors and appointments (required)
//! - `DOCUMENT_DATABASE_URL`: connection string for the prescription collection
//!   (default: same as `DATABASE_URL`)
//! - `DB_MAX_CONNECTIONS`: pool size for each store (default: 5)
//! - `LOG_LEVEL`: logging level (default: "info")

use eyre::{Result, WrapErr};
use std::env;
use tracing::Level;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Relational store connection string
    pub database_url: String,

    /// Document store connection string
    pub document_database_url: String,

    /// Maximum pool size per store
    pub max_connections: u32,

    /// Log level for the binaries
    pub log_level: Level,
}

impl StoreConfig {
    /// Creates a new StoreConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - The DB_MAX_CONNECTIONS value cannot be parsed as a u32
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;
        let document_database_url =
            env::var("DOCUMENT_DATABASE_URL").unwrap_or_else(|_| database_url.clone());

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .wrap_err("Invalid DB_MAX_CONNECTIONS value")?;

        let log_level = parse_log_level(&env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

        Ok(Self {
            database_url,
            document_database_url,
            max_connections,
            log_level,
        })
    }
}

/// Unknown values fall back to `INFO`.
pub fn parse_log_level(value: &str) -> Level {
    match value.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("trace", Level::TRACE)]
    #[case("DEBUG", Level::DEBUG)]
    #[case("warn", Level::WARN)]
    #[case("error", Level::ERROR)]
    #[case("verbose", Level::INFO)]
    fn test_parse_log_level(#[case] raw: &str, #[case] expected: Level) {
        assert_eq!(parse_log_level(raw), expected);
    }
}
