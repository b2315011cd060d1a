//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use justdo_infra::{DatabaseConfig, JwtConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server on in-memory repositories.
    pub database: Option<DatabaseConfig>,
    /// Drop and re-create the schema at startup.
    pub reset_database: bool,
    pub jwt: JwtConfig,
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Fails when a production deployment has no JWT signing secret.
    pub fn from_env() -> anyhow::Result<Self> {
        let database = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| DatabaseConfig {
                url,
                max_connections: parse_or("DB_MAX_CONNECTIONS", 20),
                min_connections: parse_or("DB_MIN_CONNECTIONS", 2),
                acquire_timeout: Duration::from_secs(parse_or("DB_ACQUIRE_TIMEOUT_SECS", 5)),
            });

        let jwt = JwtConfig::from_env().context("invalid JWT configuration")?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 8080),
            database,
            reset_database: flag("DB_RESET"),
            jwt,
            request_timeout: Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", 30)),
        })
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
