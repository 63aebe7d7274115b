//! Application configuration loaded from environment variables.
//!
//! Backend-specific settings (Redis, throttle quota, review AI provider) are
//! read by their own `revu-infra` config types; this struct decides which
//! backends are switched on.

use std::env;

/// Main database settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs every store in memory.
    pub database: Option<DatabaseSettings>,
    /// Apply pending migrations before serving.
    pub run_migrations: bool,
    /// Keep the rate-limit ledger in Redis instead of the database.
    pub redis_enabled: bool,
    /// Per-client request throttle in front of the API.
    pub throttle_enabled: bool,
    /// Key the throttle on `Forwarded`/`X-Forwarded-For` instead of the peer
    /// address. Only safe behind a proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| lookup(key).and_then(|s| s.parse::<u32>().ok());
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
                .unwrap_or(default)
        };

        let database = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .map(|url| DatabaseSettings {
                url,
                max_connections: parsed("DB_MAX_CONNECTIONS").unwrap_or(100),
                min_connections: parsed("DB_MIN_CONNECTIONS").unwrap_or(10),
            });

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database,
            run_migrations: flag("RUN_MIGRATIONS", false),
            redis_enabled: lookup("REDIS_URL").is_some_and(|url| !url.trim().is_empty()),
            throttle_enabled: flag("THROTTLE_ENABLED", true),
            trust_proxy_headers: flag("TRUST_PROXY_HEADERS", false),
        }
    }
}
