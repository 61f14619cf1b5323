//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Feed configuration.
    #[serde(default)]
    pub feed: FeedConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a connection before giving up.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Feed paging configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FeedConfig {
    /// Page size used when the client does not ask for one.
    #[serde(default = "default_feed_limit")]
    pub default_limit: u64,
    /// Largest page size a client may ask for.
    #[serde(default = "default_feed_max_limit")]
    pub max_limit: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_limit: default_feed_limit(),
            max_limit: default_feed_max_limit(),
        }
    }
}

impl FeedConfig {
    /// Resolve a requested page size against the configured bounds.
    #[must_use]
    pub fn clamp(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_limit)
            .min(self.max_limit)
            .max(1)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.max_limit == 0 {
            return Err(config::ConfigError::Message(
                "feed.max_limit must be at least 1".to_string(),
            ));
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(config::ConfigError::Message(
                "feed.default_limit must be between 1 and feed.max_limit".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

const fn default_feed_limit() -> u64 {
    20
}

const fn default_feed_max_limit() -> u64 {
    100
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, only to populate the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `DAILYFLIP_ENV`)
    /// 4. Environment variables with `DAILYFLIP__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();

        let env = std::env::var("DAILYFLIP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DAILYFLIP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize::<Self>()?.validated()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("DAILYFLIP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize::<Self>()?.validated()
    }

    fn validated(self) -> Result<Self, config::ConfigError> {
        self.feed.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_clamp_defaults_and_bounds() {
        let feed = FeedConfig::default();
        assert_eq!(feed.clamp(None), 20);
        assert_eq!(feed.clamp(Some(0)), 1);
        assert_eq!(feed.clamp(Some(500)), 100);
        assert_eq!(feed.clamp(Some(42)), 42);
    }

    #[test]
    fn test_deserialize_minimal_config() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                url = "http://localhost:3000"

                [database]
                url = "postgres://localhost/dailyflip"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .and_then(|c| c.try_deserialize::<Config>())
            .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.feed.default_limit, 20);
    }

    #[test]
    fn test_zero_max_limit_does_not_panic() {
        let feed = FeedConfig {
            default_limit: 20,
            max_limit: 0,
        };
        assert_eq!(feed.clamp(None), 1);
        assert_eq!(feed.clamp(Some(5)), 1);
    }

    #[test]
    fn test_invalid_feed_limits_rejected() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                url = "http://localhost:3000"

                [database]
                url = "postgres://localhost/dailyflip"

                [feed]
                max_limit = 0
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .and_then(|c| c.try_deserialize::<Config>())
            .unwrap();

        assert!(config.clone().validated().is_err());

        let mut config = config;
        config.feed.max_limit = 10;
        config.feed.default_limit = 50;
        assert!(config.clone().validated().is_err());

        config.feed.default_limit = 10;
        assert!(config.validated().is_ok());
    }
}
