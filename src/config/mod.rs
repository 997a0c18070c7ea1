mod parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::Error;

pub use parser::load_config;

/// Database URL used when nothing else is configured
pub const DEFAULT_DATABASE_URL: &str = "todos.db";

/// SQLite URL for a private in-memory database
pub const IN_MEMORY_DATABASE_URL: &str = ":memory:";

/// Environment variable overriding the database URL
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Main configuration structure for the service
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Store settings
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Test mode: in-memory store by default and detailed internal errors
    #[serde(default)]
    pub testing: bool,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Store settings
#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection string (a file path or `:memory:`)
    pub url: Option<String>,
    /// Maximum number of pooled connections
    pub pool_size: u32,
    /// How long a request waits for a pooled connection, e.g. "5s" or "250ms"
    pub connect_timeout: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            url: None,
            pool_size: 8,
            connect_timeout: "5s".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Parses `connect_timeout` as a human readable duration
    pub fn connect_timeout(&self) -> Result<Duration, Error> {
        humantime::parse_duration(&self.connect_timeout).map_err(|e| {
            Error::ConfigError(format!(
                "invalid connect_timeout '{}': {}",
                self.connect_timeout, e
            ))
        })
    }
}

/// Logging settings
#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "todo_api=debug"
    pub level: String,
    /// Also write to a daily rotating file under `logs/`
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: false,
        }
    }
}

impl Config {
    /// Configuration with test mode on and a private in-memory store
    pub fn for_testing() -> Self {
        let mut config = Config {
            testing: true,
            ..Default::default()
        };
        config.database.url = Some(IN_MEMORY_DATABASE_URL.to_string());
        config
    }

    /// Applies overrides read from the environment.
    ///
    /// `lookup` is usually `|key| std::env::var(key).ok()`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|url| !url.is_empty()) {
            self.database.url = Some(url);
        }
    }

    /// The connection string the store should open
    pub fn database_url(&self) -> &str {
        match self.database.url.as_deref() {
            Some(url) => url,
            None if self.testing => IN_MEMORY_DATABASE_URL,
            None => DEFAULT_DATABASE_URL,
        }
    }
}
