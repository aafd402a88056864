use std::env;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Default storage key for the journal record.
pub const DEFAULT_JOURNAL_KEY: &str = "ayah-guidance-journal";
/// Default storage key for the onboarding marker.
pub const DEFAULT_ONBOARDING_KEY: &str = "ayah-guidance-onboarding-v1-shown";
/// Default per-value size limit, mirroring a browser storage quota.
pub const DEFAULT_MAX_VALUE_BYTES: usize = 5 * 1024 * 1024;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// SQLite backend settings.
    pub database: DatabaseConfig,
    /// Storage keys and quota.
    pub store: StoreConfig,
    /// Log level and format.
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database file path.
    pub path: PathBuf,
    /// Pool size.
    pub max_connections: u32,
}

/// Durable key layout and limits
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Key holding the journal document.
    pub journal_key: String,
    /// Key holding the onboarding marker.
    pub onboarding_key: String,
    /// Largest value a single write may store.
    pub max_value_bytes: usize,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database = DatabaseConfig {
            path: PathBuf::from(
                env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/ayah-guidance.db".to_string()),
            ),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        };

        let store = StoreConfig {
            journal_key: env::var("JOURNAL_STORAGE_KEY")
                .unwrap_or_else(|_| DEFAULT_JOURNAL_KEY.to_string()),
            onboarding_key: env::var("ONBOARDING_STORAGE_KEY")
                .unwrap_or_else(|_| DEFAULT_ONBOARDING_KEY.to_string()),
            max_value_bytes: env::var("STORE_MAX_VALUE_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_VALUE_BYTES),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let config = Config {
            database,
            store,
            logging,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> AppResult<()> {
        self.store.validate()
    }
}

impl StoreConfig {
    fn validate(&self) -> AppResult<()> {
        if self.journal_key.trim().is_empty() {
            return Err(AppError::Config {
                message: "JOURNAL_STORAGE_KEY must not be empty".to_string(),
            });
        }
        if self.onboarding_key.trim().is_empty() {
            return Err(AppError::Config {
                message: "ONBOARDING_STORAGE_KEY must not be empty".to_string(),
            });
        }
        if self.journal_key == self.onboarding_key {
            return Err(AppError::Config {
                message: format!(
                    "journal and onboarding records must use distinct keys (both are '{}')",
                    self.journal_key
                ),
            });
        }
        if self.max_value_bytes == 0 {
            return Err(AppError::Config {
                message: "STORE_MAX_VALUE_BYTES must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/ayah-guidance.db"),
            max_connections: 5,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            journal_key: DEFAULT_JOURNAL_KEY.to_string(),
            onboarding_key: DEFAULT_ONBOARDING_KEY.to_string(),
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}
