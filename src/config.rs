use crate::error::ReconcileError;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub reconciliation: ReconciliationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Look-back window settings exposed to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    pub default_lookback_days: u32,
    pub max_lookback_days: u32,
}

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "postgres://localhost/cycle_counts";
const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_LOOKBACK_DAYS: u32 = 7;
const DEFAULT_MAX_LOOKBACK_DAYS: u32 = 30;

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            default_lookback_days: DEFAULT_LOOKBACK_DAYS,
            max_lookback_days: DEFAULT_MAX_LOOKBACK_DAYS,
        }
    }
}

impl ReconciliationConfig {
    /// Resolve a caller-supplied look-back, falling back to the default.
    /// Values outside 1..=max are rejected.
    pub fn validate_lookback(&self, requested: Option<u32>) -> Result<u32, ReconcileError> {
        let days = requested.unwrap_or(self.default_lookback_days);
        if days == 0 || days > self.max_lookback_days {
            return Err(ReconcileError::InvalidParameter(format!(
                "lookback_days must be between 1 and {}, got {}",
                self.max_lookback_days, days
            )));
        }
        Ok(days)
    }

    /// Check the configured window itself: `max_lookback_days` at least 1
    /// and the default inside 1..=max
    pub fn validate(&self) -> Result<(), ReconcileError> {
        if self.max_lookback_days == 0 {
            return Err(ReconcileError::InvalidParameter(
                "max_lookback_days must be at least 1".to_string(),
            ));
        }
        self.validate_lookback(Some(self.default_lookback_days))
            .map(|_| ())
            .map_err(|_| {
                ReconcileError::InvalidParameter(format!(
                    "default_lookback_days must be between 1 and {}, got {}",
                    self.max_lookback_days, self.default_lookback_days
                ))
            })
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = ReconciliationConfig::default();
        Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
                port: std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(DEFAULT_PORT),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            },
            reconciliation: ReconciliationConfig {
                default_lookback_days: std::env::var("RECONCILE_LOOKBACK_DAYS")
                    .ok()
                    .and_then(|d| d.parse().ok())
                    .unwrap_or(defaults.default_lookback_days),
                max_lookback_days: std::env::var("RECONCILE_MAX_LOOKBACK_DAYS")
                    .ok()
                    .and_then(|d| d.parse().ok())
                    .unwrap_or(defaults.max_lookback_days),
            },
        }
    }

    /// Layered load. Lowest to highest precedence: built-in defaults with
    /// the plain environment variables of [`AppConfig::from_env`], the
    /// optional `config/default.*` file, then `APP__SECTION__KEY` overrides.
    /// The look-back settings are checked before returning.
    pub fn load() -> Result<Self, config::ConfigError> {
        let loaded: Self = config::Config::builder()
            .add_source(config::Config::try_from(&Self::from_env())?)
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        loaded
            .reconciliation
            .validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(loaded)
    }
}
