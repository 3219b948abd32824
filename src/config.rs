use anyhow::Result;
use config::{Config, Environment, File};
use moka::future::Cache;
use sea_orm::{Database, DatabaseConnection};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, trace};

use crate::schemas::AppState;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://ledger.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_CACHE_CAPACITY: u64 = 1000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Application settings.
///
/// Sources in increasing priority: built-in defaults, an optional
/// `ledger.toml` in the working directory, then `LEDGER_*` environment
/// variables. A `.env` file is loaded into the environment first.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    pub cache_capacity: u64,
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        Self::from_sources(File::with_name("ledger").required(false), Environment::with_prefix("LEDGER"))
    }

    fn from_sources<F>(file: F, env: Environment) -> Result<Self, SettingsError>
    where
        F: config::Source + Send + Sync + 'static,
    {
        trace!("Loading settings");
        let settings: Settings = Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("cache_capacity", DEFAULT_CACHE_CAPACITY as i64)?
            .set_default("cache_ttl_secs", DEFAULT_CACHE_TTL_SECS as i64)?
            .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS as i64)?
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        debug!(?settings, "Settings loaded");
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.bind_address.parse::<SocketAddr>().is_err() {
            return Err(SettingsError::Invalid {
                name: "bind_address",
                reason: format!("'{}' is not an IP:PORT address", self.bind_address),
            });
        }
        if self.cache_capacity == 0 {
            return Err(SettingsError::Invalid { name: "cache_capacity", reason: "must be positive".to_string() });
        }
        if self.request_timeout_secs == 0 {
            return Err(SettingsError::Invalid {
                name: "request_timeout_secs",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Applies command line overrides.
    pub fn with_overrides(mut self, database_url: Option<String>, bind_address: Option<String>) -> Self {
        if let Some(url) = database_url {
            self.database_url = url;
        }
        if let Some(address) = bind_address {
            self.bind_address = address;
        }
        self
    }
}

/// Build the sheet totals cache.
pub fn build_cache(settings: &Settings) -> Cache<String, crate::schemas::CachedData> {
    Cache::builder()
        .max_capacity(settings.cache_capacity)
        .time_to_live(Duration::from_secs(settings.cache_ttl_secs))
        .build()
}

/// Open the configured database.
pub async fn connect(settings: &Settings) -> Result<DatabaseConnection> {
    info!("Connecting to database: {}", settings.database_url);
    match Database::connect(&settings.database_url).await {
        Ok(db) => {
            debug!("Database connection established");
            Ok(db)
        }
        Err(e) => {
            error!("Failed to connect to database '{}': {}", settings.database_url, e);
            Err(e.into())
        }
    }
}

/// Application state over an already open connection
pub fn app_state(db: DatabaseConnection, settings: &Settings) -> AppState {
    AppState::new(db, build_cache(settings))
}

/// Initialize application state with the configured database URL
pub async fn initialize_app_state(settings: &Settings) -> Result<AppState> {
    Ok(app_state(connect(settings).await?, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn load(toml: &str, vars: &[(&str, &str)]) -> Result<Settings, SettingsError> {
        let env = Environment::with_prefix("LEDGER").source(Some(
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        ));
        Settings::from_sources(File::from_str(toml, FileFormat::Toml), env)
    }

    #[test]
    fn test_defaults() {
        let settings = load("", &[]).unwrap();
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(settings.cache_capacity, 1000);
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_environment_overrides_file() {
        let settings = load(
            "database_url = \"sqlite://file.db\"\ncache_ttl_secs = 60",
            &[("LEDGER_DATABASE_URL", "sqlite://env.db")],
        )
        .unwrap();
        assert_eq!(settings.database_url, "sqlite://env.db");
        assert_eq!(settings.cache_ttl_secs, 60);
    }

    #[test]
    fn test_invalid_bind_address() {
        let err = load("bind_address = \"nowhere\"", &[]).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { name: "bind_address", .. }));
    }

    #[test]
    fn test_cli_overrides() {
        let settings = Settings::default().with_overrides(Some("sqlite::memory:".to_string()), None);
        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.bind_address, DEFAULT_BIND_ADDRESS);
    }
}
