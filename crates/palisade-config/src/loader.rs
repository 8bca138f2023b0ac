//! Configuration loader with layered sources.

use crate::AppConfig;
use config::{Config, ConfigError, Environment, File};
use palisade_core::PalisadeError;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Configuration loader with runtime refresh support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Local overrides (not committed)
    /// 4. Environment variables with `PALISADE__` prefix
    pub fn new(config_dir: impl Into<String>) -> Result<Self, PalisadeError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, PalisadeError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk.
    pub async fn reload(&self) -> Result<(), PalisadeError> {
        let new_config = Self::load_config(&self.config_dir)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Loads configuration from the specified directory.
    fn load_config(config_dir: &str) -> Result<AppConfig, PalisadeError> {
        // Load .env file if present
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var("PALISADE_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        // 1. Load default configuration
        let default_path = format!("{}/default.toml", config_dir);
        if Path::new(&default_path).exists() {
            debug!("Loading default config from: {}", default_path);
            builder = builder.add_source(File::with_name(&default_path).required(false));
        }

        // 2. Load environment-specific configuration
        let env_path = format!("{}/{}.toml", config_dir, environment);
        if Path::new(&env_path).exists() {
            debug!("Loading environment config from: {}", env_path);
            builder = builder.add_source(File::with_name(&env_path).required(false));
        }

        // 3. Load local overrides (not committed to version control)
        let local_path = format!("{}/local.toml", config_dir);
        if Path::new(&local_path).exists() {
            debug!("Loading local config from: {}", local_path);
            builder = builder.add_source(File::with_name(&local_path).required(false));
        }

        // 4. Override with environment variables (PALISADE_ prefix)
        builder = builder.add_source(
            Environment::with_prefix("PALISADE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_error_to_palisade_error)?;

        let app_config: AppConfig = config
            .try_deserialize()
            .map_err(config_error_to_palisade_error)?;

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    /// Validates the configuration.
    fn validate_config(config: &AppConfig) -> Result<(), PalisadeError> {
        if config.retry.max_attempts == 0 {
            return Err(PalisadeError::configuration(
                "retry.max_attempts must be at least 1",
            ));
        }

        if config.retry.multiplier < 1.0 {
            return Err(PalisadeError::configuration(
                "retry.multiplier must be at least 1.0",
            ));
        }

        if config.circuit_breaker.failure_threshold == 0 {
            return Err(PalisadeError::configuration(
                "circuit_breaker.failure_threshold must be at least 1",
            ));
        }

        if config.cache.enabled && config.cache.default_ttl_secs == 0 {
            return Err(PalisadeError::configuration(
                "cache.default_ttl_secs must be at least 1 when caching is enabled",
            ));
        }

        if config.cache.shards == 0 {
            return Err(PalisadeError::configuration(
                "cache.shards must be at least 1",
            ));
        }

        if config.remote.base_url.is_empty() {
            return Err(PalisadeError::configuration("remote.base_url is required"));
        }

        Ok(())
    }
}

fn config_error_to_palisade_error(err: ConfigError) -> PalisadeError {
    PalisadeError::configuration(err.to_string())
}
