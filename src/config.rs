use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::services::RetryPolicy;
use crate::store::http::HttpStoreConfig;

/// Environment variable that overrides the configured service key, so the
/// credential can stay out of the config file.
pub const API_KEY_ENV: &str = "PROFILECTL_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub store: StoreConfig,

    pub bootstrap: BootstrapConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            store: StoreConfig::default(),
            bootstrap: BootstrapConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Tokio worker threads. 0 lets the runtime decide.
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the hosted backend, e.g. `https://abc.example.co`.
    pub base_url: String,

    /// Service key. Prefer setting `PROFILECTL_API_KEY` in the environment
    /// over writing the key into this file.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    pub table: String,

    pub timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            table: "profiles".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn http_config(&self) -> HttpStoreConfig {
        HttpStoreConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            table: self.table.clone(),
            timeout_seconds: self.timeout_seconds,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Attempts per bootstrap call before giving up.
    pub max_attempts: u32,

    /// Base backoff delay; attempt N waits N x this value.
    pub base_delay_ms: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

impl BootstrapConfig {
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;

        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            config.store.api_key = key;
        }

        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("profilectl").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".profilectl").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.store.base_url.is_empty() {
            anyhow::bail!("Store base URL cannot be empty");
        }

        url::Url::parse(&self.store.base_url)
            .with_context(|| format!("Invalid store base URL: {}", self.store.base_url))?;

        if self.store.table.is_empty() {
            anyhow::bail!("Store table name cannot be empty");
        }

        if self.store.timeout_seconds == 0 {
            anyhow::bail!("Store timeout must be > 0");
        }

        if self.bootstrap.max_attempts == 0 {
            anyhow::bail!("Bootstrap max attempts must be > 0");
        }

        Ok(())
    }
}
