//! Client configuration
//!
//! Defaults, then an optional JSON file named by `HAOC_CONFIG`, then
//! environment overrides. Blank values are ignored at every layer.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use haoc_http::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_SKIP_REFRESH, REFRESH_PATH};

use crate::error::CoreError;
use crate::Result;

pub const CONFIG_FILE_ENV: &str = "HAOC_CONFIG";
pub const API_BASE_URL_ENV: &str = "HAOC_API_BASE_URL";
pub const DATABASE_PATH_ENV: &str = "HAOC_DATABASE_PATH";
pub const REQUEST_TIMEOUT_ENV: &str = "HAOC_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL, including the `/api/v1` prefix
    pub api_base_url: String,
    /// Cookie-authenticated refresh endpoint
    pub refresh_path: String,
    /// Endpoints whose 401 is never answered with a refresh
    pub skip_refresh: Vec<String>,
    pub request_timeout_secs: u64,
    /// Path to the database file holding the token and cached user
    pub database_path: PathBuf,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            refresh_path: REFRESH_PATH.to_string(),
            skip_refresh: DEFAULT_SKIP_REFRESH.iter().map(|p| p.to_string()).collect(),
            request_timeout_secs: 30,
            database_path: data_dir.join("haoc.db"),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("haoc"))
            .unwrap_or_else(|| PathBuf::from(".haoc"))
    }

    /// Configuration for this process
    pub fn load() -> Result<Self> {
        Self::from_sources(|name| std::env::var(name).ok())
    }

    /// Build from defaults, the file named by `HAOC_CONFIG` and overrides,
    /// reading variables through `var`
    pub fn from_sources(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| var(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = match var(CONFIG_FILE_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(url) = var(API_BASE_URL_ENV) {
            config.api_base_url = url;
        }
        if let Some(path) = var(DATABASE_PATH_ENV) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(secs) = var(REQUEST_TIMEOUT_ENV) {
            config.request_timeout_secs = secs.parse().map_err(|_| {
                CoreError::Config(format!("{REQUEST_TIMEOUT_ENV} must be a number of seconds, got {secs:?}"))
            })?;
        }

        config.validate()?;

        tracing::debug!(
            api_base_url = %config.api_base_url,
            database_path = %config.database_path.display(),
            "Loaded configuration"
        );

        Ok(config)
    }

    /// Defaults overlaid with the fields present in a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(CoreError::Config("api_base_url is empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// The HTTP-level subset
    pub fn to_api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_base_url.clone(),
            refresh_path: self.refresh_path.clone(),
            skip_refresh: self.skip_refresh.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

// Simple dirs implementation for the platform data directory
mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .filter(|d| !d.is_empty())
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
