//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP behavior settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        if !path.as_ref().exists() {
            log::warn!("Config file {:?} not found. Using defaults.", path.as_ref());
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.max_retries == 0 {
            return Err(AppError::validation("http.max_retries must be > 0"));
        }
        if self.api.host.trim().is_empty() {
            return Err(AppError::validation("api.host is empty"));
        }
        if self.api.page_size == 0 {
            return Err(AppError::validation("api.page_size must be > 0"));
        }
        Ok(())
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between consecutive requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum attempts for a request that keeps timing out
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_retries: defaults::max_retries(),
        }
    }
}

/// Remote API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the encyclopedia host
    #[serde(default = "defaults::host")]
    pub host: String,

    /// Page size for listings that must be fetched in pages
    #[serde(default = "defaults::page_size")]
    pub page_size: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            page_size: defaults::page_size(),
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; ann-mirror/1.0)".into()
    }
    pub fn timeout() -> u64 {
        60
    }
    pub fn request_delay() -> u64 {
        1000
    }
    pub fn max_retries() -> u32 {
        3
    }

    // API defaults
    pub fn host() -> String {
        "https://www.animenewsnetwork.com".into()
    }
    pub fn page_size() -> u64 {
        50_000
    }
}
