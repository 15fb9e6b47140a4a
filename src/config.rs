//! Runtime settings loaded from environment variables

use crate::datasets::catalog::PINNED_PRODUCT;
use crate::error::{AppError, Result};
use std::env;
use std::time::Duration;
use url::Url;

/// Data center settings
#[derive(Debug, Clone)]
pub struct Settings {
    // Backend
    pub api_base_url: String,
    pub config_name: String,
    pub http_timeout: Duration,

    // Controller
    pub refresh_delay: Duration,
    pub pinned_product: String,
    pub notify_failures: bool,

    // Local API server
    pub server_host: String,
    pub server_port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            config_name: "config".to_string(),
            http_timeout: Duration::from_secs(30),
            refresh_delay: Duration::from_millis(2000),
            pinned_product: PINNED_PRODUCT.to_string(),
            notify_failures: true,
            server_host: "127.0.0.1".to_string(),
            server_port: 8765,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup, falling back to defaults
    /// for missing or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            api_base_url: lookup("QRONOS_API_BASE_URL").unwrap_or(defaults.api_base_url),
            config_name: lookup("QRONOS_CONFIG_NAME").unwrap_or(defaults.config_name),
            http_timeout: lookup("QRONOS_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            refresh_delay: lookup("QRONOS_REFRESH_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.refresh_delay),
            pinned_product: lookup("QRONOS_PINNED_PRODUCT").unwrap_or(defaults.pinned_product),
            notify_failures: lookup("QRONOS_NOTIFY_FAILURES")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(defaults.notify_failures),
            server_host: lookup("QRONOS_SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: lookup("QRONOS_SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_base_url)?;
        if url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "api base url cannot be a base: {}",
                self.api_base_url
            )));
        }
        if self.http_timeout.is_zero() {
            return Err(AppError::Config("http timeout must be positive".into()));
        }
        if self.pinned_product.trim().is_empty() {
            return Err(AppError::Config("pinned product must not be empty".into()));
        }
        Ok(())
    }
}
