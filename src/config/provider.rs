//! # Provider Configuration
//!
//! Connection and runtime settings loaded from environment variables.

use crate::constants::{
    DEFAULT_DELETE_SETTLE_MS, DEFAULT_DEX_HOST, DEFAULT_LOG_FORMAT, DEFAULT_LOG_LEVEL,
    DEFAULT_TIMEOUT_SECS,
};
use anyhow::Result;
use std::time::Duration;

/// Provider-level configuration
///
/// Constructed once per provider instance. Every reconciler shares the
/// connection built from it. All settings have defaults and can be
/// overridden via environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Dex gRPC endpoint as `host:port`
    pub host: String,
    /// Per-RPC deadline (seconds)
    pub timeout_secs: u64,
    /// Pause before verifying that a deleted client is gone (milliseconds)
    pub delete_verify_settle_ms: u64,
    /// Logging settings for the `dexctl` binary
    pub logging: LoggingConfig,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Global log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::parse(DEFAULT_LOG_FORMAT),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DEX_HOST.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            delete_verify_settle_ms: DEFAULT_DELETE_SETTLE_MS,
            logging: LoggingConfig::default(),
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            host: env_var_or_default_str("DEX_HOST", DEFAULT_DEX_HOST),
            timeout_secs: env_var_or_default("DEX_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECS),
            delete_verify_settle_ms: env_var_or_default(
                "DEX_DELETE_SETTLE_MS",
                DEFAULT_DELETE_SETTLE_MS,
            ),
            logging: LoggingConfig {
                level: env_var_or_default_str("LOG_LEVEL", DEFAULT_LOG_LEVEL),
                format: LogFormat::parse(&env_var_or_default_str(
                    "LOG_FORMAT",
                    DEFAULT_LOG_FORMAT,
                )),
            },
        }
    }

    /// Reject settings the provider cannot work with
    ///
    /// # Errors
    /// Returns an error if the host is empty or the timeout is zero
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(anyhow::anyhow!("host is required"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow::anyhow!("timeoutSeconds must be greater than zero"));
        }
        Ok(())
    }

    /// Get the per-RPC deadline
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the delete verification settle delay
    #[must_use]
    pub fn delete_settle_delay(&self) -> Duration {
        Duration::from_millis(self.delete_verify_settle_ms)
    }

    /// gRPC endpoint URI for the configured host
    #[must_use]
    pub fn endpoint_uri(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            self.host.clone()
        } else {
            format!("http://{}", self.host)
        }
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.host, "127.0.0.1:5557");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.delete_settle_delay(), Duration::from_millis(200));
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_host_and_zero_timeout() {
        let mut config = ProviderConfig {
            host: "  ".to_string(),
            ..ProviderConfig::default()
        };
        assert!(config.validate().is_err());

        config.host = "dex.internal:5557".to_string();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_uri_adds_scheme() {
        let mut config = ProviderConfig {
            host: "dex.internal:5557".to_string(),
            ..ProviderConfig::default()
        };
        assert_eq!(config.endpoint_uri(), "http://dex.internal:5557");

        config.host = "https://dex.internal:5557".to_string();
        assert_eq!(config.endpoint_uri(), "https://dex.internal:5557");
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("text"), LogFormat::Text);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Text);
    }
}
