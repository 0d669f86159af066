//! Configuration management for the FMP MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables, configuration files, or defaults.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Base URL of the Financial Modeling Prep REST API.
pub const FMP_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";

/// Main configuration structure for the FMP MCP server.
///
/// This struct contains all configurable aspects of the server, organized
/// by domain for clarity and maintainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Upstream FMP API configuration.
    pub api: ApiConfig,

    /// External API credentials configuration.
    pub credentials: CredentialsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Configuration for the upstream Financial Modeling Prep API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the FMP REST API (overridable for tests).
    pub base_url: String,

    /// Per-request timeout in seconds. A single attempt, no retries.
    pub timeout_secs: u64,
}

/// Configuration for external API credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Financial Modeling Prep API key.
    /// Get a key at: https://site.financialmodelingprep.com/developer/docs
    pub fmp_api_key: String,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("fmp_api_key", &"[REDACTED]")
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: FMP_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            // The public FMP demo key only serves a handful of symbols
            fmp_api_key: "demo".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "fmp-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            api: ApiConfig::default(),
            credentials: CredentialsConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Transport and logging settings use the `MCP_` prefix
    /// (e.g. `MCP_TRANSPORT`, `MCP_LOG_LEVEL`); upstream API settings use
    /// the `FMP_` prefix (e.g. `FMP_API_KEY`).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        // Load FMP API settings
        if let Ok(api_key) = std::env::var("FMP_API_KEY") {
            config.credentials.fmp_api_key = api_key;
            info!("FMP API key loaded from environment");
        } else {
            warn!(
                "FMP_API_KEY not set - using the public demo key, which only \
                 serves a limited set of symbols"
            );
        }

        if let Ok(base_url) = std::env::var("FMP_BASE_URL") {
            config.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("FMP_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                config.api.timeout_secs = secs;
            } else {
                warn!("Ignoring unparseable FMP_TIMEOUT_SECS: {}", timeout);
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_api_key_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("FMP_API_KEY", "test_key_12345");
        }
        let config = Config::from_env();
        assert_eq!(config.credentials.fmp_api_key, "test_key_12345");
        unsafe {
            std::env::remove_var("FMP_API_KEY");
        }
    }

    #[test]
    fn test_api_key_default_fallback() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::remove_var("FMP_API_KEY");
        }
        let config = Config::from_env();
        assert_eq!(config.credentials.fmp_api_key, "demo");
    }

    #[test]
    fn test_api_key_redacted_in_debug() {
        let creds = CredentialsConfig {
            fmp_api_key: "super_secret_key".to_string(),
        };
        let debug_str = format!("{:?}", creds);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_key"));
    }

    #[test]
    fn test_default_api_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, FMP_BASE_URL);
        assert_eq!(config.api.timeout_secs, 30);
    }
}
