//! Configuration management for the Metabolic Risk backend
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: MR__)

use anyhow::Result;
use metabolic_risk_shared::ContactSettings;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Extra time the HTTP layer allows beyond the lead sink timeout
const LEAD_TIMEOUT_HEADROOM_SECS: u64 = 5;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub lead: LeadConfig,
    #[serde(default)]
    pub contact: ContactSettings,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Whole-request timeout; raised when the lead sink needs longer
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Assessment session lifetime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sessions untouched for this long are discarded
    pub idle_timeout_secs: u64,
    pub cleanup_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 3600,
            cleanup_interval_secs: 300,
        }
    }
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}

/// Lead submission configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadConfig {
    /// External sink; leads go to the local fallback store when unset
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Attach the full measurement to submitted leads
    #[serde(default)]
    pub send_clinical_data: bool,
    pub request_timeout_secs: u64,
    /// JSON file backing the fallback store; memory only when unset
    #[serde(default)]
    pub fallback_path: Option<String>,
}

impl Default for LeadConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            send_clinical_data: false,
            request_timeout_secs: 10,
            fallback_path: None,
        }
    }
}

impl LeadConfig {
    /// Configured endpoint, ignoring blank values
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn fallback_path(&self) -> Option<&str> {
        self.fallback_path
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                request_timeout_secs: default_request_timeout_secs(),
            },
            session: SessionConfig::default(),
            lead: LeadConfig::default(),
            contact: ContactSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with MR__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Load from environment-specific config file
            .add_source(
                config::File::with_name(&config_file)
                    .required(false)
            )
            // Override with environment variables (MR__ prefix)
            // e.g., MR__LEAD__ENDPOINT=https://crm.example.com/leads sets lead.endpoint
            .add_source(
                config::Environment::with_prefix("MR")
                    .separator("__")
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Timeout for a whole HTTP request
    ///
    /// Never shorter than the lead sink timeout plus headroom.
    pub fn request_timeout(&self) -> Duration {
        let lead_bound = self.lead.request_timeout_secs + LEAD_TIMEOUT_HEADROOM_SECS;
        Duration::from_secs(self.server.request_timeout_secs.max(lead_bound))
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}
