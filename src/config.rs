//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.randmean.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".randmean.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// random.org client settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Job parameter bounds.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// random.org JSON-RPC client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// JSON-RPC endpoint.
    #[serde(default = "default_upstream_url")]
    pub url: String,

    /// API key. Usually supplied through `RANDOM_ORG_API_KEY` rather than the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// JSON-RPC request id.
    #[serde(default = "default_request_id")]
    pub request_id: u64,

    /// Maximum number of upstream calls in flight across the whole process.
    /// `1` serializes every call.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            api_key: None,
            timeout_seconds: default_timeout(),
            request_id: default_request_id(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

fn default_upstream_url() -> String {
    "https://api.random.org/json-rpc/2/invoke".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_request_id() -> u64 {
    666
}

fn default_max_in_flight() -> usize {
    1 // random.org asks clients not to issue simultaneous requests
}

/// Bounds on job parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of sequences per job.
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,

    /// Maximum length of each sequence.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            max_length: default_max_length(),
        }
    }
}

fn default_max_requests() -> usize {
    10
}

fn default_max_length() -> usize {
    1000
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ref url) = args.upstream_url {
            self.upstream.url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.upstream.timeout_seconds = timeout;
        }
        if let Some(max_in_flight) = args.max_in_flight {
            self.upstream.max_in_flight = max_in_flight;
        }

        // The environment credential wins over anything in the file
        if let Some(ref key) = args.api_key {
            if !key.trim().is_empty() {
                self.upstream.api_key = Some(key.clone());
            }
        }
    }

    /// Check values that serde defaults cannot guard.
    pub fn validate(&self) -> Result<()> {
        if self.upstream.max_in_flight == 0 {
            anyhow::bail!("upstream.max_in_flight must be at least 1");
        }
        if self.upstream.timeout_seconds == 0 {
            anyhow::bail!("upstream.timeout_seconds must be at least 1");
        }
        if self.limits.max_requests == 0 || self.limits.max_length == 0 {
            anyhow::bail!("limits.max_requests and limits.max_length must be at least 1");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
