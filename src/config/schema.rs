//! Configuration schema for hydra-inputs
//!
//! Configuration is stored at `~/.config/hydra-inputs/config.toml`

use crate::client::HttpOptions;
use crate::graph::{ResolveOptions, DEFAULT_MAX_DEPTH};
use crate::report::OutputFormat;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Build-farm connection settings
    pub server: ServerConfig,

    /// Resolution settings
    pub resolve: ResolveConfig,

    /// Report settings
    pub output: OutputConfig,
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// General application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: LogFormat,
}

/// Build-farm connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Timeout for a whole request, in seconds
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let http = HttpOptions::default();
        Self {
            timeout_secs: http.timeout.as_secs(),
            user_agent: http.user_agent,
        }
    }
}

impl ServerConfig {
    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Resolution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Most evaluations allowed on one dependency path
    pub max_depth: usize,

    /// Fetch dependency builds concurrently before resolving
    pub prefetch: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            prefetch: true,
        }
    }
}

impl ResolveConfig {
    pub fn options(&self) -> ResolveOptions {
        ResolveOptions {
            max_depth: self.max_depth,
            prefetch: self.prefetch,
        }
    }
}

/// Report settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}
