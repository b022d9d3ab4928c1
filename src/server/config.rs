use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::common::config::{load_config, PipelineConfig};

/// Complete web server configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebServerConfig {
    pub server: ServerInfo,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Listener and request limits for the HTTP front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Address to bind (e.g., "127.0.0.1:3001")
    pub address: String,
    /// Largest accepted request body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Log level name passed to the logger ("info", "debug", ...)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

impl WebServerConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        load_config(path)
    }
}
