//! # Configuration Utilities
//!
//! Shared configuration structures and parsing utilities used by the
//! pipeline and the binaries that host it.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Returns
/// - `Ok(T)`: Successfully loaded and parsed configuration
/// - `Err`: File I/O or parsing error
///
/// # Example
/// ```ignore
/// let config: WebServerConfig = load_config("config/web_server.toml")?;
/// ```
pub fn load_config<T>(path: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Shortest secret key accepted, in characters. Configuration may raise it.
pub const MIN_SECRET_LEN: usize = 8;

/// Settings for the encode/decode pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory for uploads and temporary/committed artifacts (e.g., "uploads")
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Minimum secret key length in characters; values below 8 are raised to 8
    #[serde(default = "default_min_secret_len")]
    pub min_secret_len: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            min_secret_len: default_min_secret_len(),
        }
    }
}

impl PipelineConfig {
    /// Config rooted at `work_dir` with default limits.
    pub fn with_work_dir(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            ..Self::default()
        }
    }
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_min_secret_len() -> usize {
    MIN_SECRET_LEN
}
