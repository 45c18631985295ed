//! Configuration for the storage client and the scan polling sweep.
//!
//! Plain structs with defaults plus `from_env` constructors; nothing here
//! requires a config file.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::constants::DEFAULT_SCAN_POLL_INTERVAL_MS;

/// Controls the scan coordinator's polling sweep.
#[derive(Clone, Debug)]
pub struct ScanPollConfig {
    pub poll_interval_ms: u64,
}

impl Default for ScanPollConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_SCAN_POLL_INTERVAL_MS,
        }
    }
}

impl ScanPollConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reads `DESKCHAT_SCAN_POLL_INTERVAL_MS`; falls back to the default
    /// on a missing or unparseable value.
    pub fn from_env() -> Self {
        let poll_interval_ms = env::var("DESKCHAT_SCAN_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SCAN_POLL_INTERVAL_MS);
        Self { poll_interval_ms }
    }
}

/// Connection settings for the HTTP storage provider.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub base_url: String,
    pub token: Option<String>,
    /// Container the provider groups this session's uploads under.
    pub container_id: String,
}

impl StorageConfig {
    /// Reads `DESKCHAT_STORAGE_URL`, `DESKCHAT_STORAGE_CONTAINER`, and the
    /// optional `DESKCHAT_STORAGE_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("DESKCHAT_STORAGE_URL")
            .context("Missing storage URL. Set DESKCHAT_STORAGE_URL")?;
        let container_id = env::var("DESKCHAT_STORAGE_CONTAINER")
            .context("Missing storage container. Set DESKCHAT_STORAGE_CONTAINER")?;
        let token = env::var("DESKCHAT_STORAGE_TOKEN").ok();

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            container_id,
        })
    }
}
