// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Settings come from a YAML file (`$HILITE_CONFIG`, else `hilite.yaml` in
//! the working directory) with environment overrides for the backend.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "hilite.yaml";

/// Connection settings for the detection backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    /// Uploads run detection server-side, so this is generous.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 300,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    /// Maximum number of video frames kept in memory.
    pub frame_cache_capacity: usize,
    /// Lifetime of non-persistent notices.
    pub notice_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            frame_cache_capacity: 64,
            notice_timeout_secs: 5,
        }
    }
}

impl AppConfig {
    /// Load from the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var("HILITE_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            });

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_yaml::from_str(&yaml)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `HILITE_BACKEND_URL` / `HILITE_TIMEOUT_SECS` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("HILITE_BACKEND_URL") {
            self.backend.base_url = url;
        }
        match lookup("HILITE_TIMEOUT_SECS").map(|s| s.parse::<u64>()) {
            Some(Ok(secs)) => self.backend.timeout_secs = secs,
            Some(Err(e)) => log::warn!("Ignoring invalid HILITE_TIMEOUT_SECS: {}", e),
            None => {}
        }
    }

    pub fn notice_timeout(&self) -> Duration {
        Duration::from_secs(self.notice_timeout_secs)
    }
}
