use anyhow::{Context, Result};
use crate::errors::{ErrorCode, MirrorError};
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};
pub fn default_settings_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".photomirror").join("settings.json")
    } else if let Ok(user) = std::env::var("USERPROFILE") {
        PathBuf::from(user).join(".photomirror").join("settings.json")
    } else {
        PathBuf::from(".photomirror").join("settings.json")
    }
}
/// Tunables for the sync engine. Every field falls back to its default when
/// missing from a settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorSettings {
    pub discovery_batch_size: usize,
    pub sync_batch_size: usize,
    pub debounce_ms: u64,
    pub poll_interval_ms: u64,
    pub poll_sample_size: usize,
    pub hash_prefix_bytes: usize,
    pub event_capacity: usize,
}
impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            discovery_batch_size: 50,
            sync_batch_size: 10,
            debounce_ms: 2_000,
            poll_interval_ms: 5_000,
            poll_sample_size: 50,
            hash_prefix_bytes: 64 * 1024,
            event_capacity: 256,
        }
    }
}
impl MirrorSettings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("cannot read settings file {:?}", path))?;
        let settings = serde_json::from_str(&data)
            .map_err(|e| {
                MirrorError::new(ErrorCode::InvalidConfiguration, e.to_string())
                    .with_context("path", &path.display().to_string())
            })?;
        Ok(settings)
    }
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("cannot create directory {:?}", parent))?;
            }
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)
            .with_context(|| format!("cannot write settings file {:?}", path))?;
        Ok(())
    }
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
