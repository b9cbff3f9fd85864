//! Declarative sync policy configuration
//!
//! The policy file maps each tier to a set of channel names, lists the
//! membership tags that exempt a member from automated management, carries
//! the invitation text, and sets the default dry-run flag. It is loaded once
//! per store, cached, and explicitly reloadable — there is no module-level
//! singleton, so tests can construct isolated stores.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::SyncError;

/// Channel names configured per tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierChannelNames {
    pub full: Vec<String>,
    pub multi_channel: Vec<String>,
    pub single_channel: Vec<String>,
}

fn default_dry_run() -> bool {
    // Unconfigured runs preview instead of mutate
    true
}

/// The declarative sync policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    pub channels: TierChannelNames,
    #[serde(default)]
    pub exception_tags: Vec<String>,
    pub invitation_message: String,
}

/// Loads and caches the sync policy from a JSON file.
pub struct SyncConfigStore {
    path: PathBuf,
    cached: RwLock<Option<SyncConfig>>,
}

impl SyncConfigStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cached: RwLock::new(None),
        }
    }

    /// Return the cached policy, reading the file on first use.
    pub fn load(&self) -> Result<SyncConfig, SyncError> {
        if let Some(config) = self.cached.read().unwrap().clone() {
            return Ok(config);
        }
        self.reload()
    }

    /// Re-read the policy file, replacing the cache.
    pub fn reload(&self) -> Result<SyncConfig, SyncError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            SyncError::Config(format!(
                "Failed to read sync config {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let config: SyncConfig = serde_json::from_str(&raw).map_err(|e| {
            SyncError::Config(format!(
                "Malformed sync config {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %self.path.display(), "Sync config loaded");
        *self.cached.write().unwrap() = Some(config.clone());
        Ok(config)
    }
}
