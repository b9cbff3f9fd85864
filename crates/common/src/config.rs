//! Configuration management following 12-factor app principles
//!
//! All runtime configuration is loaded from environment variables to ensure
//! clean separation between code and config. The declarative sync policy
//! (tier channel mappings, exception tags, invitation text) lives in a JSON
//! file referenced by `SYNC_CONFIG_PATH`; see `ridgeline-sync`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the declarative sync policy file (JSON)
    pub sync_config_path: String,

    /// Path to the membership roster export consumed by the sync binary
    pub membership_roster_path: String,

    /// Runtime configuration
    pub log_level: String,
    pub rust_log: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            sync_config_path: env::var("SYNC_CONFIG_PATH")
                .map_err(|_| anyhow::anyhow!("SYNC_CONFIG_PATH is required"))?,

            membership_roster_path: env::var("MEMBERSHIP_ROSTER_PATH")
                .map_err(|_| anyhow::anyhow!("MEMBERSHIP_ROSTER_PATH is required"))?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "ridgeline=debug".to_string()),
        };

        Ok(config)
    }
}
