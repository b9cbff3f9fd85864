//! Membership classification inputs
//!
//! The membership database itself is outside this system; the engine only
//! consumes a read-only projection per member: account status, seasons since
//! last active, and exception tags. `MembershipDirectory` is the seam — the
//! binary feeds it from a roster export file, tests from memory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::SyncError;

/// Membership status in the authoritative database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatus {
    /// Dues-paying member of the current season
    Active,
    /// Former member in good standing
    Alumni,
    /// Membership lapsed without alumni standing
    Lapsed,
}

/// Read-only classification input for one member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipRecord {
    /// Case-insensitive join key against workspace accounts
    pub email: String,
    pub status: MembershipStatus,
    /// Seasons since the member was last active
    #[serde(default)]
    pub tenure_gap: u32,
    /// Free-form tags; some are configured as sync exceptions
    #[serde(default)]
    pub tags: HashSet<String>,
}

impl MembershipRecord {
    pub fn normalized_email(&self) -> String {
        ridgeline_common::normalize_email(&self.email)
    }
}

/// Read-only query surface over the membership database.
#[async_trait::async_trait]
pub trait MembershipDirectory: Send + Sync {
    /// Classification inputs for every current and former member.
    async fn classification_inputs(&self) -> Result<Vec<MembershipRecord>, SyncError>;
}

/// Fixed in-memory directory, used by tests and fixtures.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    records: Vec<MembershipRecord>,
}

impl InMemoryDirectory {
    pub fn new(records: Vec<MembershipRecord>) -> Self {
        Self { records }
    }
}

#[async_trait::async_trait]
impl MembershipDirectory for InMemoryDirectory {
    async fn classification_inputs(&self) -> Result<Vec<MembershipRecord>, SyncError> {
        Ok(self.records.clone())
    }
}

/// Directory backed by a JSON roster export, read fresh on every run.
#[derive(Debug, Clone)]
pub struct JsonFileDirectory {
    path: PathBuf,
}

impl JsonFileDirectory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl MembershipDirectory for JsonFileDirectory {
    async fn classification_inputs(&self) -> Result<Vec<MembershipRecord>, SyncError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SyncError::Directory(format!(
                "Failed to read membership roster {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let records: Vec<MembershipRecord> = serde_json::from_str(&raw).map_err(|e| {
            SyncError::Directory(format!(
                "Malformed membership roster {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(count = records.len(), "Loaded membership roster");
        Ok(records)
    }
}
