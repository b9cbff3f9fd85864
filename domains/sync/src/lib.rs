//! Sync domain: workspace role/channel reconciliation engine
//!
//! Keeps the club workspace's per-account permission tier and channel
//! subscriptions synchronized with the authoritative membership database.
//! Runs as a discrete batch job: every run fetches a fresh snapshot, computes
//! minimal diffs per account, and applies them sequentially through the
//! `WorkspaceAdminPort`. Re-running with no underlying changes yields zero
//! operations; dry runs compute and count everything without mutating.

pub mod classifier;
pub mod config;
pub mod engine;
pub mod inviter;
pub mod membership;
pub mod reconciler;
pub mod result;
pub mod snapshot;

use thiserror::Error;

pub use classifier::{is_exception_record, is_excluded_account, role_for, tier_for, Tier};
pub use config::{SyncConfig, SyncConfigStore, TierChannelNames};
pub use engine::SyncEngine;
pub use membership::{
    InMemoryDirectory, JsonFileDirectory, MembershipDirectory, MembershipRecord, MembershipStatus,
};
pub use result::SyncResult;
pub use snapshot::{DirectorySnapshot, TierTargets};

use ridgeline_workspace::WorkspaceError;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Sync configuration error: {0}")]
    Config(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Membership directory error: {0}")]
    Directory(String),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}
