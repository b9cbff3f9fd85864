//! Run-scoped sync result aggregate
//!
//! Created fresh per run, owned exclusively by that run, never persisted.
//! The caller always receives this structure — expected failure modes are
//! encoded in `errors`, never raised.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counters and errors accumulated by one sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    pub dry_run: bool,
    /// Accounts fully reconciled (excluded accounts count as skipped instead)
    pub processed: u32,
    pub reactivated: u32,
    pub role_changes: u32,
    pub channel_adds: u32,
    pub channel_removals: u32,
    pub invites_sent: u32,
    pub skipped: u32,
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SyncResult {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            processed: 0,
            reactivated: 0,
            role_changes: 0,
            channel_adds: 0,
            channel_removals: 0,
            invites_sent: 0,
            skipped: 0,
            errors: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(error = %message, "Sync error recorded");
        self.errors.push(message);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Total state-changing operations this run performed (or would have,
    /// in a dry run). Zero on a re-run with no underlying changes.
    pub fn diff_operations(&self) -> u32 {
        self.role_changes + self.channel_adds + self.channel_removals + self.reactivated
    }

    /// One-line summary for operator logs.
    pub fn summary(&self) -> String {
        format!(
            "{}processed={} reactivated={} role_changes={} channel_adds={} channel_removals={} invites_sent={} skipped={} errors={}",
            if self.dry_run { "[dry run] " } else { "" },
            self.processed,
            self.reactivated,
            self.role_changes,
            self.channel_adds,
            self.channel_removals,
            self.invites_sent,
            self.skipped,
            self.errors.len(),
        )
    }
}
