//! Sync run orchestration
//!
//! `SyncEngine::run` is the only entry point exposed to scheduling and
//! admin-trigger code. It never returns an error: configuration, credential,
//! and mid-run failures are all encoded in the returned `SyncResult`.
//!
//! A run is strictly sequential — the admin API is rate-limited and a role
//! change must be fully applied before any dependent channel-diff decision,
//! so accounts are never processed concurrently.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use ridgeline_common::normalize_email;
use ridgeline_workspace::WorkspaceAdminPort;

use crate::classifier::{is_excluded_account, is_exception_record, tier_for, Tier};
use crate::config::SyncConfigStore;
use crate::inviter::Inviter;
use crate::membership::{MembershipDirectory, MembershipRecord};
use crate::reconciler::Reconciler;
use crate::result::SyncResult;
use crate::snapshot::DirectorySnapshot;

pub struct SyncEngine {
    config_store: SyncConfigStore,
    directory: Arc<dyn MembershipDirectory>,
    port: Arc<dyn WorkspaceAdminPort>,
}

impl SyncEngine {
    pub fn new(
        config_store: SyncConfigStore,
        directory: Arc<dyn MembershipDirectory>,
        port: Arc<dyn WorkspaceAdminPort>,
    ) -> Self {
        Self {
            config_store,
            directory,
            port,
        }
    }

    /// Run one sync.
    ///
    /// `dry_run_override` takes precedence over the configured default when
    /// given. All failure modes are encoded in the result; the partial
    /// counts of an aborted run are preserved.
    pub async fn run(&self, dry_run_override: Option<bool>) -> SyncResult {
        let config = match self.config_store.load() {
            Ok(config) => config,
            Err(e) => {
                // No config: assume dry-run for the result shell
                let mut result = SyncResult::new(dry_run_override.unwrap_or(true));
                result.record_error(e.to_string());
                result.finish();
                return result;
            }
        };

        let dry_run = dry_run_override.unwrap_or(config.dry_run);
        let mut result = SyncResult::new(dry_run);
        tracing::info!(dry_run = dry_run, "Starting workspace sync run");

        if let Err(e) = self.port.validate_credentials().await {
            result.record_error(format!("credential validation failed: {}", e));
            result.finish();
            return result;
        }

        let records = match self.directory.classification_inputs().await {
            Ok(records) => records,
            Err(e) => {
                result.record_error(e.to_string());
                result.finish();
                return result;
            }
        };

        // Join index and exclusion sets, keyed by normalized email
        let mut records_by_email: HashMap<String, &MembershipRecord> = HashMap::new();
        let mut exception_emails: HashSet<String> = HashSet::new();
        let mut expected_full_emails: HashSet<String> = HashSet::new();
        for record in &records {
            let email = record.normalized_email();
            if is_exception_record(record, &config.exception_tags) {
                exception_emails.insert(email.clone());
            } else if tier_for(record) == Tier::Full {
                expected_full_emails.insert(email.clone());
            }
            records_by_email.insert(email, record);
        }

        let snapshot = match DirectorySnapshot::fetch(self.port.as_ref(), &expected_full_emails)
            .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                result.record_error(format!("snapshot fetch failed: {}", e));
                result.finish();
                return result;
            }
        };

        let targets = match snapshot.resolve_targets(&config.channels) {
            Ok(targets) => targets,
            Err(e) => {
                result.record_error(e.to_string());
                result.finish();
                return result;
            }
        };

        let reconciler = Reconciler::new(self.port.as_ref(), &snapshot, &targets, dry_run);
        let mut aborted = false;

        for account in &snapshot.accounts {
            if is_excluded_account(account, &exception_emails) {
                result.skipped += 1;
                continue;
            }

            let email = account.email.as_deref().map(normalize_email);
            let record = email.as_deref().and_then(|e| records_by_email.get(e).copied());
            let (tier, matched) = match record {
                Some(record) => (tier_for(record), true),
                // Unknown externals are treated as lowest-privilege members
                None => (Tier::SingleChannel, false),
            };

            match reconciler
                .reconcile_account(account, tier, matched, &mut result)
                .await
            {
                Ok(()) => result.processed += 1,
                Err(e) if e.is_auth_expired() => {
                    result.record_error(format!("run aborted, admin session expired: {}", e));
                    aborted = true;
                    break;
                }
                Err(e) => {
                    let identity = account
                        .email
                        .clone()
                        .unwrap_or_else(|| account.id.clone());
                    result.record_error(format!("account {}: {}", identity, e));
                }
            }
        }

        if !aborted {
            let roster_emails: HashSet<String> = snapshot
                .accounts
                .iter()
                .filter_map(|a| a.email.as_deref().map(normalize_email))
                .collect();

            let unmatched: Vec<&MembershipRecord> = records
                .iter()
                .filter(|record| {
                    !is_exception_record(record, &config.exception_tags)
                        && tier_for(record) == Tier::Full
                        && !roster_emails.contains(&record.normalized_email())
                })
                .collect();

            let inviter = Inviter::new(self.port.as_ref(), dry_run);
            if let Err(e) = inviter
                .invite_missing(
                    &unmatched,
                    targets.for_tier(Tier::Full),
                    &config.invitation_message,
                    &mut result,
                )
                .await
            {
                result.record_error(format!("run aborted, admin session expired: {}", e));
            }
        }

        result.finish();
        tracing::info!(summary = %result.summary(), "Workspace sync run complete");
        result
    }
}
