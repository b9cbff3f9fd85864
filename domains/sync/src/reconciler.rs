//! Per-account reconciliation state machine
//!
//! Computes and applies the minimal set of role/channel operations that move
//! one account to its target tier:
//! - deleted account with an authoritative record: one atomic reactivation
//!   carrying role and full channel set, no further diff this run
//! - active guest tiers: at most one role change, channels applied
//!   atomically by the platform alongside it
//! - active full tier: role-only change if needed, then a channel diff
//!   against the snapshot's current set, never removing public channels
//!
//! Each applied call is an independently committed side effect; there is no
//! rollback. Error handling is the caller's job: everything except fatal
//! auth expiry is recorded per account and the run continues.

use ridgeline_workspace::{WorkspaceAccount, WorkspaceAdminPort, WorkspaceError, WorkspaceRole};

use crate::classifier::{role_for, Tier};
use crate::result::SyncResult;
use crate::snapshot::{DirectorySnapshot, TierTargets};

pub struct Reconciler<'a> {
    port: &'a dyn WorkspaceAdminPort,
    snapshot: &'a DirectorySnapshot,
    targets: &'a TierTargets,
    dry_run: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        port: &'a dyn WorkspaceAdminPort,
        snapshot: &'a DirectorySnapshot,
        targets: &'a TierTargets,
        dry_run: bool,
    ) -> Self {
        Self {
            port,
            snapshot,
            targets,
            dry_run,
        }
    }

    /// Reconcile one account toward its target tier.
    ///
    /// `matched` is true when an authoritative membership record backs the
    /// tier; unmatched accounts default to the lowest tier but are never
    /// reactivated from deletion.
    pub async fn reconcile_account(
        &self,
        account: &WorkspaceAccount,
        tier: Tier,
        matched: bool,
        result: &mut SyncResult,
    ) -> Result<(), WorkspaceError> {
        if account.is_deleted {
            return self.reconcile_deleted(account, tier, matched, result).await;
        }

        match tier {
            Tier::MultiChannel | Tier::SingleChannel => {
                self.reconcile_guest(account, tier, result).await
            }
            Tier::Full => self.reconcile_full(account, result).await,
        }
    }

    /// Deleted account: a single reactivation sets role and the complete
    /// target channel set atomically, so no channel diff follows this run.
    async fn reconcile_deleted(
        &self,
        account: &WorkspaceAccount,
        tier: Tier,
        matched: bool,
        result: &mut SyncResult,
    ) -> Result<(), WorkspaceError> {
        if !matched {
            tracing::debug!(account = %account.id, "Deleted account has no membership record, leaving untouched");
            return Ok(());
        }

        let role = role_for(tier);
        let channels = self.targets.for_tier(tier);
        tracing::info!(account = %account.id, tier = %tier, "Reactivating deleted account");
        self.port
            .reactivate(&account.id, role, channels, self.dry_run)
            .await?;
        result.reactivated += 1;
        result.role_changes += 1;
        Ok(())
    }

    /// Guest tiers: one atomic role+channels call when the role differs,
    /// nothing otherwise. No separate channel add/remove calls exist for
    /// these tiers.
    async fn reconcile_guest(
        &self,
        account: &WorkspaceAccount,
        tier: Tier,
        result: &mut SyncResult,
    ) -> Result<(), WorkspaceError> {
        let target_role = role_for(tier);
        if account.current_role() == target_role {
            return Ok(());
        }

        let channels = self.targets.for_tier(tier);
        tracing::info!(account = %account.id, role = %target_role, "Changing account role");
        self.port
            .set_role(&account.id, target_role, channels, self.dry_run)
            .await?;
        result.role_changes += 1;
        Ok(())
    }

    /// Full tier: role-only change when needed, then a channel diff against
    /// the snapshot's current set. Public channels the member joined
    /// manually are never removed.
    async fn reconcile_full(
        &self,
        account: &WorkspaceAccount,
        result: &mut SyncResult,
    ) -> Result<(), WorkspaceError> {
        if account.current_role() != WorkspaceRole::Member {
            tracing::info!(account = %account.id, "Promoting account to full member");
            self.port
                .set_role(&account.id, WorkspaceRole::Member, &[], self.dry_run)
                .await?;
            result.role_changes += 1;
        }

        let current = self.snapshot.current_channels(&account.id);
        let target = self.targets.for_tier(Tier::Full);

        let mut to_add: Vec<&String> =
            target.iter().filter(|id| !current.contains(*id)).collect();
        to_add.sort();

        let mut to_remove: Vec<&String> = current
            .iter()
            .filter(|id| !target.contains(*id) && !self.snapshot.is_public(id))
            .collect();
        to_remove.sort();

        for channel_id in to_add {
            self.port
                .add_to_channel(&account.id, channel_id, self.dry_run)
                .await?;
            result.channel_adds += 1;
        }

        for channel_id in to_remove {
            self.port
                .remove_from_channel(&account.id, channel_id, self.dry_run)
                .await?;
            result.channel_removals += 1;
        }

        Ok(())
    }
}
