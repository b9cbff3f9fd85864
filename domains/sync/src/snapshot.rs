//! Directory snapshot
//!
//! One snapshot is fetched per run: team identity, channel catalog, full
//! roster, and current channel memberships for the accounts whose target
//! tier is full (the only tier reconciled channel-by-channel). The snapshot
//! is discarded when the run ends; idempotency comes from recomputing diffs
//! against fresh state, never from persisted markers.

use std::collections::{HashMap, HashSet};

use ridgeline_common::normalize_email;
use ridgeline_workspace::{ChannelInfo, TeamInfo, WorkspaceAccount, WorkspaceAdminPort};

use crate::classifier::Tier;
use crate::config::TierChannelNames;
use crate::SyncError;

/// Channel-id sets resolved from configured names, per tier.
#[derive(Debug, Clone)]
pub struct TierTargets {
    pub full: Vec<String>,
    pub multi_channel: Vec<String>,
    pub single_channel: Vec<String>,
}

impl TierTargets {
    pub fn for_tier(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::Full => &self.full,
            Tier::MultiChannel => &self.multi_channel,
            Tier::SingleChannel => &self.single_channel,
        }
    }
}

/// Per-run snapshot of external workspace state.
pub struct DirectorySnapshot {
    pub team: TeamInfo,
    /// Channel catalog keyed by name
    pub catalog: HashMap<String, ChannelInfo>,
    /// Same catalog keyed by id, for public-channel lookups during removal
    pub channels_by_id: HashMap<String, ChannelInfo>,
    pub accounts: Vec<WorkspaceAccount>,
    /// Current channel ids per account id, fetched only for expected full members
    pub memberships: HashMap<String, HashSet<String>>,
}

impl DirectorySnapshot {
    /// Fetch the snapshot through the port.
    ///
    /// `expected_full_emails` holds normalized emails of members whose target
    /// tier is full; only their channel memberships are fetched, since guest
    /// tiers are applied atomically and need no diff.
    pub async fn fetch(
        port: &dyn WorkspaceAdminPort,
        expected_full_emails: &HashSet<String>,
    ) -> Result<Self, SyncError> {
        let team = port.team_info().await?;
        let channels = port.list_channels().await?;
        let accounts = port.list_accounts().await?;

        let mut catalog = HashMap::new();
        let mut channels_by_id = HashMap::new();
        for channel in channels {
            channels_by_id.insert(channel.id.clone(), channel.clone());
            catalog.insert(channel.name.clone(), channel);
        }

        let mut memberships = HashMap::new();
        for account in &accounts {
            if account.is_deleted || account.is_bot {
                continue;
            }
            let expected_full = account
                .email
                .as_deref()
                .map(|email| expected_full_emails.contains(&normalize_email(email)))
                .unwrap_or(false);
            if expected_full {
                let current = port.account_channels(&account.id).await?;
                memberships.insert(account.id.clone(), current);
            }
        }

        tracing::info!(
            team = %team.id,
            channels = catalog.len(),
            accounts = accounts.len(),
            memberships = memberships.len(),
            "Directory snapshot fetched"
        );

        Ok(Self {
            team,
            catalog,
            channels_by_id,
            accounts,
            memberships,
        })
    }

    /// Resolve configured channel names into per-tier id sets.
    ///
    /// A configured name missing from the catalog is an invariant violation
    /// in the policy file and fails the run before any account is touched.
    pub fn resolve_targets(&self, names: &TierChannelNames) -> Result<TierTargets, SyncError> {
        Ok(TierTargets {
            full: self.resolve_names(&names.full, "full")?,
            multi_channel: self.resolve_names(&names.multi_channel, "multi_channel")?,
            single_channel: self.resolve_names(&names.single_channel, "single_channel")?,
        })
    }

    fn resolve_names(&self, names: &[String], tier: &str) -> Result<Vec<String>, SyncError> {
        names
            .iter()
            .map(|name| {
                self.catalog
                    .get(name)
                    .map(|channel| channel.id.clone())
                    .ok_or_else(|| {
                        SyncError::Validation(format!(
                            "Configured {} channel '{}' does not exist in the workspace",
                            tier, name
                        ))
                    })
            })
            .collect()
    }

    /// Whether a channel id refers to a public channel. Unknown ids are
    /// treated as non-public (removable); the catalog is authoritative for
    /// the duration of the run.
    pub fn is_public(&self, channel_id: &str) -> bool {
        self.channels_by_id
            .get(channel_id)
            .map(|channel| channel.is_public)
            .unwrap_or(false)
    }

    /// Current channel set for an account, empty when none was fetched.
    pub fn current_channels(&self, account_id: &str) -> HashSet<String> {
        self.memberships
            .get(account_id)
            .cloned()
            .unwrap_or_default()
    }
}
