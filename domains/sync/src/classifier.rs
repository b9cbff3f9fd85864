//! Tier classification
//!
//! Pure, total mapping from membership state to workspace tier, plus the
//! exclusion predicates for records and accounts. Every record maps to
//! exactly one tier; exclusion is checked by callers before tier lookup.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use ridgeline_common::normalize_email;
use ridgeline_workspace::{WorkspaceAccount, WorkspaceRole};

use crate::membership::{MembershipRecord, MembershipStatus};

/// Alumni within this many seasons of activity keep multi-channel access.
pub const RECENT_ALUMNI_SEASONS: u32 = 2;

/// Target permission level for a workspace account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Full,
    MultiChannel,
    SingleChannel,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::MultiChannel => write!(f, "multi_channel"),
            Self::SingleChannel => write!(f, "single_channel"),
        }
    }
}

/// Map a membership record to its target tier.
///
/// Total over every `{status, tenure_gap}` combination. Callers must check
/// `is_exception_record` first; exception records are excluded from
/// management, not classified.
pub fn tier_for(record: &MembershipRecord) -> Tier {
    match record.status {
        MembershipStatus::Active => Tier::Full,
        MembershipStatus::Alumni => {
            if record.tenure_gap <= RECENT_ALUMNI_SEASONS {
                Tier::MultiChannel
            } else {
                Tier::SingleChannel
            }
        }
        MembershipStatus::Lapsed => Tier::SingleChannel,
    }
}

/// 1:1 mapping from tier to the platform's native role.
pub fn role_for(tier: Tier) -> WorkspaceRole {
    match tier {
        Tier::Full => WorkspaceRole::Member,
        Tier::MultiChannel => WorkspaceRole::Restricted,
        Tier::SingleChannel => WorkspaceRole::UltraRestricted,
    }
}

/// True if the record carries any configured exception tag.
pub fn is_exception_record(record: &MembershipRecord, exception_tags: &[String]) -> bool {
    exception_tags.iter().any(|tag| record.tags.contains(tag))
}

/// True if the account is excluded from automated management:
/// administrators, owners, bots, and tag-flagged members stay manual.
pub fn is_excluded_account(
    account: &WorkspaceAccount,
    exception_emails: &HashSet<String>,
) -> bool {
    if account.is_admin || account.is_owner || account.is_bot {
        return true;
    }
    account
        .email
        .as_deref()
        .map(|email| exception_emails.contains(&normalize_email(email)))
        .unwrap_or(false)
}
