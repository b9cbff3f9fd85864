//! Workspace invitations for unmatched full members
//!
//! Members entitled to full access who have no workspace account at all get
//! one invitation carrying the full tier's channel set and the configured
//! message. Deduplication only happens within one run's snapshot: a member
//! invited last run who has not joined yet will be invited again (known
//! limitation of the admin API, which offers no pending-invite listing).

use ridgeline_workspace::{WorkspaceAdminPort, WorkspaceError};

use crate::membership::MembershipRecord;
use crate::result::SyncResult;

pub struct Inviter<'a> {
    port: &'a dyn WorkspaceAdminPort,
    dry_run: bool,
}

impl<'a> Inviter<'a> {
    pub fn new(port: &'a dyn WorkspaceAdminPort, dry_run: bool) -> Self {
        Self { port, dry_run }
    }

    /// Invite every unmatched full-tier record.
    ///
    /// Per-record failures are recorded and iteration continues; fatal auth
    /// expiry propagates so the engine can abort the run.
    pub async fn invite_missing(
        &self,
        unmatched: &[&MembershipRecord],
        full_channels: &[String],
        message: &str,
        result: &mut SyncResult,
    ) -> Result<(), WorkspaceError> {
        for record in unmatched {
            let email = record.normalized_email();
            tracing::info!(email = %email, "Inviting full member without workspace account");

            match self
                .port
                .invite(&email, full_channels, message, self.dry_run)
                .await
            {
                Ok(()) => result.invites_sent += 1,
                Err(e) if e.is_auth_expired() => return Err(e),
                Err(e) => result.record_error(format!("invitation for {}: {}", email, e)),
            }
        }
        Ok(())
    }
}
