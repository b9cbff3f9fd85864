//! Ridgeline Workspace Admin Client
//!
//! Provides access to the chat workspace's unofficial admin API:
//! - Cookie/session-authenticated transport with retry and fatal-auth detection
//! - Narrow `WorkspaceAdminPort` capability trait consumed by the sync engine
//! - Live `AdminClient` implementation over the transport
//! - Programmable mock for testing without network access
//!
//! The admin surface is unofficial and can break without notice; everything
//! that touches its wire format stays inside this crate so the sync engine
//! only sees the port trait.

pub mod client;
pub mod config;
pub mod mock;
pub mod transport;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::AdminClient;
pub use config::{WorkspaceConfig, WorkspaceCredentials};
pub use mock::MockWorkspacePort;
pub use transport::{AdminTransport, RetryPolicy};

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Workspace configuration error: {0}")]
    Configuration(String),

    #[error("Workspace request error: {0}")]
    Request(String),

    #[error("Workspace response error: {0}")]
    Response(String),

    #[error("Workspace API error from {method}: {code}")]
    Api { method: String, code: String },

    #[error("Workspace admin credentials expired or revoked: {0}")]
    AuthExpired(String),
}

impl WorkspaceError {
    /// True for the fatal-auth signal that makes all further calls pointless.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, WorkspaceError::AuthExpired(_))
    }
}

/// Native permission level of a workspace account.
///
/// `Restricted` is a multi-channel guest, `UltraRestricted` a single-channel
/// guest; the two restriction flags on an account jointly encode this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceRole {
    Member,
    Restricted,
    UltraRestricted,
}

impl WorkspaceRole {
    /// Wire name used by the admin API's reactivation call.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Member => "regular",
            Self::Restricted => "restricted",
            Self::UltraRestricted => "ultra_restricted",
        }
    }
}

impl std::fmt::Display for WorkspaceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Member => write!(f, "member"),
            Self::Restricted => write!(f, "restricted"),
            Self::UltraRestricted => write!(f, "ultra_restricted"),
        }
    }
}

/// Workspace team identity fetched once per sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamInfo {
    pub id: String,
    pub name: String,
}

/// A channel as listed by the workspace catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    pub name: String,
    pub is_public: bool,
}

/// A workspace account as returned by the roster listing.
///
/// This is a live snapshot row, not owned by Ridgeline; it is discarded at
/// the end of each sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceAccount {
    pub id: String,
    /// Bots and some legacy accounts have no email on file.
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_owner: bool,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub is_restricted: bool,
    #[serde(default)]
    pub is_ultra_restricted: bool,
}

impl WorkspaceAccount {
    /// Decode the account's current role from its restriction flags.
    ///
    /// `is_ultra_restricted` implies `is_restricted` on the platform, so it
    /// is checked first.
    pub fn current_role(&self) -> WorkspaceRole {
        if self.is_ultra_restricted {
            WorkspaceRole::UltraRestricted
        } else if self.is_restricted {
            WorkspaceRole::Restricted
        } else {
            WorkspaceRole::Member
        }
    }
}

/// Narrow capability port over the workspace admin API.
///
/// The sync engine depends only on this trait, so the fragile unofficial
/// transport can be swapped or mocked without touching reconciliation logic.
/// Read operations ignore dry-run (a dry run still needs a real snapshot);
/// every mutation takes an explicit `dry_run` flag that is honored before
/// any network I/O.
#[async_trait::async_trait]
pub trait WorkspaceAdminPort: Send + Sync {
    /// One lightweight read-only call classifying current credentials.
    async fn validate_credentials(&self) -> Result<(), WorkspaceError>;

    async fn team_info(&self) -> Result<TeamInfo, WorkspaceError>;

    async fn list_channels(&self) -> Result<Vec<ChannelInfo>, WorkspaceError>;

    async fn list_accounts(&self) -> Result<Vec<WorkspaceAccount>, WorkspaceError>;

    /// Channel ids the account currently belongs to.
    async fn account_channels(&self, account_id: &str) -> Result<HashSet<String>, WorkspaceError>;

    /// Change an account's role. For guest roles the platform applies the
    /// channel list atomically with the role change; for `Member` the list
    /// must be empty (the platform rejects it otherwise).
    async fn set_role(
        &self,
        account_id: &str,
        role: WorkspaceRole,
        channels: &[String],
        dry_run: bool,
    ) -> Result<(), WorkspaceError>;

    /// Reactivate a deleted account, setting role and full channel set in
    /// one platform-side atomic call.
    async fn reactivate(
        &self,
        account_id: &str,
        role: WorkspaceRole,
        channels: &[String],
        dry_run: bool,
    ) -> Result<(), WorkspaceError>;

    async fn add_to_channel(
        &self,
        account_id: &str,
        channel_id: &str,
        dry_run: bool,
    ) -> Result<(), WorkspaceError>;

    async fn remove_from_channel(
        &self,
        account_id: &str,
        channel_id: &str,
        dry_run: bool,
    ) -> Result<(), WorkspaceError>;

    /// Invite an email address to the workspace with an initial channel set
    /// and a custom message.
    async fn invite(
        &self,
        email: &str,
        channels: &[String],
        message: &str,
        dry_run: bool,
    ) -> Result<(), WorkspaceError>;
}

/// Factory for creating `WorkspaceAdminPort` implementations
pub struct WorkspacePortFactory;

impl WorkspacePortFactory {
    pub fn create(config: WorkspaceConfig) -> Result<Box<dyn WorkspaceAdminPort>, WorkspaceError> {
        match config.provider.as_str() {
            "admin" => {
                tracing::info!("Creating live workspace admin client");
                let credentials = config.credentials.ok_or_else(|| {
                    WorkspaceError::Configuration(
                        "Admin provider requires workspace credentials".to_string(),
                    )
                })?;
                let transport =
                    AdminTransport::new(config.base_url, credentials, RetryPolicy::default());
                Ok(Box::new(AdminClient::new(transport)))
            }
            "mock" => {
                tracing::info!("Creating mock workspace port");
                Ok(Box::new(MockWorkspacePort::new()))
            }
            provider => Err(WorkspaceError::Configuration(format!(
                "Unknown workspace provider: {}. Supported providers: admin, mock",
                provider
            ))),
        }
    }
}
