//! Live `WorkspaceAdminPort` implementation over `AdminTransport`
//!
//! Translates the port's typed operations into admin API methods and
//! validates each response into a typed structure immediately, so untyped
//! payloads never leave this module.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::transport::AdminTransport;
use crate::{ChannelInfo, TeamInfo, WorkspaceAccount, WorkspaceAdminPort, WorkspaceError, WorkspaceRole};

/// Page size for roster and channel listings.
const PAGE_LIMIT: u32 = 200;

#[derive(Debug, Deserialize)]
struct TeamInfoResponse {
    team: TeamWire,
}

#[derive(Debug, Deserialize)]
struct TeamWire {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    channels: Vec<ChannelWire>,
    #[serde(default)]
    response_metadata: PageMetadata,
}

#[derive(Debug, Deserialize)]
struct ChannelWire {
    id: String,
    name: String,
    #[serde(default)]
    is_private: bool,
}

#[derive(Debug, Deserialize)]
struct RosterResponse {
    members: Vec<WorkspaceAccount>,
    #[serde(default)]
    response_metadata: PageMetadata,
}

#[derive(Debug, Deserialize)]
struct AccountChannelsResponse {
    channels: Vec<String>,
    #[serde(default)]
    response_metadata: PageMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct PageMetadata {
    #[serde(default)]
    next_cursor: String,
}

impl PageMetadata {
    fn cursor(&self) -> Option<&str> {
        if self.next_cursor.is_empty() {
            None
        } else {
            Some(&self.next_cursor)
        }
    }
}

/// Live admin API client.
pub struct AdminClient {
    transport: AdminTransport,
}

impl AdminClient {
    pub fn new(transport: AdminTransport) -> Self {
        Self { transport }
    }

    fn parse<T: serde::de::DeserializeOwned>(
        method: &str,
        value: Value,
    ) -> Result<T, WorkspaceError> {
        serde_json::from_value(value).map_err(|e| {
            WorkspaceError::Response(format!("Malformed {} response: {}", method, e))
        })
    }
}

#[async_trait::async_trait]
impl WorkspaceAdminPort for AdminClient {
    async fn validate_credentials(&self) -> Result<(), WorkspaceError> {
        self.transport.validate_credentials().await
    }

    async fn team_info(&self) -> Result<TeamInfo, WorkspaceError> {
        let value = self
            .transport
            .call("team.info", json!({}), "team lookup", false)
            .await?;
        let response: TeamInfoResponse = Self::parse("team.info", value)?;
        Ok(TeamInfo {
            id: response.team.id,
            name: response.team.name,
        })
    }

    async fn list_channels(&self) -> Result<Vec<ChannelInfo>, WorkspaceError> {
        let mut channels = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut payload = json!({ "limit": PAGE_LIMIT, "exclude_archived": true });
            if let Some(ref c) = cursor {
                payload["cursor"] = json!(c);
            }

            let value = self
                .transport
                .call("conversations.list", payload, "channel catalog", false)
                .await?;
            let page: ChannelListResponse = Self::parse("conversations.list", value)?;

            channels.extend(page.channels.into_iter().map(|c| ChannelInfo {
                id: c.id,
                name: c.name,
                is_public: !c.is_private,
            }));

            match page.response_metadata.cursor() {
                Some(next) => cursor = Some(next.to_string()),
                None => break,
            }
        }

        tracing::debug!(count = channels.len(), "Fetched channel catalog");
        Ok(channels)
    }

    async fn list_accounts(&self) -> Result<Vec<WorkspaceAccount>, WorkspaceError> {
        let mut accounts = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut payload = json!({ "limit": PAGE_LIMIT });
            if let Some(ref c) = cursor {
                payload["cursor"] = json!(c);
            }

            let value = self
                .transport
                .call("users.list", payload, "roster fetch", false)
                .await?;
            let page: RosterResponse = Self::parse("users.list", value)?;
            accounts.extend(page.members);

            match page.response_metadata.cursor() {
                Some(next) => cursor = Some(next.to_string()),
                None => break,
            }
        }

        tracing::debug!(count = accounts.len(), "Fetched workspace roster");
        Ok(accounts)
    }

    async fn account_channels(&self, account_id: &str) -> Result<HashSet<String>, WorkspaceError> {
        let mut channel_ids = HashSet::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut payload = json!({ "user": account_id, "limit": PAGE_LIMIT });
            if let Some(ref c) = cursor {
                payload["cursor"] = json!(c);
            }

            let context = format!("channel memberships for {}", account_id);
            let value = self
                .transport
                .call("users.conversations", payload, &context, false)
                .await?;
            let page: AccountChannelsResponse = Self::parse("users.conversations", value)?;
            channel_ids.extend(page.channels);

            match page.response_metadata.cursor() {
                Some(next) => cursor = Some(next.to_string()),
                None => break,
            }
        }

        Ok(channel_ids)
    }

    async fn set_role(
        &self,
        account_id: &str,
        role: WorkspaceRole,
        channels: &[String],
        dry_run: bool,
    ) -> Result<(), WorkspaceError> {
        let (method, payload) = match role {
            WorkspaceRole::Member => {
                if !channels.is_empty() {
                    return Err(WorkspaceError::Configuration(
                        "Full-member role change does not accept a channel list".to_string(),
                    ));
                }
                ("users.admin.setRegular", json!({ "user": account_id }))
            }
            WorkspaceRole::Restricted => (
                "users.admin.setRestricted",
                json!({ "user": account_id, "channels": channels.join(",") }),
            ),
            WorkspaceRole::UltraRestricted => (
                "users.admin.setUltraRestricted",
                json!({ "user": account_id, "channels": channels.join(",") }),
            ),
        };

        let context = format!("role change to {} for {}", role, account_id);
        self.transport
            .call(method, payload, &context, dry_run)
            .await
            .map(|_| ())
    }

    async fn reactivate(
        &self,
        account_id: &str,
        role: WorkspaceRole,
        channels: &[String],
        dry_run: bool,
    ) -> Result<(), WorkspaceError> {
        let payload = json!({
            "user": account_id,
            "role": role.as_wire(),
            "channels": channels.join(","),
        });
        let context = format!("reactivation as {} for {}", role, account_id);
        self.transport
            .call("users.admin.reactivate", payload, &context, dry_run)
            .await
            .map(|_| ())
    }

    async fn add_to_channel(
        &self,
        account_id: &str,
        channel_id: &str,
        dry_run: bool,
    ) -> Result<(), WorkspaceError> {
        let payload = json!({ "channel": channel_id, "users": account_id });
        let context = format!("add {} to {}", account_id, channel_id);
        self.transport
            .call("conversations.invite", payload, &context, dry_run)
            .await
            .map(|_| ())
    }

    async fn remove_from_channel(
        &self,
        account_id: &str,
        channel_id: &str,
        dry_run: bool,
    ) -> Result<(), WorkspaceError> {
        let payload = json!({ "channel": channel_id, "user": account_id });
        let context = format!("remove {} from {}", account_id, channel_id);
        self.transport
            .call("conversations.kick", payload, &context, dry_run)
            .await
            .map(|_| ())
    }

    async fn invite(
        &self,
        email: &str,
        channels: &[String],
        message: &str,
        dry_run: bool,
    ) -> Result<(), WorkspaceError> {
        let payload = json!({
            "email": email,
            "channels": channels.join(","),
            "custom_message": message,
        });
        let context = format!("invitation for {}", email);
        self.transport
            .call("users.admin.invite", payload, &context, dry_run)
            .await
            .map(|_| ())
    }
}
