//! Mock Workspace Port Implementation
//!
//! Provides an in-memory workspace for testing the sync engine without
//! network access. The mock holds a programmable roster, channel catalog,
//! and membership map; mutations are applied to that state (so consecutive
//! runs observe their own effects) and every call is recorded for
//! assertions. Failures can be injected per port method.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::{
    ChannelInfo, TeamInfo, WorkspaceAccount, WorkspaceAdminPort, WorkspaceError, WorkspaceRole,
};

/// A port call captured by the mock.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Port method name (`set_role`, `invite`, ...)
    pub method: String,
    /// Account id, email, or channel id the call targeted
    pub target: String,
    /// Channel ids carried by the call, if any
    pub channels: Vec<String>,
    pub dry_run: bool,
}

/// Failure to inject for a given port method.
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Fatal auth expiry (`WorkspaceError::AuthExpired`)
    AuthExpired,
    /// Recoverable API error with the given code
    Api(String),
}

#[derive(Default)]
struct MockState {
    team: Option<TeamInfo>,
    channels: Vec<ChannelInfo>,
    accounts: Vec<WorkspaceAccount>,
    memberships: HashMap<String, HashSet<String>>,
    invited: Vec<String>,
    calls: Vec<RecordedCall>,
    failures: HashMap<String, MockFailure>,
}

/// Mock workspace port for testing
#[derive(Clone, Default)]
pub struct MockWorkspacePort {
    state: Arc<Mutex<MockState>>,
}

impl MockWorkspacePort {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Programming the workspace state
    // ------------------------------------------------------------------

    pub fn set_team(&self, id: &str, name: &str) {
        self.state.lock().unwrap().team = Some(TeamInfo {
            id: id.to_string(),
            name: name.to_string(),
        });
    }

    pub fn add_channel(&self, id: &str, name: &str, is_public: bool) {
        self.state.lock().unwrap().channels.push(ChannelInfo {
            id: id.to_string(),
            name: name.to_string(),
            is_public,
        });
    }

    pub fn add_account(&self, account: WorkspaceAccount) {
        self.state.lock().unwrap().accounts.push(account);
    }

    pub fn set_account_channels(&self, account_id: &str, channel_ids: &[&str]) {
        self.state.lock().unwrap().memberships.insert(
            account_id.to_string(),
            channel_ids.iter().map(|c| c.to_string()).collect(),
        );
    }

    /// Make every call to the given port method fail.
    pub fn fail_on(&self, method: &str, failure: MockFailure) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(method.to_string(), failure);
    }

    /// Clear an injected failure.
    pub fn clear_failure(&self, method: &str) {
        self.state.lock().unwrap().failures.remove(method);
    }

    // ------------------------------------------------------------------
    // Assertions
    // ------------------------------------------------------------------

    /// All recorded calls, reads excluded.
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Recorded calls for one port method.
    pub fn calls_for(&self, method: &str) -> Vec<RecordedCall> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    /// Number of mutations that actually applied (dry-run calls excluded).
    pub fn mutation_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| !c.dry_run)
            .count()
    }

    /// Emails invited so far.
    pub fn invited_emails(&self) -> Vec<String> {
        self.state.lock().unwrap().invited.clone()
    }

    /// Current channel membership for an account.
    pub fn channels_of(&self, account_id: &str) -> HashSet<String> {
        self.state
            .lock()
            .unwrap()
            .memberships
            .get(account_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Current snapshot of an account.
    pub fn account(&self, account_id: &str) -> Option<WorkspaceAccount> {
        self.state
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| a.id == account_id)
            .cloned()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn check_failure(&self, method: &str) -> Result<(), WorkspaceError> {
        let state = self.state.lock().unwrap();
        match state.failures.get(method) {
            Some(MockFailure::AuthExpired) => {
                Err(WorkspaceError::AuthExpired("invalid_auth".to_string()))
            }
            Some(MockFailure::Api(code)) => Err(WorkspaceError::Api {
                method: method.to_string(),
                code: code.clone(),
            }),
            None => Ok(()),
        }
    }

    fn record(&self, method: &str, target: &str, channels: &[String], dry_run: bool) {
        self.state.lock().unwrap().calls.push(RecordedCall {
            method: method.to_string(),
            target: target.to_string(),
            channels: channels.to_vec(),
            dry_run,
        });
    }

    fn apply_role(state: &mut MockState, account_id: &str, role: WorkspaceRole) {
        if let Some(account) = state.accounts.iter_mut().find(|a| a.id == account_id) {
            account.is_restricted = !matches!(role, WorkspaceRole::Member);
            account.is_ultra_restricted = matches!(role, WorkspaceRole::UltraRestricted);
        }
    }
}

#[async_trait::async_trait]
impl WorkspaceAdminPort for MockWorkspacePort {
    async fn validate_credentials(&self) -> Result<(), WorkspaceError> {
        self.check_failure("validate_credentials")
    }

    async fn team_info(&self) -> Result<TeamInfo, WorkspaceError> {
        self.check_failure("team_info")?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .team
            .clone()
            .unwrap_or_else(|| TeamInfo {
                id: "T000".to_string(),
                name: "ridgeline-test".to_string(),
            }))
    }

    async fn list_channels(&self) -> Result<Vec<ChannelInfo>, WorkspaceError> {
        self.check_failure("list_channels")?;
        Ok(self.state.lock().unwrap().channels.clone())
    }

    async fn list_accounts(&self) -> Result<Vec<WorkspaceAccount>, WorkspaceError> {
        self.check_failure("list_accounts")?;
        Ok(self.state.lock().unwrap().accounts.clone())
    }

    async fn account_channels(&self, account_id: &str) -> Result<HashSet<String>, WorkspaceError> {
        self.check_failure("account_channels")?;
        Ok(self.channels_of(account_id))
    }

    async fn set_role(
        &self,
        account_id: &str,
        role: WorkspaceRole,
        channels: &[String],
        dry_run: bool,
    ) -> Result<(), WorkspaceError> {
        if !dry_run {
            self.check_failure("set_role")?;
        }
        self.record("set_role", account_id, channels, dry_run);
        if !dry_run {
            let mut state = self.state.lock().unwrap();
            Self::apply_role(&mut state, account_id, role);
            // Guest role changes apply their channel set atomically
            if !matches!(role, WorkspaceRole::Member) {
                state.memberships.insert(
                    account_id.to_string(),
                    channels.iter().cloned().collect(),
                );
            }
        }
        Ok(())
    }

    async fn reactivate(
        &self,
        account_id: &str,
        role: WorkspaceRole,
        channels: &[String],
        dry_run: bool,
    ) -> Result<(), WorkspaceError> {
        if !dry_run {
            self.check_failure("reactivate")?;
        }
        self.record("reactivate", account_id, channels, dry_run);
        if !dry_run {
            let mut state = self.state.lock().unwrap();
            if let Some(account) = state.accounts.iter_mut().find(|a| a.id == account_id) {
                account.is_deleted = false;
            }
            Self::apply_role(&mut state, account_id, role);
            state.memberships.insert(
                account_id.to_string(),
                channels.iter().cloned().collect(),
            );
        }
        Ok(())
    }

    async fn add_to_channel(
        &self,
        account_id: &str,
        channel_id: &str,
        dry_run: bool,
    ) -> Result<(), WorkspaceError> {
        if !dry_run {
            self.check_failure("add_to_channel")?;
        }
        self.record(
            "add_to_channel",
            account_id,
            &[channel_id.to_string()],
            dry_run,
        );
        if !dry_run {
            self.state
                .lock()
                .unwrap()
                .memberships
                .entry(account_id.to_string())
                .or_default()
                .insert(channel_id.to_string());
        }
        Ok(())
    }

    async fn remove_from_channel(
        &self,
        account_id: &str,
        channel_id: &str,
        dry_run: bool,
    ) -> Result<(), WorkspaceError> {
        if !dry_run {
            self.check_failure("remove_from_channel")?;
        }
        self.record(
            "remove_from_channel",
            account_id,
            &[channel_id.to_string()],
            dry_run,
        );
        if !dry_run {
            if let Some(members) = self
                .state
                .lock()
                .unwrap()
                .memberships
                .get_mut(account_id)
            {
                members.remove(channel_id);
            }
        }
        Ok(())
    }

    async fn invite(
        &self,
        email: &str,
        channels: &[String],
        message: &str,
        dry_run: bool,
    ) -> Result<(), WorkspaceError> {
        let _ = message;
        if !dry_run {
            self.check_failure("invite")?;
        }
        self.record("invite", email, channels, dry_run);
        if !dry_run {
            self.state.lock().unwrap().invited.push(email.to_string());
        }
        Ok(())
    }
}
