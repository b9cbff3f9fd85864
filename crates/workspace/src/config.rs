//! Workspace admin credentials and client configuration
//!
//! The admin API is session-authenticated: it needs an admin token, the
//! admin's browser session cookie, and a client identifier. All three are
//! environment-sourced and all three are required for the live provider —
//! a missing credential is a fatal pre-run error, never a per-account one.

use crate::WorkspaceError;

/// Session credentials for the workspace admin API.
#[derive(Clone)]
pub struct WorkspaceCredentials {
    pub admin_token: String,
    pub session_cookie: String,
    pub client_id: String,
}

impl std::fmt::Debug for WorkspaceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never log token or cookie material
        f.debug_struct("WorkspaceCredentials")
            .field("admin_token", &"<redacted>")
            .field("session_cookie", &"<redacted>")
            .field("client_id", &self.client_id)
            .finish()
    }
}

impl WorkspaceCredentials {
    /// Load credentials from environment variables.
    pub fn from_env() -> Result<Self, WorkspaceError> {
        dotenvy::dotenv().ok();

        let admin_token = std::env::var("WORKSPACE_ADMIN_TOKEN").map_err(|_| {
            WorkspaceError::Configuration("WORKSPACE_ADMIN_TOKEN is required".to_string())
        })?;
        let session_cookie = std::env::var("WORKSPACE_SESSION_COOKIE").map_err(|_| {
            WorkspaceError::Configuration("WORKSPACE_SESSION_COOKIE is required".to_string())
        })?;
        let client_id = std::env::var("WORKSPACE_CLIENT_ID").map_err(|_| {
            WorkspaceError::Configuration("WORKSPACE_CLIENT_ID is required".to_string())
        })?;

        Ok(Self {
            admin_token,
            session_cookie,
            client_id,
        })
    }
}

/// Workspace client configuration
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// Port provider (admin, mock)
    pub provider: String,
    /// Base URL of the workspace API
    pub base_url: String,
    /// Required for the admin provider
    pub credentials: Option<WorkspaceCredentials>,
}

impl WorkspaceConfig {
    /// Create workspace config from environment variables.
    ///
    /// Credentials are loaded (and required) only for the live provider;
    /// the mock provider needs none.
    pub fn from_env() -> Result<Self, WorkspaceError> {
        dotenvy::dotenv().ok();

        let provider =
            std::env::var("WORKSPACE_PROVIDER").unwrap_or_else(|_| "admin".to_string());
        let base_url = std::env::var("WORKSPACE_BASE_URL")
            .unwrap_or_else(|_| "https://workspace.example.com".to_string());

        let credentials = if provider == "admin" {
            Some(WorkspaceCredentials::from_env()?)
        } else {
            None
        };

        Ok(Self {
            provider,
            base_url,
            credentials,
        })
    }
}
