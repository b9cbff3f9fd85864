//! Authenticated call wrapper for the workspace admin API
//!
//! Every admin call goes through `AdminTransport::call`, which enforces three
//! policies in order:
//! 1. Dry-run short-circuit: the intended call is logged and a synthetic
//!    success is returned before any network I/O.
//! 2. Retry with exponential backoff on network failures and transient
//!    HTTP statuses (rate limiting and server errors); other statuses fail
//!    immediately.
//! 3. Fatal-auth classification: response payloads signaling expired or
//!    revoked credentials raise `WorkspaceError::AuthExpired`, which is never
//!    retried — every subsequent call would fail the same way.

use std::time::Duration;

use serde_json::{json, Value};

use crate::config::WorkspaceCredentials;
use crate::WorkspaceError;

/// Error codes that mean the admin session itself is dead.
const FATAL_AUTH_CODES: &[&str] = &[
    "invalid_auth",
    "not_authed",
    "token_revoked",
    "account_inactive",
];

/// Only rate limiting and server-side failures are worth retrying; other
/// statuses are deterministic and fail immediately.
fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Explicit retry policy passed into the transport constructor.
///
/// Attempt `n` (zero-based) sleeps `base_delay * 2^n` before retrying, so the
/// default policy waits 1s and 2s between its three attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay before retrying after the given zero-based attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Blocking-per-call transport for the workspace admin API.
///
/// Calls are awaited strictly sequentially by the sync engine; the transport
/// itself never issues concurrent requests.
pub struct AdminTransport {
    http: reqwest::Client,
    base_url: String,
    credentials: WorkspaceCredentials,
    retry: RetryPolicy,
}

impl AdminTransport {
    pub fn new(
        base_url: String,
        credentials: WorkspaceCredentials,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            retry,
        }
    }

    /// Perform one admin API call.
    ///
    /// `context` is a human-readable description used in logs and error
    /// messages (e.g. `"role change for skier@example.com"`).
    pub async fn call(
        &self,
        method: &str,
        payload: Value,
        context: &str,
        dry_run: bool,
    ) -> Result<Value, WorkspaceError> {
        // Dry-run check comes before everything else so a dry run can never
        // touch the network.
        if dry_run {
            tracing::info!(method = %method, context = %context, "Dry run: skipping workspace call");
            return Ok(json!({ "ok": true, "dry_run": true }));
        }

        let url = format!("{}/api/{}", self.base_url, method);

        let mut body = payload;
        body["token"] = json!(self.credentials.admin_token);

        let mut attempt: u32 = 0;
        let response = loop {
            tracing::debug!(method = %method, context = %context, attempt = attempt, "Workspace API request");

            let sent = self
                .http
                .post(&url)
                .header("Cookie", format!("d={}", self.credentials.session_cookie))
                .header("X-Client-Id", &self.credentials.client_id)
                .json(&body)
                .send()
                .await;

            match sent {
                Ok(response) if response.status().is_success() => break response,
                Ok(response) => {
                    let status = response.status();
                    if !is_retryable_status(status) {
                        return Err(WorkspaceError::Request(format!(
                            "{} returned HTTP {} ({})",
                            method, status, context
                        )));
                    }
                    if attempt + 1 >= self.retry.max_attempts {
                        return Err(WorkspaceError::Request(format!(
                            "{} returned HTTP {} after {} attempts ({})",
                            method,
                            status,
                            attempt + 1,
                            context
                        )));
                    }
                    tracing::warn!(method = %method, status = %status, attempt = attempt, "Transient HTTP failure, retrying");
                }
                Err(e) => {
                    if attempt + 1 >= self.retry.max_attempts {
                        return Err(WorkspaceError::Request(format!(
                            "{} failed after {} attempts ({}): {}",
                            method,
                            attempt + 1,
                            context,
                            e
                        )));
                    }
                    tracing::warn!(method = %method, error = %e, attempt = attempt, "Network failure, retrying");
                }
            }

            tokio::time::sleep(self.retry.delay_for(attempt)).await;
            attempt += 1;
        };

        let value: Value = response.json().await.map_err(|e| {
            WorkspaceError::Response(format!("Failed to parse {} response: {}", method, e))
        })?;

        Self::check_envelope(method, value)
    }

    /// One lightweight read-only call classifying current credentials as
    /// valid or invalid before a run begins.
    pub async fn validate_credentials(&self) -> Result<(), WorkspaceError> {
        self.call("auth.check", json!({}), "credential validation", false)
            .await
            .map(|_| ())
    }

    /// Validate the `ok`/`error` envelope shared by every admin response.
    fn check_envelope(method: &str, value: Value) -> Result<Value, WorkspaceError> {
        let ok = value.get("ok").and_then(Value::as_bool).ok_or_else(|| {
            WorkspaceError::Response(format!("{} response missing 'ok' flag", method))
        })?;

        if ok {
            return Ok(value);
        }

        let code = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error")
            .to_string();

        if FATAL_AUTH_CODES.contains(&code.as_str()) {
            tracing::error!(method = %method, code = %code, "Workspace admin session expired");
            return Err(WorkspaceError::AuthExpired(code));
        }

        Err(WorkspaceError::Api {
            method: method.to_string(),
            code,
        })
    }
}
