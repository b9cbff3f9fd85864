//! Shared fixtures for sync integration tests
//!
//! Builds a mock workspace with the club's standard channel layout and a
//! ready-to-run `SyncEngine` over an in-memory membership directory and a
//! temporary policy file.

use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

use ridgeline_sync::{
    InMemoryDirectory, MembershipRecord, MembershipStatus, SyncConfigStore, SyncEngine,
};
use ridgeline_workspace::{MockWorkspacePort, WorkspaceAccount};

/// Standard channel layout used across tests:
/// general (public), trips + planning (private), alumni (private).
pub fn standard_workspace() -> MockWorkspacePort {
    let mock = MockWorkspacePort::new();
    mock.set_team("T1", "ridgeline");
    mock.add_channel("C_GENERAL", "general", true);
    mock.add_channel("C_TRIPS", "trips", false);
    mock.add_channel("C_PLANNING", "planning", false);
    mock.add_channel("C_ALUMNI", "alumni", false);
    mock
}

/// Engine wired to the mock workspace with the standard policy:
/// full = general+trips+planning, multi = general+alumni, single = general,
/// exception tag `no-sync`, live by default.
pub fn engine_for(
    mock: &MockWorkspacePort,
    records: Vec<MembershipRecord>,
) -> (SyncEngine, tempfile::NamedTempFile) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        br#"{
            "dry_run": false,
            "channels": {
                "full": ["general", "trips", "planning"],
                "multi_channel": ["general", "alumni"],
                "single_channel": ["general"]
            },
            "exception_tags": ["no-sync"],
            "invitation_message": "Welcome to the Ridgeline workspace!"
        }"#,
    )
    .unwrap();

    let engine = SyncEngine::new(
        SyncConfigStore::new(file.path()),
        Arc::new(InMemoryDirectory::new(records)),
        Arc::new(mock.clone()),
    );
    (engine, file)
}

pub fn record(email: &str, status: MembershipStatus, tenure_gap: u32) -> MembershipRecord {
    MembershipRecord {
        email: email.to_string(),
        status,
        tenure_gap,
        tags: HashSet::new(),
    }
}

pub fn account(id: &str, email: &str) -> WorkspaceAccount {
    WorkspaceAccount {
        id: id.to_string(),
        email: Some(email.to_string()),
        is_admin: false,
        is_owner: false,
        is_bot: false,
        is_deleted: false,
        is_restricted: false,
        is_ultra_restricted: false,
    }
}

pub fn guest(id: &str, email: &str, ultra: bool) -> WorkspaceAccount {
    let mut account = account(id, email);
    account.is_restricted = true;
    account.is_ultra_restricted = ultra;
    account
}
