//! End-to-end sync run scenarios over the mock workspace port

mod common;

use common::{account, engine_for, guest, record, standard_workspace};
use ridgeline_sync::MembershipStatus;

// Scenario A: active member currently a single-channel guest is promoted to
// full and added to the configured full channels they are missing.
#[tokio::test]
async fn test_active_single_channel_guest_promoted_to_full() {
    let mock = standard_workspace();
    mock.add_account(guest("U1", "skier@example.com", true));
    mock.set_account_channels("U1", &["C_GENERAL"]);

    let (engine, _file) = engine_for(
        &mock,
        vec![record("skier@example.com", MembershipStatus::Active, 0)],
    );

    let result = engine.run(None).await;

    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert_eq!(result.processed, 1);
    assert_eq!(result.role_changes, 1);
    // trips and planning were missing from the account's current set
    assert_eq!(result.channel_adds, 2);
    assert_eq!(result.channel_removals, 0);

    let after = mock.account("U1").unwrap();
    assert!(!after.is_restricted);
    assert!(!after.is_ultra_restricted);
    assert_eq!(mock.channels_of("U1").len(), 3);
}

// Scenario B: bots are never touched.
#[tokio::test]
async fn test_bot_account_is_skipped() {
    let mock = standard_workspace();
    let mut bot = account("U1", "reminder-bot@example.com");
    bot.is_bot = true;
    mock.add_account(bot);

    let (engine, _file) = engine_for(&mock, vec![]);
    let result = engine.run(None).await;

    assert_eq!(result.skipped, 1);
    assert_eq!(result.processed, 0);
    assert_eq!(result.diff_operations(), 0);
    assert!(mock.recorded_calls().is_empty());
}

// Scenario C: recent alumni become multi-channel guests with exactly one
// role-change call and no separate channel operations.
#[tokio::test]
async fn test_recent_alumni_demoted_with_single_atomic_call() {
    let mock = standard_workspace();
    mock.add_account(account("U1", "alum@example.com"));

    let (engine, _file) = engine_for(
        &mock,
        vec![record("alum@example.com", MembershipStatus::Alumni, 1)],
    );

    let result = engine.run(None).await;

    assert!(result.errors.is_empty());
    assert_eq!(result.role_changes, 1);
    assert_eq!(result.channel_adds, 0);
    assert_eq!(result.channel_removals, 0);

    let role_calls = mock.calls_for("set_role");
    assert_eq!(role_calls.len(), 1);
    assert_eq!(role_calls[0].channels, vec!["C_GENERAL", "C_ALUMNI"]);
    assert!(mock.account("U1").unwrap().is_restricted);
}

// Scenario D / idempotence: a second run over the state the first run
// produced performs zero diff operations.
#[tokio::test]
async fn test_second_run_is_a_noop() {
    let mock = standard_workspace();
    mock.add_account(guest("U1", "skier@example.com", true));
    mock.set_account_channels("U1", &["C_GENERAL"]);
    mock.add_account(account("U2", "alum@example.com"));

    let records = vec![
        record("skier@example.com", MembershipStatus::Active, 0),
        record("alum@example.com", MembershipStatus::Alumni, 2),
    ];

    let (engine, _file) = engine_for(&mock, records.clone());
    let first = engine.run(None).await;
    assert!(first.errors.is_empty());
    assert!(first.diff_operations() > 0);

    let (engine, _file) = engine_for(&mock, records);
    let second = engine.run(None).await;
    assert!(second.errors.is_empty());
    assert_eq!(second.diff_operations(), 0, "second run must be a no-op");
    assert_eq!(second.processed, 2);
}

#[tokio::test]
async fn test_deleted_member_is_reactivated_once() {
    let mock = standard_workspace();
    let mut deleted = account("U1", "returning@example.com");
    deleted.is_deleted = true;
    mock.add_account(deleted);

    let records = vec![record("returning@example.com", MembershipStatus::Active, 0)];
    let (engine, _file) = engine_for(&mock, records.clone());
    let result = engine.run(None).await;

    assert!(result.errors.is_empty());
    assert_eq!(result.reactivated, 1);
    assert_eq!(result.role_changes, 1);
    // Reactivation applies the full channel set atomically; no diff follows
    assert_eq!(result.channel_adds, 0);
    let reactivations = mock.calls_for("reactivate");
    assert_eq!(reactivations.len(), 1);
    assert_eq!(
        reactivations[0].channels,
        vec!["C_GENERAL", "C_TRIPS", "C_PLANNING"]
    );

    // Next run sees an active full member in all target channels
    let (engine, _file) = engine_for(&mock, records);
    let second = engine.run(None).await;
    assert_eq!(second.diff_operations(), 0);
}

#[tokio::test]
async fn test_missing_full_member_is_invited() {
    let mock = standard_workspace();
    mock.add_account(account("U1", "present@example.com"));

    let (engine, _file) = engine_for(
        &mock,
        vec![
            record("present@example.com", MembershipStatus::Active, 0),
            record("Missing@Example.com", MembershipStatus::Active, 0),
            record("lapsed@example.com", MembershipStatus::Lapsed, 4),
        ],
    );

    let result = engine.run(None).await;

    assert_eq!(result.invites_sent, 1);
    assert_eq!(mock.invited_emails(), vec!["missing@example.com"]);
    let invites = mock.calls_for("invite");
    assert_eq!(
        invites[0].channels,
        vec!["C_GENERAL", "C_TRIPS", "C_PLANNING"]
    );
}

// Invitations are not deduplicated across runs: until the member joins, a
// re-run invites them again.
#[tokio::test]
async fn test_invitations_repeat_across_runs_until_joined() {
    let mock = standard_workspace();
    let records = vec![record("missing@example.com", MembershipStatus::Active, 0)];

    let (engine, _file) = engine_for(&mock, records.clone());
    engine.run(None).await;
    let (engine, _file) = engine_for(&mock, records);
    engine.run(None).await;

    assert_eq!(mock.invited_emails().len(), 2);
}

#[tokio::test]
async fn test_lapsed_full_member_demoted_to_single_channel() {
    let mock = standard_workspace();
    mock.add_account(account("U1", "lapsed@example.com"));

    let (engine, _file) = engine_for(
        &mock,
        vec![record("lapsed@example.com", MembershipStatus::Lapsed, 3)],
    );

    let result = engine.run(None).await;

    assert_eq!(result.role_changes, 1);
    let after = mock.account("U1").unwrap();
    assert!(after.is_ultra_restricted);
    assert_eq!(mock.channels_of("U1"), ["C_GENERAL".to_string()].into());
}

#[tokio::test]
async fn test_mixed_roster_full_run() {
    let mock = standard_workspace();
    // Full member already in shape
    mock.add_account(account("U1", "steady@example.com"));
    mock.set_account_channels("U1", &["C_GENERAL", "C_TRIPS", "C_PLANNING"]);
    // Guest to promote
    mock.add_account(guest("U2", "promoted@example.com", true));
    mock.set_account_channels("U2", &["C_GENERAL"]);
    // Member to demote
    mock.add_account(account("U3", "alum@example.com"));
    // Admin, untouched
    let mut admin = account("U4", "president@example.com");
    admin.is_admin = true;
    mock.add_account(admin);

    let (engine, _file) = engine_for(
        &mock,
        vec![
            record("steady@example.com", MembershipStatus::Active, 0),
            record("promoted@example.com", MembershipStatus::Active, 0),
            record("alum@example.com", MembershipStatus::Alumni, 1),
            record("president@example.com", MembershipStatus::Active, 0),
        ],
    );

    let result = engine.run(None).await;

    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert_eq!(result.processed, 3);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.role_changes, 2);
    assert_eq!(result.channel_adds, 2);
    assert_eq!(result.invites_sent, 0);
}
