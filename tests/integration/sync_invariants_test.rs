//! Sync engine invariant tests
//!
//! Exercises the run-level guarantees: dry runs never mutate, fatal auth
//! expiry aborts with partial counts preserved, excluded accounts are never
//! touched, and public channels are never removed from full members.

mod common;

use common::{account, engine_for, guest, record, standard_workspace};
use ridgeline_sync::MembershipStatus;
use ridgeline_workspace::mock::MockFailure;

// Dry-run invariant: zero mutating calls reach the workspace, yet every
// counter reflects the operations a live run would have performed.
#[tokio::test]
async fn test_dry_run_counts_everything_and_mutates_nothing() {
    let mock = standard_workspace();
    mock.add_account(guest("U1", "skier@example.com", true));
    mock.set_account_channels("U1", &["C_GENERAL"]);
    mock.add_account(account("U2", "alum@example.com"));

    let (engine, _file) = engine_for(
        &mock,
        vec![
            record("skier@example.com", MembershipStatus::Active, 0),
            record("alum@example.com", MembershipStatus::Alumni, 1),
            record("missing@example.com", MembershipStatus::Active, 0),
        ],
    );

    let result = engine.run(Some(true)).await;

    assert!(result.dry_run);
    assert_eq!(result.role_changes, 2);
    assert_eq!(result.channel_adds, 2);
    assert_eq!(result.invites_sent, 1);
    assert!(result.errors.is_empty());

    // No mutation applied anywhere
    assert_eq!(mock.mutation_count(), 0);
    assert!(mock.invited_emails().is_empty());
    assert!(mock.account("U1").unwrap().is_ultra_restricted);
    assert!(!mock.account("U2").unwrap().is_restricted);
    assert_eq!(mock.channels_of("U1").len(), 1);
}

// Fatal-abort invariant: if the very first mutating call reports an expired
// session, the run ends with exactly one error and processed == 0.
#[tokio::test]
async fn test_auth_expiry_on_first_mutation_aborts_run() {
    let mock = standard_workspace();
    mock.add_account(guest("U1", "a@example.com", true));
    mock.add_account(guest("U2", "b@example.com", true));
    mock.fail_on("set_role", MockFailure::AuthExpired);

    let (engine, _file) = engine_for(
        &mock,
        vec![
            record("a@example.com", MembershipStatus::Active, 0),
            record("b@example.com", MembershipStatus::Active, 0),
            record("missing@example.com", MembershipStatus::Active, 0),
        ],
    );

    let result = engine.run(None).await;

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("expired"));
    assert_eq!(result.processed, 0);
    assert_eq!(result.diff_operations(), 0);
    // The inviter never ran
    assert_eq!(result.invites_sent, 0);
    assert!(mock.invited_emails().is_empty());
}

// Partial counts survive a mid-run abort.
#[tokio::test]
async fn test_auth_expiry_preserves_partial_counts() {
    let mock = standard_workspace();
    // First account only needs channel adds, second needs a role change
    mock.add_account(account("U1", "steady@example.com"));
    mock.set_account_channels("U1", &["C_GENERAL", "C_TRIPS"]);
    mock.add_account(guest("U2", "promoted@example.com", true));
    mock.fail_on("set_role", MockFailure::AuthExpired);

    let (engine, _file) = engine_for(
        &mock,
        vec![
            record("steady@example.com", MembershipStatus::Active, 0),
            record("promoted@example.com", MembershipStatus::Active, 0),
        ],
    );

    let result = engine.run(None).await;

    // U1 completed before the abort
    assert_eq!(result.processed, 1);
    assert_eq!(result.channel_adds, 1);
    assert_eq!(result.errors.len(), 1);
    assert!(mock.channels_of("U1").contains("C_PLANNING"));
}

// Exclusion invariant: admins, owners, bots, and exception-tagged members
// are never mutated; each increments skipped.
#[tokio::test]
async fn test_excluded_accounts_are_never_mutated() {
    let mock = standard_workspace();
    let mut admin = account("U1", "admin@example.com");
    admin.is_admin = true;
    mock.add_account(admin);
    let mut owner = account("U2", "owner@example.com");
    owner.is_owner = true;
    mock.add_account(owner);
    let mut bot = account("U3", "bot@example.com");
    bot.is_bot = true;
    mock.add_account(bot);
    // Exception-tagged member who would otherwise be demoted
    mock.add_account(account("U4", "treasurer@example.com"));

    let mut tagged = record("treasurer@example.com", MembershipStatus::Lapsed, 5);
    tagged.tags.insert("no-sync".to_string());

    let (engine, _file) = engine_for(&mock, vec![tagged]);
    let result = engine.run(None).await;

    assert_eq!(result.skipped, 4);
    assert_eq!(result.processed, 0);
    assert_eq!(result.diff_operations(), 0);
    assert!(mock.recorded_calls().is_empty());
}

// Public-channel preservation: a full member keeps every public channel
// they joined manually, no matter the target set.
#[tokio::test]
async fn test_public_channels_never_removed() {
    let mock = standard_workspace();
    mock.add_channel("C_POWDER", "powder-alerts", true);
    mock.add_channel("C_COMMITTEE", "committee", false);
    mock.add_account(account("U1", "skier@example.com"));
    mock.set_account_channels(
        "U1",
        &["C_GENERAL", "C_TRIPS", "C_PLANNING", "C_POWDER", "C_COMMITTEE"],
    );

    let (engine, _file) = engine_for(
        &mock,
        vec![record("skier@example.com", MembershipStatus::Active, 0)],
    );

    let result = engine.run(None).await;

    assert!(result.errors.is_empty());
    // Only the private off-target channel was removed
    assert_eq!(result.channel_removals, 1);
    let removals = mock.calls_for("remove_from_channel");
    assert_eq!(removals.len(), 1);
    assert_eq!(removals[0].channels, vec!["C_COMMITTEE"]);
    assert!(mock.channels_of("U1").contains("C_POWDER"));
}

// Recoverable per-account errors leave the rest of the run intact.
#[tokio::test]
async fn test_channel_error_is_isolated_to_one_account() {
    let mock = standard_workspace();
    mock.add_account(account("U1", "broken@example.com"));
    mock.set_account_channels("U1", &["C_GENERAL", "C_TRIPS"]);
    mock.add_account(account("U2", "alum@example.com"));
    mock.fail_on(
        "add_to_channel",
        MockFailure::Api("not_in_channel".to_string()),
    );

    let (engine, _file) = engine_for(
        &mock,
        vec![
            record("broken@example.com", MembershipStatus::Active, 0),
            record("alum@example.com", MembershipStatus::Alumni, 1),
        ],
    );

    let result = engine.run(None).await;

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("broken@example.com"));
    // The alumni demotion still happened
    assert_eq!(result.processed, 1);
    assert_eq!(result.role_changes, 1);
    assert!(mock.account("U2").unwrap().is_restricted);
}
