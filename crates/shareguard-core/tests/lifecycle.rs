// crates/shareguard-core/tests/lifecycle.rs
// ============================================================================
// Module: Sharing Lifecycle Tests
// Description: Tests for audited upload, share, link, and access operations.
// Purpose: Validate authorization, policy gating, and audit atomicity.
// Dependencies: shareguard-core
// ============================================================================
//! ## Overview
//! Drives the sharing lifecycle over the in-memory store with a fixed clock
//! and deterministic tokens, asserting the audit trail alongside every
//! outcome.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::cell::Cell;

use shareguard_core::AUDIT_EXTERNAL_LINK_CREATED;
use shareguard_core::AUDIT_EXTERNAL_VIEW;
use shareguard_core::AUDIT_INTERNAL_SHARE_ADDED;
use shareguard_core::AUDIT_LABEL_OVERRIDE;
use shareguard_core::AUDIT_POLICY_DECISION;
use shareguard_core::AUDIT_UPLOAD;
use shareguard_core::Actor;
use shareguard_core::Clock;
use shareguard_core::Decision;
use shareguard_core::FileRecord;
use shareguard_core::FileScope;
use shareguard_core::InMemoryShareStore;
use shareguard_core::Label;
use shareguard_core::LifecycleError;
use shareguard_core::LinkStatus;
use shareguard_core::LinkToken;
use shareguard_core::Role;
use shareguard_core::ShareStore;
use shareguard_core::SharingLifecycle;
use shareguard_core::Timestamp;
use shareguard_core::TokenSource;

/// Fixed instant for deterministic runs.
const NOW_MILLIS: i64 = 1_756_000_000_000;

/// Clock pinned to one instant.
struct FixedClock(Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// Token source yielding `token-1`, `token-2`, ...
struct CountingTokens(Cell<u64>);

impl CountingTokens {
    fn new() -> Self {
        Self(Cell::new(0))
    }
}

impl TokenSource for CountingTokens {
    fn generate(&self) -> LinkToken {
        let next = self.0.get() + 1;
        self.0.set(next);
        LinkToken::new(format!("token-{next}"))
    }
}

type TestLifecycle = SharingLifecycle<InMemoryShareStore, FixedClock, CountingTokens>;

fn engine() -> TestLifecycle {
    engine_at(NOW_MILLIS)
}

fn engine_at(millis: i64) -> TestLifecycle {
    SharingLifecycle::new(
        InMemoryShareStore::new(),
        FixedClock(Timestamp::from_unix_millis(millis)),
        CountingTokens::new(),
    )
}

/// Second engine over the same tables, observing a later instant.
fn same_store_at(engine: &TestLifecycle, millis: i64) -> TestLifecycle {
    SharingLifecycle::new(
        engine.store().clone(),
        FixedClock(Timestamp::from_unix_millis(millis)),
        CountingTokens::new(),
    )
}

fn seed_user(engine: &TestLifecycle, email: &str, role: Role) -> Actor {
    let id = engine
        .store()
        .with_txn(|txn| txn.insert_user(email, role, Timestamp::from_unix_millis(NOW_MILLIS)))
        .unwrap();
    Actor::new(id, role)
}

fn future(minutes: i64) -> Timestamp {
    Timestamp::from_unix_millis(NOW_MILLIS + minutes * 60_000)
}

fn audit_actions(engine: &TestLifecycle) -> Vec<String> {
    engine
        .store()
        .audit_entries()
        .unwrap()
        .into_iter()
        .map(|entry| entry.action)
        .collect()
}

fn upload_clean(engine: &TestLifecycle, owner: &Actor) -> FileRecord {
    engine
        .upload(owner, "notes.txt", "text/plain", b"meeting notes", "blobs/notes.txt")
        .unwrap()
}

fn upload_confidential(engine: &TestLifecycle, owner: &Actor) -> FileRecord {
    engine
        .upload(owner, "contacts.txt", "text/plain", b"reach alice@example.com", "blobs/contacts")
        .unwrap()
}

fn upload_highly_confidential(engine: &TestLifecycle, owner: &Actor) -> FileRecord {
    let body = b"alice@example.com ssn 123-45-6789";
    engine.upload(owner, "export.csv", "text/csv", body, "blobs/export").unwrap()
}

// ============================================================================
// SECTION: Upload
// ============================================================================

#[test]
fn clean_upload_is_internal_with_allow_at_rest() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    assert_eq!(file.label, Label::Internal);
    assert_eq!(file.policy_decision, Decision::Allow);
    assert_eq!(file.owner_user_id, owner.user_id);
    assert_eq!(audit_actions(&engine), vec![AUDIT_UPLOAD, AUDIT_POLICY_DECISION]);
}

#[test]
fn single_category_upload_is_confidential_with_warn_at_rest() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let file = upload_confidential(&engine, &owner);
    assert_eq!(file.label, Label::Confidential);
    assert_eq!(file.policy_decision, Decision::Warn);
}

#[test]
fn multi_category_upload_is_highly_confidential_with_block_at_rest() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let file = upload_highly_confidential(&engine, &owner);
    assert_eq!(file.label, Label::HighlyConfidential);
    assert_eq!(file.policy_decision, Decision::Block);
}

#[test]
fn upload_rejects_unsupported_extensions() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let result = engine.upload(&owner, "tool.exe", "application/octet-stream", b"MZ", "blobs/t");
    assert!(matches!(result, Err(LifecycleError::UnsupportedExtension)));
    assert!(audit_actions(&engine).is_empty());
}

#[test]
fn upload_accepts_uppercase_extensions() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let file = engine.upload(&owner, "REPORT.TXT", "text/plain", b"body", "blobs/r").unwrap();
    assert_eq!(file.filename, "REPORT.TXT");
}

// ============================================================================
// SECTION: Label Override
// ============================================================================

#[test]
fn override_label_requires_admin() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    let result = engine.override_label(&owner, file.id, "Confidential", "mislabeled");
    assert!(matches!(result, Err(LifecycleError::Unauthorized)));
}

#[test]
fn override_label_requires_justification() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let admin = seed_user(&engine, "admin@example.com", Role::Admin);
    let file = upload_clean(&engine, &owner);
    let result = engine.override_label(&admin, file.id, "Confidential", "   ");
    assert!(matches!(result, Err(LifecycleError::MissingJustification)));
}

#[test]
fn override_label_rejects_unknown_labels() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let admin = seed_user(&engine, "admin@example.com", Role::Admin);
    let file = upload_clean(&engine, &owner);
    let result = engine.override_label(&admin, file.id, "Top Secret", "audit finding");
    assert!(matches!(result, Err(LifecycleError::InvalidLabel(_))));
}

#[test]
fn override_label_reevaluates_the_resting_decision() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let admin = seed_user(&engine, "admin@example.com", Role::Admin);
    let file = upload_clean(&engine, &owner);
    let updated = engine
        .override_label(&admin, file.id, "highly confidential", "audit finding")
        .unwrap();
    assert_eq!(updated.label, Label::HighlyConfidential);
    assert_eq!(updated.policy_decision, Decision::Block);
    assert_eq!(
        audit_actions(&engine),
        vec![AUDIT_UPLOAD, AUDIT_POLICY_DECISION, AUDIT_LABEL_OVERRIDE, AUDIT_POLICY_DECISION]
    );
}

// ============================================================================
// SECTION: Internal Shares
// ============================================================================

#[test]
fn share_grants_read_access_to_the_target() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let reader = seed_user(&engine, "reader@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    let outcome = engine.add_internal_share(&owner, file.id, "reader@example.com").unwrap();
    assert!(outcome.created);
    assert_eq!(outcome.decision, Decision::Allow);
    let visible = engine.file_details(&reader, file.id).unwrap();
    assert_eq!(visible.id, file.id);
    let listed = engine.list_files(&reader, FileScope::SharedWithMe).unwrap();
    assert_eq!(listed.len(), 1);
}

#[test]
fn share_target_email_is_normalized() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    seed_user(&engine, "reader@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    let outcome = engine.add_internal_share(&owner, file.id, "  Reader@Example.COM ").unwrap();
    assert!(outcome.created);
}

#[test]
fn share_is_idempotent_per_file_user_pair() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    seed_user(&engine, "reader@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    let first = engine.add_internal_share(&owner, file.id, "reader@example.com").unwrap();
    let second = engine.add_internal_share(&owner, file.id, "reader@example.com").unwrap();
    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.share_id, second.share_id);
    let added = audit_actions(&engine)
        .into_iter()
        .filter(|action| action == AUDIT_INTERNAL_SHARE_ADDED)
        .count();
    assert_eq!(added, 1);
}

#[test]
fn share_requires_owner_or_admin() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let outsider = seed_user(&engine, "outsider@example.com", Role::User);
    seed_user(&engine, "reader@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    let result = engine.add_internal_share(&outsider, file.id, "reader@example.com");
    assert!(matches!(result, Err(LifecycleError::Unauthorized)));
}

#[test]
fn admin_may_share_files_they_do_not_own() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let admin = seed_user(&engine, "admin@example.com", Role::Admin);
    seed_user(&engine, "reader@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    let outcome = engine.add_internal_share(&admin, file.id, "reader@example.com").unwrap();
    assert!(outcome.created);
}

#[test]
fn share_with_unknown_email_is_rejected() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    let result = engine.add_internal_share(&owner, file.id, "ghost@example.com");
    assert!(matches!(result, Err(LifecycleError::TargetUserNotFound)));
}

#[test]
fn removing_a_share_revokes_access() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let reader = seed_user(&engine, "reader@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    let outcome = engine.add_internal_share(&owner, file.id, "reader@example.com").unwrap();
    engine.remove_internal_share(&owner, file.id, outcome.share_id).unwrap();
    let result = engine.file_details(&reader, file.id);
    assert!(matches!(result, Err(LifecycleError::Unauthorized)));
    let second = engine.remove_internal_share(&owner, file.id, outcome.share_id);
    assert!(matches!(second, Err(LifecycleError::ShareNotFound)));
}

// ============================================================================
// SECTION: External Links
// ============================================================================

#[test]
fn link_for_internal_file_is_allowed_with_expiry() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    let grant = engine.create_external_link(&owner, file.id, Some(future(60)), None).unwrap();
    assert_eq!(grant.decision, Decision::Allow);
    assert_eq!(grant.link.status, LinkStatus::Active);
    assert_eq!(grant.link.token.as_str(), "token-1");
    let actions = audit_actions(&engine);
    assert_eq!(
        actions,
        vec![AUDIT_UPLOAD, AUDIT_POLICY_DECISION, AUDIT_POLICY_DECISION, AUDIT_EXTERNAL_LINK_CREATED]
    );
}

#[test]
fn link_without_expiry_is_rejected_before_any_write() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    let result = engine.create_external_link(&owner, file.id, None, None);
    assert!(matches!(result, Err(LifecycleError::MissingRequiredField(field)) if field == "expires_at"));
    // Rejection rolls back: no audit entry beyond the upload's pair.
    assert_eq!(audit_actions(&engine).len(), 2);
}

#[test]
fn omitted_expiry_falls_back_to_the_configured_ttl() {
    let engine = engine().with_default_link_ttl(90);
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    let grant = engine.create_external_link(&owner, file.id, None, None).unwrap();
    assert_eq!(grant.link.expires_at, future(90));
    // An explicit expiry still wins over the default.
    let explicit = engine.create_external_link(&owner, file.id, Some(future(5)), None).unwrap();
    assert_eq!(explicit.link.expires_at, future(5));
}

#[test]
fn link_for_confidential_file_requires_justification() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let file = upload_confidential(&engine, &owner);
    let missing = engine.create_external_link(&owner, file.id, Some(future(60)), None);
    assert!(matches!(
        missing,
        Err(LifecycleError::MissingRequiredField(field)) if field == "justification"
    ));
    let grant = engine
        .create_external_link(&owner, file.id, Some(future(60)), Some("auditor request"))
        .unwrap();
    assert_eq!(grant.decision, Decision::Warn);
    assert_eq!(grant.link.justification.as_deref(), Some("auditor request"));
}

#[test]
fn link_for_highly_confidential_file_is_blocked_but_audited() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let file = upload_highly_confidential(&engine, &owner);
    let result = engine.create_external_link(&owner, file.id, Some(future(60)), Some("please"));
    assert!(matches!(result, Err(LifecycleError::PolicyBlocked { .. })));
    let actions = audit_actions(&engine);
    // The blocked attempt commits exactly one policy_decision and no link.
    assert_eq!(actions, vec![AUDIT_UPLOAD, AUDIT_POLICY_DECISION, AUDIT_POLICY_DECISION]);
    assert!(!actions.iter().any(|action| action == AUDIT_EXTERNAL_LINK_CREATED));
}

#[test]
fn link_expiry_must_lie_in_the_future() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    let past = Timestamp::from_unix_millis(NOW_MILLIS - 1);
    let result = engine.create_external_link(&owner, file.id, Some(past), None);
    assert!(matches!(result, Err(LifecycleError::ExpiryNotInFuture)));
    let at_now = engine
        .create_external_link(&owner, file.id, Some(Timestamp::from_unix_millis(NOW_MILLIS)), None);
    assert!(matches!(at_now, Err(LifecycleError::ExpiryNotInFuture)));
}

#[test]
fn revoke_is_one_way() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    let grant = engine.create_external_link(&owner, file.id, Some(future(60)), None).unwrap();
    engine.revoke_external_link(&owner, file.id, grant.link.id).unwrap();
    let again = engine.revoke_external_link(&owner, file.id, grant.link.id);
    assert!(matches!(again, Err(LifecycleError::LinkNotFound)));
}

// ============================================================================
// SECTION: Anonymous Access
// ============================================================================

#[test]
fn active_token_resolves_and_audits_an_anonymous_view() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    let grant = engine.create_external_link(&owner, file.id, Some(future(60)), None).unwrap();
    let viewed = engine.access_by_token(&grant.link.token).unwrap();
    assert_eq!(viewed.id, file.id);
    let entries = engine.store().audit_entries().unwrap();
    let view = entries.iter().find(|entry| entry.action == AUDIT_EXTERNAL_VIEW).unwrap();
    assert_eq!(view.actor_user_id, None);
}

#[test]
fn unknown_token_is_not_found() {
    let engine = engine();
    let result = engine.access_by_token(&LinkToken::new("no-such-token"));
    assert!(matches!(result, Err(LifecycleError::LinkNotFound)));
}

#[test]
fn revoked_token_is_not_found() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    let grant = engine.create_external_link(&owner, file.id, Some(future(60)), None).unwrap();
    engine.revoke_external_link(&owner, file.id, grant.link.id).unwrap();
    let result = engine.access_by_token(&grant.link.token);
    assert!(matches!(result, Err(LifecycleError::LinkNotFound)));
}

#[test]
fn lapsed_token_reports_expired_without_state_change() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    let grant = engine.create_external_link(&owner, file.id, Some(future(1)), None).unwrap();

    let later = same_store_at(&engine, NOW_MILLIS + 2 * 60_000);
    let result = later.access_by_token(&grant.link.token);
    assert!(matches!(result, Err(LifecycleError::LinkExpired)));

    // Lazy expiry: the row still reads as active.
    let details = engine.store().with_txn(|txn| txn.link(file.id, grant.link.id)).unwrap();
    assert_eq!(details.unwrap().status, LinkStatus::Active);
}

// ============================================================================
// SECTION: Listings and Activity
// ============================================================================

#[test]
fn list_all_requires_admin() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let admin = seed_user(&engine, "admin@example.com", Role::Admin);
    upload_clean(&engine, &owner);
    let denied = engine.list_files(&owner, FileScope::All);
    assert!(matches!(denied, Err(LifecycleError::Unauthorized)));
    let listed = engine.list_files(&admin, FileScope::All).unwrap();
    assert_eq!(listed.len(), 1);
}

#[test]
fn recent_activity_filters_non_admin_actors_to_their_own_entries() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let other = seed_user(&engine, "other@example.com", Role::User);
    let admin = seed_user(&engine, "admin@example.com", Role::Admin);
    upload_clean(&engine, &owner);
    upload_confidential(&engine, &other);

    let own = engine.recent_activity(&owner, 10).unwrap();
    assert!(own.iter().all(|entry| entry.actor_user_id == Some(owner.user_id)));
    assert_eq!(own.len(), 2);

    let everything = engine.recent_activity(&admin, 10).unwrap();
    assert_eq!(everything.len(), 4);
}

#[test]
fn file_timeline_is_newest_first_and_gated_on_access() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let outsider = seed_user(&engine, "outsider@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    engine.create_external_link(&owner, file.id, Some(future(60)), None).unwrap();

    let denied = engine.file_audit_timeline(&outsider, file.id);
    assert!(matches!(denied, Err(LifecycleError::Unauthorized)));

    let timeline = engine.file_audit_timeline(&owner, file.id).unwrap();
    assert_eq!(timeline.len(), 4);
    assert_eq!(timeline[0].action, AUDIT_EXTERNAL_LINK_CREATED);
    assert_eq!(timeline[3].action, AUDIT_UPLOAD);
}

#[test]
fn download_is_audited_for_share_holders() {
    let engine = engine();
    let owner = seed_user(&engine, "owner@example.com", Role::User);
    let reader = seed_user(&engine, "reader@example.com", Role::User);
    let file = upload_clean(&engine, &owner);
    engine.add_internal_share(&owner, file.id, "reader@example.com").unwrap();
    let downloaded = engine.record_download(&reader, file.id).unwrap();
    assert_eq!(downloaded.id, file.id);
    let entries = engine.store().audit_entries().unwrap();
    let last = entries.last().unwrap();
    assert_eq!(last.actor_user_id, Some(reader.user_id));
}
