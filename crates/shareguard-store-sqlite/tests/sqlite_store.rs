// crates/shareguard-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Share Store Tests
// Description: Tests for the SQLite-backed share store.
// Purpose: Validate durability, constraints, and transactional rollback.
// Dependencies: shareguard-store-sqlite, shareguard-core, tempfile
// ============================================================================
//! ## Overview
//! Exercises the SQLite store through the transactional interface, asserting
//! that commits survive reopen, constraint violations surface distinctly,
//! and failed units of work leave no partial writes.

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

use std::collections::BTreeMap;
use std::path::Path;

use shareguard_core::Decision;
use shareguard_core::FileId;
use shareguard_core::Label;
use shareguard_core::LinkStatus;
use shareguard_core::LinkToken;
use shareguard_core::NewAuditEntry;
use shareguard_core::NewExternalLink;
use shareguard_core::NewFileRecord;
use shareguard_core::Role;
use shareguard_core::ScanScope;
use shareguard_core::ScanSummary;
use shareguard_core::ShareStore;
use shareguard_core::StoreError;
use shareguard_core::Timestamp;
use shareguard_core::UserId;
use shareguard_store_sqlite::SqliteShareStore;
use shareguard_store_sqlite::SqliteStoreConfig;
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> SqliteShareStore {
    open_store_at(&dir.path().join("shareguard.db"))
}

fn open_store_at(path: &Path) -> SqliteShareStore {
    SqliteShareStore::new(SqliteStoreConfig {
        path: path.to_path_buf(),
        busy_timeout_ms: 1_000,
        journal_mode: shareguard_store_sqlite::SqliteStoreMode::Wal,
        sync_mode: shareguard_store_sqlite::SqliteSyncMode::Normal,
    })
    .unwrap()
}

fn sample_summary() -> ScanSummary {
    let mut counts = BTreeMap::new();
    counts.insert("emails".to_string(), 1);
    ScanSummary {
        scan_scope: ScanScope::Full,
        counts,
        examples: BTreeMap::new(),
        categories_detected: vec!["emails".to_string()],
        total_matches: 1,
        notes: Vec::new(),
    }
}

fn sample_file(owner: UserId, filename: &str) -> NewFileRecord {
    NewFileRecord {
        filename: filename.to_string(),
        owner_user_id: owner,
        created_at: Timestamp::from_unix_millis(1_000),
        size: 64,
        content_type: "text/plain".to_string(),
        label: Label::Confidential,
        scan_summary: sample_summary(),
        policy_decision: Decision::Warn,
        decision_reason: "needs justification".to_string(),
        storage_path: format!("blobs/{filename}"),
    }
}

#[test]
fn committed_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("shareguard.db");
    let file_id = {
        let store = open_store_at(&db_path);
        store
            .with_txn(|txn| {
                let owner =
                    txn.insert_user("owner@example.com", Role::User, Timestamp::from_unix_millis(0))?;
                txn.insert_file(&sample_file(owner, "contacts.txt"))
            })
            .unwrap()
    };

    let reopened = open_store_at(&db_path);
    let file = reopened
        .with_txn(|txn| txn.file(file_id))
        .unwrap()
        .unwrap();
    assert_eq!(file.filename, "contacts.txt");
    assert_eq!(file.label, Label::Confidential);
    assert_eq!(file.policy_decision, Decision::Warn);
    assert_eq!(file.scan_summary, sample_summary());
    assert!(!file.is_deleted);
}

#[test]
fn duplicate_email_surfaces_as_constraint() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let now = Timestamp::from_unix_millis(0);
    store
        .with_txn(|txn| txn.insert_user("dup@example.com", Role::User, now))
        .unwrap();
    let result = store.with_txn(|txn| txn.insert_user("dup@example.com", Role::Admin, now));
    assert!(matches!(result, Err(StoreError::Constraint(_))));
}

#[test]
fn duplicate_share_pair_surfaces_as_constraint() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let now = Timestamp::from_unix_millis(0);
    let result = store.with_txn(|txn| {
        let owner = txn.insert_user("owner@example.com", Role::User, now)?;
        let reader = txn.insert_user("reader@example.com", Role::User, now)?;
        let file_id = txn.insert_file(&sample_file(owner, "a.txt"))?;
        txn.insert_share(file_id, reader, "read", now)?;
        txn.insert_share(file_id, reader, "read", now)
    });
    assert!(matches!(result, Err(StoreError::Constraint(_))));
}

#[test]
fn duplicate_link_token_surfaces_as_constraint() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let now = Timestamp::from_unix_millis(0);
    let result = store.with_txn(|txn| {
        let owner = txn.insert_user("owner@example.com", Role::User, now)?;
        let file_id = txn.insert_file(&sample_file(owner, "a.txt"))?;
        let link = NewExternalLink {
            file_id,
            token: LinkToken::new("same-token"),
            expires_at: Timestamp::from_unix_millis(60_000),
            created_by: owner,
            justification: Some("auditor request".to_string()),
            created_at: now,
        };
        txn.insert_link(&link)?;
        txn.insert_link(&link)
    });
    assert!(matches!(result, Err(StoreError::Constraint(_))));
}

#[test]
fn failed_unit_of_work_rolls_back_every_write() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let now = Timestamp::from_unix_millis(0);
    let result = store.with_txn(|txn| {
        let owner = txn.insert_user("owner@example.com", Role::User, now)?;
        txn.insert_file(&sample_file(owner, "a.txt"))?;
        txn.append_audit(&NewAuditEntry {
            actor_user_id: Some(owner),
            action: "upload".to_string(),
            target_type: "file".to_string(),
            target_id: "1".to_string(),
            timestamp: now,
            metadata: serde_json::Map::new(),
        })?;
        Err::<(), StoreError>(StoreError::Invalid("boom".to_string()))
    });
    assert!(result.is_err());

    let (user, files, audit) = store
        .with_txn(|txn| {
            let user = txn.user_by_email("owner@example.com")?;
            let files = txn.all_files()?;
            let audit = txn.recent_audit(None, 10)?;
            Ok::<_, StoreError>((user, files, audit))
        })
        .unwrap();
    assert!(user.is_none());
    assert!(files.is_empty());
    assert!(audit.is_empty());
}

#[test]
fn link_round_trips_status_and_justification() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let now = Timestamp::from_unix_millis(0);
    let (file_id, link_id) = store
        .with_txn(|txn| {
            let owner = txn.insert_user("owner@example.com", Role::User, now)?;
            let file_id = txn.insert_file(&sample_file(owner, "a.txt"))?;
            let link_id = txn.insert_link(&NewExternalLink {
                file_id,
                token: LinkToken::new("tok-1"),
                expires_at: Timestamp::from_unix_millis(60_000),
                created_by: owner,
                justification: Some("auditor request".to_string()),
                created_at: now,
            })?;
            Ok::<_, StoreError>((file_id, link_id))
        })
        .unwrap();

    let link = store
        .with_txn(|txn| txn.link(file_id, link_id))
        .unwrap()
        .unwrap();
    assert_eq!(link.status, LinkStatus::Active);
    assert_eq!(link.justification.as_deref(), Some("auditor request"));

    store.with_txn(|txn| txn.mark_link_revoked(link_id)).unwrap();
    let revoked = store
        .with_txn(|txn| txn.link_by_token(&LinkToken::new("tok-1")))
        .unwrap()
        .unwrap();
    assert_eq!(revoked.status, LinkStatus::Revoked);
}

#[test]
fn listings_are_newest_first_and_scoped() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let (owner, reader) = store
        .with_txn(|txn| {
            let owner =
                txn.insert_user("owner@example.com", Role::User, Timestamp::from_unix_millis(0))?;
            let reader =
                txn.insert_user("reader@example.com", Role::User, Timestamp::from_unix_millis(0))?;
            let mut old = sample_file(owner, "old.txt");
            old.created_at = Timestamp::from_unix_millis(1_000);
            let mut new = sample_file(owner, "new.txt");
            new.created_at = Timestamp::from_unix_millis(2_000);
            let old_id = txn.insert_file(&old)?;
            txn.insert_file(&new)?;
            txn.insert_share(old_id, reader, "read", Timestamp::from_unix_millis(1_500))?;
            Ok::<_, StoreError>((owner, reader))
        })
        .unwrap();

    let owned = store.with_txn(|txn| txn.files_owned_by(owner)).unwrap();
    assert_eq!(owned.len(), 2);
    assert_eq!(owned[0].filename, "new.txt");

    let shared = store.with_txn(|txn| txn.files_shared_with(reader)).unwrap();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].filename, "old.txt");
}

#[test]
fn audit_queries_filter_by_target_and_actor() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let now = Timestamp::from_unix_millis(0);
    let actor = store
        .with_txn(|txn| {
            let actor = txn.insert_user("owner@example.com", Role::User, now)?;
            for (index, target) in ["1", "1", "2"].iter().enumerate() {
                txn.append_audit(&NewAuditEntry {
                    actor_user_id: Some(actor),
                    action: format!("action-{index}"),
                    target_type: "file".to_string(),
                    target_id: (*target).to_string(),
                    timestamp: now,
                    metadata: serde_json::Map::new(),
                })?;
            }
            Ok::<_, StoreError>(actor)
        })
        .unwrap();

    let for_file = store.with_txn(|txn| txn.audit_for_target("file", "1")).unwrap();
    assert_eq!(for_file.len(), 2);
    assert_eq!(for_file[0].action, "action-1");

    let recent = store.with_txn(|txn| txn.recent_audit(Some(actor), 2)).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].action, "action-2");
}

#[test]
fn audit_between_returns_the_half_open_range_oldest_first() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store
        .with_txn(|txn| {
            let actor = txn.insert_user("owner@example.com", Role::User, Timestamp::from_unix_millis(0))?;
            for millis in [1_000_i64, 2_000, 3_000, 4_000] {
                txn.append_audit(&NewAuditEntry {
                    actor_user_id: Some(actor),
                    action: format!("at-{millis}"),
                    target_type: "file".to_string(),
                    target_id: "1".to_string(),
                    timestamp: Timestamp::from_unix_millis(millis),
                    metadata: serde_json::Map::new(),
                })?;
            }
            Ok::<_, StoreError>(())
        })
        .unwrap();

    let window = store
        .with_txn(|txn| {
            txn.audit_between(Timestamp::from_unix_millis(2_000), Timestamp::from_unix_millis(4_000))
        })
        .unwrap();
    let actions: Vec<&str> = window.iter().map(|entry| entry.action.as_str()).collect();
    assert_eq!(actions, vec!["at-2000", "at-3000"]);
}

#[test]
fn ensure_user_is_idempotent_and_normalizes_email() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let now = Timestamp::from_unix_millis(0);
    let first = store.ensure_user("Admin@Example.com", Role::Admin, now).unwrap();
    let second = store.ensure_user("  admin@example.com ", Role::User, now).unwrap();
    assert_eq!(first, second);

    let user = store
        .with_txn(|txn| txn.user_by_email("admin@example.com"))
        .unwrap()
        .unwrap();
    assert_eq!(user.role, Role::Admin);
}

#[test]
fn store_path_must_not_be_a_directory() {
    let dir = TempDir::new().unwrap();
    let result = SqliteShareStore::new(SqliteStoreConfig {
        path: dir.path().to_path_buf(),
        busy_timeout_ms: 1_000,
        journal_mode: shareguard_store_sqlite::SqliteStoreMode::Wal,
        sync_mode: shareguard_store_sqlite::SqliteSyncMode::Normal,
    });
    assert!(result.is_err());
}

#[test]
fn file_lookup_distinguishes_present_and_missing_rows() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let file_id = store
        .with_txn(|txn| {
            let owner =
                txn.insert_user("owner@example.com", Role::User, Timestamp::from_unix_millis(0))?;
            txn.insert_file(&sample_file(owner, "a.txt"))
        })
        .unwrap();
    let loaded = store.with_txn(|txn| txn.file(file_id)).unwrap();
    assert!(loaded.is_some());
    assert_eq!(loaded.unwrap().id, file_id);
    assert!(matches!(
        store.with_txn(|txn| txn.file(FileId::from_raw(999).unwrap())).unwrap(),
        None
    ));
}
