// crates/shareguard-core/src/interfaces/mod.rs
// ============================================================================
// Module: ShareGuard Interfaces
// Description: Backend-agnostic interfaces for persistence, time, and tokens.
// Purpose: Define the contract surfaces used by the sharing lifecycle.
// Dependencies: base64, rand, thiserror, crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the sharing lifecycle integrates with external
//! systems without embedding backend-specific details. The store contract is
//! transactional: every lifecycle operation executes as one atomic unit of
//! work, and uniqueness invariants are enforced by the store itself rather
//! than by check-then-act in the caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;

use crate::core::actor::Role;
use crate::core::identifiers::AuditId;
use crate::core::identifiers::FileId;
use crate::core::identifiers::LinkId;
use crate::core::identifiers::LinkToken;
use crate::core::identifiers::ShareId;
use crate::core::identifiers::UserId;
use crate::core::label::Label;
use crate::core::policy::Decision;
use crate::core::records::AuditEntry;
use crate::core::records::ExternalLink;
use crate::core::records::FileRecord;
use crate::core::records::InternalShare;
use crate::core::records::NewAuditEntry;
use crate::core::records::NewExternalLink;
use crate::core::records::NewFileRecord;
use crate::core::records::UserRecord;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Share store errors.
///
/// # Invariants
/// - Messages avoid embedding raw file content or scan payloads.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("share store io error: {0}")]
    Io(String),
    /// A hard uniqueness constraint rejected the write.
    #[error("share store constraint violation: {0}")]
    Constraint(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("share store corruption: {0}")]
    Corrupt(String),
    /// Store data is invalid.
    #[error("share store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("share store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Transactional Store
// ============================================================================

/// Operations available inside one atomic unit of work.
///
/// Reads performed through a transaction see the transaction's own writes.
/// Row ids are assigned by the store on insert.
pub trait StoreTxn {
    /// Loads a file record by id, including soft-deleted rows.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the read fails.
    fn file(&mut self, id: FileId) -> Result<Option<FileRecord>, StoreError>;

    /// Inserts a file record and returns its assigned id.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the write fails.
    fn insert_file(&mut self, file: &NewFileRecord) -> Result<FileId, StoreError>;

    /// Overwrites a file's label and resting policy decision.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the write fails.
    fn update_file_classification(
        &mut self,
        id: FileId,
        label: Label,
        decision: Decision,
        reason: &str,
    ) -> Result<(), StoreError>;

    /// Lists live (not soft-deleted) files owned by a user, newest first.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the read fails.
    fn files_owned_by(&mut self, user_id: UserId) -> Result<Vec<FileRecord>, StoreError>;

    /// Lists live files shared with a user, newest first.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the read fails.
    fn files_shared_with(&mut self, user_id: UserId) -> Result<Vec<FileRecord>, StoreError>;

    /// Lists all live files, newest first.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the read fails.
    fn all_files(&mut self) -> Result<Vec<FileRecord>, StoreError>;

    /// Inserts a user and returns its assigned id.
    ///
    /// Used by host seeding and tests; identity verification is out of scope.
    ///
    /// # Errors
    /// Returns [`StoreError::Constraint`] when the email already exists.
    fn insert_user(
        &mut self,
        email: &str,
        role: Role,
        created_at: Timestamp,
    ) -> Result<UserId, StoreError>;

    /// Resolves a user by exact email.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the read fails.
    fn user_by_email(&mut self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Loads a user record by id.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the read fails.
    fn user(&mut self, id: UserId) -> Result<Option<UserRecord>, StoreError>;

    /// Loads the share for a `(file, user)` pair, when present.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the read fails.
    fn share_for(
        &mut self,
        file_id: FileId,
        user_id: UserId,
    ) -> Result<Option<InternalShare>, StoreError>;

    /// Loads a share by id, scoped to a file.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the read fails.
    fn share(
        &mut self,
        file_id: FileId,
        share_id: ShareId,
    ) -> Result<Option<InternalShare>, StoreError>;

    /// Inserts an internal share and returns its assigned id.
    ///
    /// # Errors
    /// Returns [`StoreError::Constraint`] when a share for the `(file, user)`
    /// pair already exists.
    fn insert_share(
        &mut self,
        file_id: FileId,
        user_id: UserId,
        permission: &str,
        created_at: Timestamp,
    ) -> Result<ShareId, StoreError>;

    /// Deletes an internal share.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the write fails.
    fn delete_share(&mut self, share_id: ShareId) -> Result<(), StoreError>;

    /// Loads a link by id, scoped to a file.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the read fails.
    fn link(&mut self, file_id: FileId, link_id: LinkId)
    -> Result<Option<ExternalLink>, StoreError>;

    /// Resolves a link by its bearer token.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the read fails.
    fn link_by_token(&mut self, token: &LinkToken) -> Result<Option<ExternalLink>, StoreError>;

    /// Inserts an external link and returns its assigned id.
    ///
    /// # Errors
    /// Returns [`StoreError::Constraint`] when the token already exists.
    fn insert_link(&mut self, link: &NewExternalLink) -> Result<LinkId, StoreError>;

    /// Marks a link revoked (one-way).
    ///
    /// # Errors
    /// Returns [`StoreError`] when the write fails.
    fn mark_link_revoked(&mut self, link_id: LinkId) -> Result<(), StoreError>;

    /// Appends an audit entry and returns its insertion-ordered id.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the write fails.
    fn append_audit(&mut self, entry: &NewAuditEntry) -> Result<AuditId, StoreError>;

    /// Lists audit entries for one target, newest first.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the read fails.
    fn audit_for_target(
        &mut self,
        target_type: &str,
        target_id: &str,
    ) -> Result<Vec<AuditEntry>, StoreError>;

    /// Lists the most recent audit entries, newest first, up to `limit`.
    ///
    /// When `actor` is set, only entries recorded for that actor count
    /// towards the limit.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the read fails.
    fn recent_audit(
        &mut self,
        actor: Option<UserId>,
        limit: usize,
    ) -> Result<Vec<AuditEntry>, StoreError>;

    /// Lists audit entries recorded within `[from, until)`, oldest first.
    ///
    /// Feeds report exports, so rows come back in recording order.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the read fails.
    fn audit_between(
        &mut self,
        from: Timestamp,
        until: Timestamp,
    ) -> Result<Vec<AuditEntry>, StoreError>;
}

/// Transactional share store.
///
/// # Invariants
/// - The closure's writes and the commit are all-or-nothing: any error from
///   the closure or from the commit leaves no observable partial state.
/// - Uniqueness of `(file, user)` shares, link tokens, and user emails is a
///   hard store constraint; concurrent duplicate inserts race to one
///   surviving row.
pub trait ShareStore {
    /// Executes `work` as one atomic unit against the store.
    ///
    /// # Errors
    /// Returns the closure's error unchanged after rolling back, or the
    /// store's own error (converted through `E`) when the unit cannot begin
    /// or commit.
    fn with_txn<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTxn) -> Result<T, E>,
        E: From<StoreError>;
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Wall-clock source for lifecycle operations.
///
/// The lifecycle never reads system time directly; a clock is injected so
/// expiry checks and audit timestamps replay deterministically in tests.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}

/// System wall-clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX));
        Timestamp::from_unix_millis(millis)
    }
}

// ============================================================================
// SECTION: Token Source
// ============================================================================

/// Number of random bytes in a generated link token.
const TOKEN_ENTROPY_BYTES: usize = 24;

/// Source of opaque bearer tokens for external links.
pub trait TokenSource {
    /// Generates a fresh token.
    ///
    /// Uniqueness across all links is ultimately enforced by the store; the
    /// source only guarantees enough entropy to make collisions negligible.
    fn generate(&self) -> LinkToken;
}

/// Token source backed by the operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRngTokenSource;

impl TokenSource for OsRngTokenSource {
    fn generate(&self) -> LinkToken {
        let mut bytes = [0_u8; TOKEN_ENTROPY_BYTES];
        OsRng.fill_bytes(&mut bytes);
        LinkToken::new(URL_SAFE_NO_PAD.encode(bytes))
    }
}
