// crates/shareguard-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Share Store
// Description: Durable ShareStore backed by SQLite WAL.
// Purpose: Persist users, files, shares, links, and the audit log.
// Dependencies: shareguard-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`ShareStore`] using `SQLite`. Each unit
//! of work runs inside one `SQLite` transaction: the closure's writes and the
//! commit are all-or-nothing. Uniqueness (user emails, `(file, user)` share
//! pairs, link tokens) is enforced by the schema and surfaces as
//! [`StoreError::Constraint`]. Rows are decoded strictly on read and fail
//! closed on unrecognized label, decision, or status values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::params;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;
use shareguard_core::AuditEntry;
use shareguard_core::AuditId;
use shareguard_core::Decision;
use shareguard_core::ExternalLink;
use shareguard_core::FileId;
use shareguard_core::FileRecord;
use shareguard_core::InternalShare;
use shareguard_core::Label;
use shareguard_core::LinkId;
use shareguard_core::LinkStatus;
use shareguard_core::LinkToken;
use shareguard_core::NewAuditEntry;
use shareguard_core::NewExternalLink;
use shareguard_core::NewFileRecord;
use shareguard_core::Role;
use shareguard_core::ScanSummary;
use shareguard_core::ShareId;
use shareguard_core::ShareStore;
use shareguard_core::StoreError;
use shareguard_core::StoreTxn;
use shareguard_core::Timestamp;
use shareguard_core::UserId;
use shareguard_core::UserRecord;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Column list shared by every file query.
const FILE_COLUMNS: &str = "id, filename, owner_user_id, created_at, size, content_type, label, \
                            scan_summary, policy_decision, decision_reason, storage_path, \
                            is_deleted";
/// Column list shared by every audit query.
const AUDIT_COLUMNS: &str = "id, actor_user_id, action, target_type, target_id, timestamp, \
                             metadata";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` share store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data or configuration.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) | SqliteStoreError::Invalid(message) => {
                Self::Invalid(message)
            }
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed share store with WAL support.
#[derive(Clone)]
pub struct SqliteShareStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteShareStore {
    /// Opens an `SQLite`-backed share store.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Resolves a user by email, creating the row when absent.
    ///
    /// Seed helper for hosts and tests; identity verification is out of
    /// scope. The email is trimmed and lowercased before lookup.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the lookup or insert fails.
    pub fn ensure_user(
        &self,
        email: &str,
        role: Role,
        created_at: Timestamp,
    ) -> Result<UserId, StoreError> {
        let normalized = email.trim().to_lowercase();
        self.with_txn(|txn| match txn.user_by_email(&normalized)? {
            Some(user) => Ok(user.id),
            None => txn.insert_user(&normalized, role, created_at),
        })
    }
}

impl ShareStore for SqliteShareStore {
    fn with_txn<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTxn) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| E::from(StoreError::Store("sqlite store mutex poisoned".to_string())))?;
        let tx = guard.transaction().map_err(|err| E::from(db_error(err)))?;
        let mut view = SqliteTxn {
            tx,
        };
        match work(&mut view) {
            Ok(value) => {
                view.tx.commit().map_err(|err| E::from(db_error(err)))?;
                Ok(value)
            }
            Err(error) => {
                // Dropping the transaction rolls back every write.
                drop(view);
                drop(guard);
                Err(error)
            }
        }
    }
}

// ============================================================================
// SECTION: Transaction View
// ============================================================================

/// Unit-of-work view over one `SQLite` transaction.
struct SqliteTxn<'c> {
    /// The open transaction; dropped without commit on failure.
    tx: Transaction<'c>,
}

impl StoreTxn for SqliteTxn<'_> {
    fn file(&mut self, id: FileId) -> Result<Option<FileRecord>, StoreError> {
        let raw = self
            .tx
            .query_row(
                &format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ?1"),
                params![id.get()],
                raw_file,
            )
            .optional()
            .map_err(db_error)?;
        raw.map(decode_file).transpose()
    }

    fn insert_file(&mut self, file: &NewFileRecord) -> Result<FileId, StoreError> {
        let summary = serde_json::to_string(&file.scan_summary)
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        self.tx
            .execute(
                "INSERT INTO files (filename, owner_user_id, created_at, size, content_type, \
                 label, scan_summary, policy_decision, decision_reason, storage_path, is_deleted) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0)",
                params![
                    file.filename,
                    file.owner_user_id.get(),
                    file.created_at.as_unix_millis(),
                    i64::try_from(file.size).unwrap_or(i64::MAX),
                    file.content_type,
                    file.label.as_str(),
                    summary,
                    file.policy_decision.as_str(),
                    file.decision_reason,
                    file.storage_path,
                ],
            )
            .map_err(db_error)?;
        row_id(self.tx.last_insert_rowid(), FileId::from_raw)
    }

    fn update_file_classification(
        &mut self,
        id: FileId,
        label: Label,
        decision: Decision,
        reason: &str,
    ) -> Result<(), StoreError> {
        let changed = self
            .tx
            .execute(
                "UPDATE files SET label = ?2, policy_decision = ?3, decision_reason = ?4 WHERE id \
                 = ?1",
                params![id.get(), label.as_str(), decision.as_str(), reason],
            )
            .map_err(db_error)?;
        if changed == 0 {
            return Err(StoreError::Invalid(format!("no file row: {id}")));
        }
        Ok(())
    }

    fn files_owned_by(&mut self, user_id: UserId) -> Result<Vec<FileRecord>, StoreError> {
        self.query_files(
            &format!(
                "SELECT {FILE_COLUMNS} FROM files WHERE is_deleted = 0 AND owner_user_id = ?1 \
                 ORDER BY created_at DESC, id DESC"
            ),
            params![user_id.get()],
        )
    }

    fn files_shared_with(&mut self, user_id: UserId) -> Result<Vec<FileRecord>, StoreError> {
        self.query_files(
            &format!(
                "SELECT {FILE_COLUMNS} FROM files WHERE is_deleted = 0 AND id IN (SELECT file_id \
                 FROM internal_shares WHERE user_id = ?1) ORDER BY created_at DESC, id DESC"
            ),
            params![user_id.get()],
        )
    }

    fn all_files(&mut self) -> Result<Vec<FileRecord>, StoreError> {
        self.query_files(
            &format!(
                "SELECT {FILE_COLUMNS} FROM files WHERE is_deleted = 0 ORDER BY created_at DESC, \
                 id DESC"
            ),
            params![],
        )
    }

    fn insert_user(
        &mut self,
        email: &str,
        role: Role,
        created_at: Timestamp,
    ) -> Result<UserId, StoreError> {
        self.tx
            .execute(
                "INSERT INTO users (email, role, created_at) VALUES (?1, ?2, ?3)",
                params![email, role.as_str(), created_at.as_unix_millis()],
            )
            .map_err(db_error)?;
        row_id(self.tx.last_insert_rowid(), UserId::from_raw)
    }

    fn user_by_email(&mut self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let raw = self
            .tx
            .query_row(
                "SELECT id, email, role, created_at FROM users WHERE email = ?1",
                params![email],
                raw_user,
            )
            .optional()
            .map_err(db_error)?;
        raw.map(decode_user).transpose()
    }

    fn user(&mut self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let raw = self
            .tx
            .query_row(
                "SELECT id, email, role, created_at FROM users WHERE id = ?1",
                params![id.get()],
                raw_user,
            )
            .optional()
            .map_err(db_error)?;
        raw.map(decode_user).transpose()
    }

    fn share_for(
        &mut self,
        file_id: FileId,
        user_id: UserId,
    ) -> Result<Option<InternalShare>, StoreError> {
        let raw = self
            .tx
            .query_row(
                "SELECT id, file_id, user_id, permission, created_at FROM internal_shares WHERE \
                 file_id = ?1 AND user_id = ?2",
                params![file_id.get(), user_id.get()],
                raw_share,
            )
            .optional()
            .map_err(db_error)?;
        raw.map(decode_share).transpose()
    }

    fn share(
        &mut self,
        file_id: FileId,
        share_id: ShareId,
    ) -> Result<Option<InternalShare>, StoreError> {
        let raw = self
            .tx
            .query_row(
                "SELECT id, file_id, user_id, permission, created_at FROM internal_shares WHERE \
                 id = ?1 AND file_id = ?2",
                params![share_id.get(), file_id.get()],
                raw_share,
            )
            .optional()
            .map_err(db_error)?;
        raw.map(decode_share).transpose()
    }

    fn insert_share(
        &mut self,
        file_id: FileId,
        user_id: UserId,
        permission: &str,
        created_at: Timestamp,
    ) -> Result<ShareId, StoreError> {
        self.tx
            .execute(
                "INSERT INTO internal_shares (file_id, user_id, permission, created_at) VALUES \
                 (?1, ?2, ?3, ?4)",
                params![file_id.get(), user_id.get(), permission, created_at.as_unix_millis()],
            )
            .map_err(db_error)?;
        row_id(self.tx.last_insert_rowid(), ShareId::from_raw)
    }

    fn delete_share(&mut self, share_id: ShareId) -> Result<(), StoreError> {
        let changed = self
            .tx
            .execute("DELETE FROM internal_shares WHERE id = ?1", params![share_id.get()])
            .map_err(db_error)?;
        if changed == 0 {
            return Err(StoreError::Invalid(format!("no share row: {share_id}")));
        }
        Ok(())
    }

    fn link(
        &mut self,
        file_id: FileId,
        link_id: LinkId,
    ) -> Result<Option<ExternalLink>, StoreError> {
        let raw = self
            .tx
            .query_row(
                "SELECT id, file_id, token, expires_at, created_by, status, justification, \
                 created_at FROM external_links WHERE id = ?1 AND file_id = ?2",
                params![link_id.get(), file_id.get()],
                raw_link,
            )
            .optional()
            .map_err(db_error)?;
        raw.map(decode_link).transpose()
    }

    fn link_by_token(&mut self, token: &LinkToken) -> Result<Option<ExternalLink>, StoreError> {
        let raw = self
            .tx
            .query_row(
                "SELECT id, file_id, token, expires_at, created_by, status, justification, \
                 created_at FROM external_links WHERE token = ?1",
                params![token.as_str()],
                raw_link,
            )
            .optional()
            .map_err(db_error)?;
        raw.map(decode_link).transpose()
    }

    fn insert_link(&mut self, link: &NewExternalLink) -> Result<LinkId, StoreError> {
        self.tx
            .execute(
                "INSERT INTO external_links (file_id, token, expires_at, created_by, status, \
                 justification, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    link.file_id.get(),
                    link.token.as_str(),
                    link.expires_at.as_unix_millis(),
                    link.created_by.get(),
                    LinkStatus::Active.as_str(),
                    link.justification,
                    link.created_at.as_unix_millis(),
                ],
            )
            .map_err(db_error)?;
        row_id(self.tx.last_insert_rowid(), LinkId::from_raw)
    }

    fn mark_link_revoked(&mut self, link_id: LinkId) -> Result<(), StoreError> {
        let changed = self
            .tx
            .execute(
                "UPDATE external_links SET status = ?2 WHERE id = ?1",
                params![link_id.get(), LinkStatus::Revoked.as_str()],
            )
            .map_err(db_error)?;
        if changed == 0 {
            return Err(StoreError::Invalid(format!("no link row: {link_id}")));
        }
        Ok(())
    }

    fn append_audit(&mut self, entry: &NewAuditEntry) -> Result<AuditId, StoreError> {
        let metadata = serde_json::to_string(&entry.metadata)
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        self.tx
            .execute(
                "INSERT INTO audit_log (actor_user_id, action, target_type, target_id, \
                 timestamp, metadata) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    entry.actor_user_id.map(UserId::get),
                    entry.action,
                    entry.target_type,
                    entry.target_id,
                    entry.timestamp.as_unix_millis(),
                    metadata,
                ],
            )
            .map_err(db_error)?;
        row_id(self.tx.last_insert_rowid(), AuditId::from_raw)
    }

    fn audit_for_target(
        &mut self,
        target_type: &str,
        target_id: &str,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        self.query_audit(
            &format!(
                "SELECT {AUDIT_COLUMNS} FROM audit_log WHERE target_type = ?1 AND target_id = ?2 \
                 ORDER BY id DESC"
            ),
            params![target_type, target_id],
        )
    }

    fn recent_audit(
        &mut self,
        actor: Option<UserId>,
        limit: usize,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        let capped = i64::try_from(limit).unwrap_or(i64::MAX);
        match actor {
            Some(user_id) => self.query_audit(
                &format!(
                    "SELECT {AUDIT_COLUMNS} FROM audit_log WHERE actor_user_id = ?1 ORDER BY id \
                     DESC LIMIT ?2"
                ),
                params![user_id.get(), capped],
            ),
            None => self.query_audit(
                &format!("SELECT {AUDIT_COLUMNS} FROM audit_log ORDER BY id DESC LIMIT ?1"),
                params![capped],
            ),
        }
    }

    fn audit_between(
        &mut self,
        from: Timestamp,
        until: Timestamp,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        self.query_audit(
            &format!(
                "SELECT {AUDIT_COLUMNS} FROM audit_log WHERE timestamp >= ?1 AND timestamp < ?2 \
                 ORDER BY id ASC"
            ),
            params![from.as_unix_millis(), until.as_unix_millis()],
        )
    }
}

impl SqliteTxn<'_> {
    /// Runs a file query and decodes every row.
    fn query_files(
        &mut self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<FileRecord>, StoreError> {
        let mut statement = self.tx.prepare(sql).map_err(db_error)?;
        let rows = statement.query_map(params, raw_file).map_err(db_error)?;
        let mut files = Vec::new();
        for row in rows {
            files.push(decode_file(row.map_err(db_error)?)?);
        }
        Ok(files)
    }

    /// Runs an audit query and decodes every row.
    fn query_audit(
        &mut self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<AuditEntry>, StoreError> {
        let mut statement = self.tx.prepare(sql).map_err(db_error)?;
        let rows = statement.query_map(params, raw_audit).map_err(db_error)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(decode_audit(row.map_err(db_error)?)?);
        }
        Ok(entries)
    }
}

// ============================================================================
// SECTION: Row Decoding
// ============================================================================

/// File row as stored, before strict decoding.
struct RawFile {
    /// Row id.
    id: i64,
    /// Original filename.
    filename: String,
    /// Owning user row id.
    owner_user_id: i64,
    /// Creation instant in unix millis.
    created_at: i64,
    /// Content size in bytes.
    size: i64,
    /// Declared content type.
    content_type: String,
    /// Stored label text.
    label: String,
    /// Scan summary JSON.
    scan_summary: String,
    /// Stored decision text.
    policy_decision: String,
    /// Decision reason.
    decision_reason: String,
    /// Opaque storage location.
    storage_path: String,
    /// Soft-delete flag.
    is_deleted: i64,
}

/// Maps a file row into [`RawFile`].
fn raw_file(row: &Row<'_>) -> rusqlite::Result<RawFile> {
    Ok(RawFile {
        id: row.get(0)?,
        filename: row.get(1)?,
        owner_user_id: row.get(2)?,
        created_at: row.get(3)?,
        size: row.get(4)?,
        content_type: row.get(5)?,
        label: row.get(6)?,
        scan_summary: row.get(7)?,
        policy_decision: row.get(8)?,
        decision_reason: row.get(9)?,
        storage_path: row.get(10)?,
        is_deleted: row.get(11)?,
    })
}

/// Strictly decodes a stored file row.
fn decode_file(raw: RawFile) -> Result<FileRecord, StoreError> {
    let label = Label::parse(&raw.label)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown label: {}", raw.label)))?;
    let scan_summary: ScanSummary = serde_json::from_str(&raw.scan_summary)
        .map_err(|err| StoreError::Corrupt(format!("scan summary: {err}")))?;
    Ok(FileRecord {
        id: row_id(raw.id, FileId::from_raw)?,
        filename: raw.filename,
        owner_user_id: row_id(raw.owner_user_id, UserId::from_raw)?,
        created_at: Timestamp::from_unix_millis(raw.created_at),
        size: u64::try_from(raw.size)
            .map_err(|_| StoreError::Corrupt("negative file size".to_string()))?,
        content_type: raw.content_type,
        label,
        scan_summary,
        policy_decision: decode_decision(&raw.policy_decision)?,
        decision_reason: raw.decision_reason,
        storage_path: raw.storage_path,
        is_deleted: raw.is_deleted != 0,
    })
}

/// User row as stored.
struct RawUser {
    /// Row id.
    id: i64,
    /// Unique email.
    email: String,
    /// Stored role text.
    role: String,
    /// Creation instant in unix millis.
    created_at: i64,
}

/// Maps a user row into [`RawUser`].
fn raw_user(row: &Row<'_>) -> rusqlite::Result<RawUser> {
    Ok(RawUser {
        id: row.get(0)?,
        email: row.get(1)?,
        role: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Decodes a stored user row.
fn decode_user(raw: RawUser) -> Result<UserRecord, StoreError> {
    Ok(UserRecord {
        id: row_id(raw.id, UserId::from_raw)?,
        email: raw.email,
        role: Role::parse(&raw.role),
        created_at: Timestamp::from_unix_millis(raw.created_at),
    })
}

/// Share row as stored.
struct RawShare {
    /// Row id.
    id: i64,
    /// File row id.
    file_id: i64,
    /// Target user row id.
    user_id: i64,
    /// Granted permission.
    permission: String,
    /// Creation instant in unix millis.
    created_at: i64,
}

/// Maps a share row into [`RawShare`].
fn raw_share(row: &Row<'_>) -> rusqlite::Result<RawShare> {
    Ok(RawShare {
        id: row.get(0)?,
        file_id: row.get(1)?,
        user_id: row.get(2)?,
        permission: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Decodes a stored share row.
fn decode_share(raw: RawShare) -> Result<InternalShare, StoreError> {
    Ok(InternalShare {
        id: row_id(raw.id, ShareId::from_raw)?,
        file_id: row_id(raw.file_id, FileId::from_raw)?,
        user_id: row_id(raw.user_id, UserId::from_raw)?,
        permission: raw.permission,
        created_at: Timestamp::from_unix_millis(raw.created_at),
    })
}

/// Link row as stored.
struct RawLink {
    /// Row id.
    id: i64,
    /// File row id.
    file_id: i64,
    /// Bearer token.
    token: String,
    /// Expiry instant in unix millis.
    expires_at: i64,
    /// Creating user row id.
    created_by: i64,
    /// Stored status text.
    status: String,
    /// Optional business justification.
    justification: Option<String>,
    /// Creation instant in unix millis.
    created_at: i64,
}

/// Maps a link row into [`RawLink`].
fn raw_link(row: &Row<'_>) -> rusqlite::Result<RawLink> {
    Ok(RawLink {
        id: row.get(0)?,
        file_id: row.get(1)?,
        token: row.get(2)?,
        expires_at: row.get(3)?,
        created_by: row.get(4)?,
        status: row.get(5)?,
        justification: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Decodes a stored link row.
fn decode_link(raw: RawLink) -> Result<ExternalLink, StoreError> {
    Ok(ExternalLink {
        id: row_id(raw.id, LinkId::from_raw)?,
        file_id: row_id(raw.file_id, FileId::from_raw)?,
        token: LinkToken::new(raw.token),
        expires_at: Timestamp::from_unix_millis(raw.expires_at),
        created_by: row_id(raw.created_by, UserId::from_raw)?,
        status: decode_status(&raw.status)?,
        justification: raw.justification,
        created_at: Timestamp::from_unix_millis(raw.created_at),
    })
}

/// Audit row as stored.
struct RawAudit {
    /// Row id.
    id: i64,
    /// Acting user row id; null for anonymous access.
    actor_user_id: Option<i64>,
    /// Action tag.
    action: String,
    /// Target type tag.
    target_type: String,
    /// Target identity as text.
    target_id: String,
    /// Action instant in unix millis.
    timestamp: i64,
    /// Metadata JSON object.
    metadata: String,
}

/// Maps an audit row into [`RawAudit`].
fn raw_audit(row: &Row<'_>) -> rusqlite::Result<RawAudit> {
    Ok(RawAudit {
        id: row.get(0)?,
        actor_user_id: row.get(1)?,
        action: row.get(2)?,
        target_type: row.get(3)?,
        target_id: row.get(4)?,
        timestamp: row.get(5)?,
        metadata: row.get(6)?,
    })
}

/// Decodes a stored audit row.
fn decode_audit(raw: RawAudit) -> Result<AuditEntry, StoreError> {
    let metadata: Map<String, Value> = serde_json::from_str(&raw.metadata)
        .map_err(|err| StoreError::Corrupt(format!("audit metadata: {err}")))?;
    Ok(AuditEntry {
        id: row_id(raw.id, AuditId::from_raw)?,
        actor_user_id: raw.actor_user_id.map(|id| row_id(id, UserId::from_raw)).transpose()?,
        action: raw.action,
        target_type: raw.target_type,
        target_id: raw.target_id,
        timestamp: Timestamp::from_unix_millis(raw.timestamp),
        metadata,
    })
}

/// Decodes a stored decision value.
fn decode_decision(value: &str) -> Result<Decision, StoreError> {
    match value {
        "allow" => Ok(Decision::Allow),
        "warn" => Ok(Decision::Warn),
        "block" => Ok(Decision::Block),
        other => Err(StoreError::Corrupt(format!("unknown decision: {other}"))),
    }
}

/// Decodes a stored link status value.
fn decode_status(value: &str) -> Result<LinkStatus, StoreError> {
    match value {
        "active" => Ok(LinkStatus::Active),
        "revoked" => Ok(LinkStatus::Revoked),
        other => Err(StoreError::Corrupt(format!("unknown link status: {other}"))),
    }
}

/// Builds a typed row id, rejecting non-positive values.
fn row_id<I>(raw: i64, build: fn(i64) -> Option<I>) -> Result<I, StoreError> {
    build(raw).ok_or_else(|| StoreError::Corrupt(format!("non-positive row id: {raw}")))
}

/// Maps a `rusqlite` error, surfacing constraint violations distinctly.
fn db_error(error: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(code, ref message) = error
        && code.code == rusqlite::ErrorCode::ConstraintViolation
    {
        return StoreError::Constraint(
            message.clone().unwrap_or_else(|| "constraint violation".to_string()),
        );
    }
    StoreError::Store(error.to_string())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    email TEXT NOT NULL UNIQUE,
                    role TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS files (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    filename TEXT NOT NULL,
                    owner_user_id INTEGER NOT NULL,
                    created_at INTEGER NOT NULL,
                    size INTEGER NOT NULL,
                    content_type TEXT NOT NULL,
                    label TEXT NOT NULL,
                    scan_summary TEXT NOT NULL,
                    policy_decision TEXT NOT NULL,
                    decision_reason TEXT NOT NULL,
                    storage_path TEXT NOT NULL,
                    is_deleted INTEGER NOT NULL DEFAULT 0,
                    FOREIGN KEY (owner_user_id) REFERENCES users(id)
                );
                CREATE TABLE IF NOT EXISTS internal_shares (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    file_id INTEGER NOT NULL,
                    user_id INTEGER NOT NULL,
                    permission TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    UNIQUE (file_id, user_id),
                    FOREIGN KEY (file_id) REFERENCES files(id),
                    FOREIGN KEY (user_id) REFERENCES users(id)
                );
                CREATE TABLE IF NOT EXISTS external_links (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    file_id INTEGER NOT NULL,
                    token TEXT NOT NULL UNIQUE,
                    expires_at INTEGER NOT NULL,
                    created_by INTEGER NOT NULL,
                    status TEXT NOT NULL,
                    justification TEXT,
                    created_at INTEGER NOT NULL,
                    FOREIGN KEY (file_id) REFERENCES files(id),
                    FOREIGN KEY (created_by) REFERENCES users(id)
                );
                CREATE TABLE IF NOT EXISTS audit_log (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    actor_user_id INTEGER,
                    action TEXT NOT NULL,
                    target_type TEXT NOT NULL,
                    target_id TEXT NOT NULL,
                    timestamp INTEGER NOT NULL,
                    metadata TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_files_owner ON files (owner_user_id);
                CREATE INDEX IF NOT EXISTS idx_shares_user ON internal_shares (user_id);
                CREATE INDEX IF NOT EXISTS idx_audit_target
                    ON audit_log (target_type, target_id);
                CREATE INDEX IF NOT EXISTS idx_audit_actor ON audit_log (actor_user_id);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
