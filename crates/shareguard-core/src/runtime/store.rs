// crates/shareguard-core/src/runtime/store.rs
// ============================================================================
// Module: ShareGuard In-Memory Store
// Description: Simple in-memory share store for tests and examples.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of [`ShareStore`]
//! for tests and local demos. Atomicity is snapshot-based: the unit of work
//! runs against a copy of the tables and the copy replaces the shared state
//! only when the closure succeeds. It is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

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
use crate::core::records::LinkStatus;
use crate::core::records::NewAuditEntry;
use crate::core::records::NewExternalLink;
use crate::core::records::NewFileRecord;
use crate::core::records::UserRecord;
use crate::core::time::Timestamp;
use crate::interfaces::ShareStore;
use crate::interfaces::StoreError;
use crate::interfaces::StoreTxn;

// ============================================================================
// SECTION: Tables
// ============================================================================

/// All in-memory tables plus id counters.
#[derive(Debug, Default, Clone)]
struct Tables {
    /// User rows keyed by id.
    users: BTreeMap<i64, UserRecord>,
    /// File rows keyed by id.
    files: BTreeMap<i64, FileRecord>,
    /// Share rows keyed by id.
    shares: BTreeMap<i64, InternalShare>,
    /// Link rows keyed by id.
    links: BTreeMap<i64, ExternalLink>,
    /// Append-only audit rows in insertion order.
    audit: Vec<AuditEntry>,
    /// Next row id per table family.
    next_id: i64,
}

impl Tables {
    /// Assigns the next row id.
    fn assign_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Builds a typed row id from a freshly assigned raw value.
fn typed_id<I>(raw: i64, build: fn(i64) -> Option<I>) -> Result<I, StoreError> {
    build(raw).ok_or_else(|| StoreError::Invalid("row id counter produced zero".to_string()))
}

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory share store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryShareStore {
    /// Tables protected by a mutex.
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryShareStore {
    /// Creates a new in-memory share store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
        }
    }

    /// Returns every audit entry in insertion order (test helper).
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn audit_entries(&self) -> Result<Vec<AuditEntry>, StoreError> {
        let guard = self
            .tables
            .lock()
            .map_err(|_| StoreError::Store("share store mutex poisoned".to_string()))?;
        Ok(guard.audit.clone())
    }
}

impl ShareStore for InMemoryShareStore {
    fn with_txn<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTxn) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut guard = self
            .tables
            .lock()
            .map_err(|_| E::from(StoreError::Store("share store mutex poisoned".to_string())))?;
        // Snapshot-rollback: mutate a copy, swap it in only on success.
        let mut working = MemoryTxn {
            tables: guard.clone(),
        };
        let value = work(&mut working)?;
        *guard = working.tables;
        drop(guard);
        Ok(value)
    }
}

// ============================================================================
// SECTION: Transaction View
// ============================================================================

/// Unit-of-work view over a snapshot of the tables.
#[derive(Debug)]
struct MemoryTxn {
    /// Working copy of the tables.
    tables: Tables,
}

impl StoreTxn for MemoryTxn {
    fn file(&mut self, id: FileId) -> Result<Option<FileRecord>, StoreError> {
        Ok(self.tables.files.get(&id.get()).cloned())
    }

    fn insert_file(&mut self, file: &NewFileRecord) -> Result<FileId, StoreError> {
        let raw = self.tables.assign_id();
        let id = typed_id(raw, FileId::from_raw)?;
        self.tables.files.insert(raw, FileRecord {
            id,
            filename: file.filename.clone(),
            owner_user_id: file.owner_user_id,
            created_at: file.created_at,
            size: file.size,
            content_type: file.content_type.clone(),
            label: file.label,
            scan_summary: file.scan_summary.clone(),
            policy_decision: file.policy_decision,
            decision_reason: file.decision_reason.clone(),
            storage_path: file.storage_path.clone(),
            is_deleted: false,
        });
        Ok(id)
    }

    fn update_file_classification(
        &mut self,
        id: FileId,
        label: Label,
        decision: Decision,
        reason: &str,
    ) -> Result<(), StoreError> {
        let file = self
            .tables
            .files
            .get_mut(&id.get())
            .ok_or_else(|| StoreError::Invalid(format!("no file row: {id}")))?;
        file.label = label;
        file.policy_decision = decision;
        file.decision_reason = reason.to_string();
        Ok(())
    }

    fn files_owned_by(&mut self, user_id: UserId) -> Result<Vec<FileRecord>, StoreError> {
        Ok(newest_first(
            self.tables
                .files
                .values()
                .filter(|file| !file.is_deleted && file.owner_user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    fn files_shared_with(&mut self, user_id: UserId) -> Result<Vec<FileRecord>, StoreError> {
        let shared_file_ids: Vec<FileId> = self
            .tables
            .shares
            .values()
            .filter(|share| share.user_id == user_id)
            .map(|share| share.file_id)
            .collect();
        Ok(newest_first(
            self.tables
                .files
                .values()
                .filter(|file| !file.is_deleted && shared_file_ids.contains(&file.id))
                .cloned()
                .collect(),
        ))
    }

    fn all_files(&mut self) -> Result<Vec<FileRecord>, StoreError> {
        Ok(newest_first(
            self.tables.files.values().filter(|file| !file.is_deleted).cloned().collect(),
        ))
    }

    fn insert_user(
        &mut self,
        email: &str,
        role: Role,
        created_at: Timestamp,
    ) -> Result<UserId, StoreError> {
        if self.tables.users.values().any(|user| user.email == email) {
            return Err(StoreError::Constraint(format!("duplicate user email: {email}")));
        }
        let raw = self.tables.assign_id();
        let id = typed_id(raw, UserId::from_raw)?;
        self.tables.users.insert(raw, UserRecord {
            id,
            email: email.to_string(),
            role,
            created_at,
        });
        Ok(id)
    }

    fn user_by_email(&mut self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.tables.users.values().find(|user| user.email == email).cloned())
    }

    fn user(&mut self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.tables.users.get(&id.get()).cloned())
    }

    fn share_for(
        &mut self,
        file_id: FileId,
        user_id: UserId,
    ) -> Result<Option<InternalShare>, StoreError> {
        Ok(self
            .tables
            .shares
            .values()
            .find(|share| share.file_id == file_id && share.user_id == user_id)
            .cloned())
    }

    fn share(
        &mut self,
        file_id: FileId,
        share_id: ShareId,
    ) -> Result<Option<InternalShare>, StoreError> {
        Ok(self
            .tables
            .shares
            .get(&share_id.get())
            .filter(|share| share.file_id == file_id)
            .cloned())
    }

    fn insert_share(
        &mut self,
        file_id: FileId,
        user_id: UserId,
        permission: &str,
        created_at: Timestamp,
    ) -> Result<ShareId, StoreError> {
        if self
            .tables
            .shares
            .values()
            .any(|share| share.file_id == file_id && share.user_id == user_id)
        {
            return Err(StoreError::Constraint(format!(
                "duplicate share for file {file_id} and user {user_id}"
            )));
        }
        let raw = self.tables.assign_id();
        let id = typed_id(raw, ShareId::from_raw)?;
        self.tables.shares.insert(raw, InternalShare {
            id,
            file_id,
            user_id,
            permission: permission.to_string(),
            created_at,
        });
        Ok(id)
    }

    fn delete_share(&mut self, share_id: ShareId) -> Result<(), StoreError> {
        self.tables
            .shares
            .remove(&share_id.get())
            .map(|_| ())
            .ok_or_else(|| StoreError::Invalid(format!("no share row: {share_id}")))
    }

    fn link(
        &mut self,
        file_id: FileId,
        link_id: LinkId,
    ) -> Result<Option<ExternalLink>, StoreError> {
        Ok(self
            .tables
            .links
            .get(&link_id.get())
            .filter(|link| link.file_id == file_id)
            .cloned())
    }

    fn link_by_token(&mut self, token: &LinkToken) -> Result<Option<ExternalLink>, StoreError> {
        Ok(self.tables.links.values().find(|link| link.token == *token).cloned())
    }

    fn insert_link(&mut self, link: &NewExternalLink) -> Result<LinkId, StoreError> {
        if self.tables.links.values().any(|existing| existing.token == link.token) {
            return Err(StoreError::Constraint("duplicate link token".to_string()));
        }
        let raw = self.tables.assign_id();
        let id = typed_id(raw, LinkId::from_raw)?;
        self.tables.links.insert(raw, ExternalLink {
            id,
            file_id: link.file_id,
            token: link.token.clone(),
            expires_at: link.expires_at,
            created_by: link.created_by,
            status: LinkStatus::Active,
            justification: link.justification.clone(),
            created_at: link.created_at,
        });
        Ok(id)
    }

    fn mark_link_revoked(&mut self, link_id: LinkId) -> Result<(), StoreError> {
        let link = self
            .tables
            .links
            .get_mut(&link_id.get())
            .ok_or_else(|| StoreError::Invalid(format!("no link row: {link_id}")))?;
        link.status = LinkStatus::Revoked;
        Ok(())
    }

    fn append_audit(&mut self, entry: &NewAuditEntry) -> Result<AuditId, StoreError> {
        let raw = self.tables.assign_id();
        let id = typed_id(raw, AuditId::from_raw)?;
        self.tables.audit.push(AuditEntry {
            id,
            actor_user_id: entry.actor_user_id,
            action: entry.action.clone(),
            target_type: entry.target_type.clone(),
            target_id: entry.target_id.clone(),
            timestamp: entry.timestamp,
            metadata: entry.metadata.clone(),
        });
        Ok(id)
    }

    fn audit_for_target(
        &mut self,
        target_type: &str,
        target_id: &str,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        let mut entries: Vec<AuditEntry> = self
            .tables
            .audit
            .iter()
            .filter(|entry| entry.target_type == target_type && entry.target_id == target_id)
            .cloned()
            .collect();
        entries.reverse();
        Ok(entries)
    }

    fn recent_audit(
        &mut self,
        actor: Option<UserId>,
        limit: usize,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        Ok(self
            .tables
            .audit
            .iter()
            .rev()
            .filter(|entry| actor.is_none_or(|wanted| entry.actor_user_id == Some(wanted)))
            .take(limit)
            .cloned()
            .collect())
    }

    fn audit_between(
        &mut self,
        from: Timestamp,
        until: Timestamp,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        Ok(self
            .tables
            .audit
            .iter()
            .filter(|entry| entry.timestamp >= from && entry.timestamp < until)
            .cloned()
            .collect())
    }
}

/// Sorts files newest first, breaking creation-time ties by descending id.
fn newest_first(mut files: Vec<FileRecord>) -> Vec<FileRecord> {
    files.sort_by(|a, b| {
        b.created_at.cmp(&a.created_at).then_with(|| b.id.get().cmp(&a.id.get()))
    });
    files
}
