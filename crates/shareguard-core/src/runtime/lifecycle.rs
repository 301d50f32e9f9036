// crates/shareguard-core/src/runtime/lifecycle.rs
// ============================================================================
// Module: ShareGuard Sharing Lifecycle
// Description: Policy-gated state transitions for files, shares, and links.
// Purpose: Orchestrate scanner, label derivation, and policy with the audit trail.
// Dependencies: serde_json, thiserror, crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The sharing lifecycle is the only stateful surface of ShareGuard. Each
//! operation executes as one atomic unit of work: precondition reads, the
//! state change, and every associated audit entry commit together or not at
//! all. Policy `block` is a normal business outcome and is still recorded in
//! the audit trail — the one case where a `policy_decision` entry is written
//! without its corresponding domain-event entry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::core::actor::Actor;
use crate::core::identifiers::FileId;
use crate::core::identifiers::LinkId;
use crate::core::identifiers::LinkToken;
use crate::core::identifiers::ShareId;
use crate::core::label::Label;
use crate::core::label::derive_label;
use crate::core::policy::ACTION_EXTERNAL_LINK;
use crate::core::policy::ACTION_INTERNAL_SHARE;
use crate::core::policy::Decision;
use crate::core::policy::FIELD_EXPIRES_AT;
use crate::core::policy::FIELD_JUSTIFICATION;
use crate::core::policy::FIELD_TARGET_USER_EMAIL;
use crate::core::policy::PolicyResult;
use crate::core::policy::evaluate;
use crate::core::records::AUDIT_DOWNLOAD;
use crate::core::records::AUDIT_EXTERNAL_LINK_CREATED;
use crate::core::records::AUDIT_EXTERNAL_LINK_REVOKED;
use crate::core::records::AUDIT_EXTERNAL_VIEW;
use crate::core::records::AUDIT_INTERNAL_SHARE_ADDED;
use crate::core::records::AUDIT_INTERNAL_SHARE_REMOVED;
use crate::core::records::AUDIT_LABEL_OVERRIDE;
use crate::core::records::AUDIT_POLICY_DECISION;
use crate::core::records::AUDIT_UPLOAD;
use crate::core::records::AuditEntry;
use crate::core::records::ExternalLink;
use crate::core::records::FileRecord;
use crate::core::records::LinkStatus;
use crate::core::records::NewAuditEntry;
use crate::core::records::NewExternalLink;
use crate::core::records::NewFileRecord;
use crate::core::records::SHARE_PERMISSION_READ;
use crate::core::records::TARGET_FILE;
use crate::core::scanner::Scanner;
use crate::core::time::Timestamp;
use crate::interfaces::Clock;
use crate::interfaces::ShareStore;
use crate::interfaces::StoreError;
use crate::interfaces::StoreTxn;
use crate::interfaces::TokenSource;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File extensions accepted at upload (lowercase, with dot).
pub const ALLOWED_EXTENSIONS: [&str; 3] = [".txt", ".csv", ".pdf"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Caller-visible lifecycle outcomes that refuse the requested action.
///
/// These are business-rule rejections surfaced with a reason, not system
/// failures; only [`LifecycleError::Store`] indicates an aborted unit of
/// work.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The underlying unit of work failed and was rolled back.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Acting identity may not perform this operation.
    #[error("only owner or admin can manage this action")]
    Unauthorized,
    /// File is missing or soft-deleted.
    #[error("file not found: {0}")]
    FileNotFound(FileId),
    /// Share target could not be resolved by email.
    #[error("target user not found")]
    TargetUserNotFound,
    /// Internal share is missing for the given file.
    #[error("share record not found")]
    ShareNotFound,
    /// External link is missing, revoked, or scoped to another file.
    #[error("external link not found")]
    LinkNotFound,
    /// External link has passed its expiry instant.
    #[error("external link expired")]
    LinkExpired,
    /// Policy blocked the action; the attempt was still audited.
    #[error("{reason}")]
    PolicyBlocked {
        /// Reason string from the policy decision.
        reason: String,
    },
    /// A field required by policy was not supplied.
    #[error("{0} is required by policy")]
    MissingRequiredField(String),
    /// Link expiry must lie strictly in the future.
    #[error("expires_at must be in the future")]
    ExpiryNotInFuture,
    /// Label override used a value outside the four canonical labels.
    #[error("invalid label: {0}")]
    InvalidLabel(String),
    /// Label override requires a non-empty justification.
    #[error("justification is required")]
    MissingJustification,
    /// Upload filename extension is not accepted.
    #[error("only TXT, CSV, and PDF files are allowed")]
    UnsupportedExtension,
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Scope selector for file listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileScope {
    /// Files owned by the acting user.
    Mine,
    /// Files shared with the acting user.
    SharedWithMe,
    /// All live files (admin only).
    All,
}

/// Result of an internal share request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalShareOutcome {
    /// Identity of the surviving share row.
    pub share_id: ShareId,
    /// `false` when an existing share was returned idempotently.
    pub created: bool,
    /// Policy decision evaluated for the request.
    pub decision: Decision,
    /// Reason string from the policy decision.
    pub reason: String,
}

/// Result of a successful external link creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLinkGrant {
    /// The created link, in `active` status.
    pub link: ExternalLink,
    /// Policy decision evaluated for the request (`allow` or `warn`).
    pub decision: Decision,
    /// Reason string from the policy decision.
    pub reason: String,
}

/// Internal outcome of the link-creation unit of work.
enum LinkAttempt {
    /// Policy blocked; the audit entry committed but no link exists.
    Blocked(String),
    /// Link created alongside its audit entries.
    Created(ExternalLinkGrant),
}

// ============================================================================
// SECTION: Lifecycle Engine
// ============================================================================

/// Policy-gated sharing lifecycle over a transactional store.
///
/// # Invariants
/// - Every mutating operation is a single atomic unit: state change and audit
///   entries commit together or not at all.
/// - Mutations require the file's owner or an administrator; reads
///   additionally admit holders of an internal share.
#[derive(Debug, Clone)]
pub struct SharingLifecycle<S, C, T> {
    /// Transactional persistence collaborator.
    store: S,
    /// Content scanner with compiled patterns.
    scanner: Scanner,
    /// Wall-clock collaborator.
    clock: C,
    /// Bearer-token source for external links.
    tokens: T,
    /// Link lifetime in minutes applied when callers omit `expires_at`.
    default_link_ttl_minutes: Option<u64>,
}

impl<S, C, T> SharingLifecycle<S, C, T>
where
    S: ShareStore,
    C: Clock,
    T: TokenSource,
{
    /// Creates a lifecycle engine over the given collaborators.
    #[must_use]
    pub fn new(store: S, clock: C, tokens: T) -> Self {
        Self {
            store,
            scanner: Scanner::new(),
            clock,
            tokens,
            default_link_ttl_minutes: None,
        }
    }

    /// Replaces the content scanner, typically with one built from a
    /// configured preview window.
    #[must_use]
    pub fn with_scanner(mut self, scanner: Scanner) -> Self {
        self.scanner = scanner;
        self
    }

    /// Sets a default link lifetime used when callers omit `expires_at`.
    ///
    /// Without a default, a missing expiry is rejected as a policy
    /// precondition failure.
    #[must_use]
    pub const fn with_default_link_ttl(mut self, minutes: u64) -> Self {
        self.default_link_ttl_minutes = Some(minutes);
        self
    }

    /// Returns a reference to the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Uploads file content: scan, derive label, evaluate the resting policy
    /// decision, persist the record, and audit.
    ///
    /// The resting decision is evaluated for `EXTERNAL_LINK` even though no
    /// link exists yet; it is the file's standing answer to "could this be
    /// linked externally right now".
    ///
    /// # Errors
    /// Returns [`LifecycleError::UnsupportedExtension`] for filenames outside
    /// the accepted set, or [`LifecycleError::Store`] when the unit of work
    /// fails.
    pub fn upload(
        &self,
        actor: &Actor,
        filename: &str,
        content_type: &str,
        data: &[u8],
        storage_path: &str,
    ) -> Result<FileRecord, LifecycleError> {
        if !has_allowed_extension(filename) {
            return Err(LifecycleError::UnsupportedExtension);
        }

        let scan_summary = self.scanner.scan(filename, content_type, data);
        let label = derive_label(&scan_summary);
        let policy = evaluate(label.as_str(), ACTION_EXTERNAL_LINK, None);
        let now = self.clock.now();

        let new_file = NewFileRecord {
            filename: filename.to_string(),
            owner_user_id: actor.user_id,
            created_at: now,
            size: u64::try_from(data.len()).unwrap_or(u64::MAX),
            content_type: content_type.to_string(),
            label,
            scan_summary,
            policy_decision: policy.decision,
            decision_reason: policy.reason.clone(),
            storage_path: storage_path.to_string(),
        };

        self.store.with_txn(|txn| {
            let file_id = txn.insert_file(&new_file)?;
            txn.append_audit(&audit(
                Some(actor),
                AUDIT_UPLOAD,
                file_id,
                now,
                json!({ "filename": new_file.filename, "label": label.as_str() }),
            ))?;
            txn.append_audit(&audit(
                Some(actor),
                AUDIT_POLICY_DECISION,
                file_id,
                now,
                json!({
                    "action": ACTION_EXTERNAL_LINK,
                    "decision": policy.decision.as_str(),
                    "reason": policy.reason,
                    "required_fields": policy.required_fields,
                }),
            ))?;
            txn.file(file_id)?.ok_or(LifecycleError::FileNotFound(file_id))
        })
    }

    /// Overrides a file's label (admin only) and re-evaluates the resting
    /// policy decision against the new label.
    ///
    /// # Errors
    /// Returns [`LifecycleError::Unauthorized`] for non-admin actors,
    /// [`LifecycleError::MissingJustification`] or
    /// [`LifecycleError::InvalidLabel`] for bad inputs, and
    /// [`LifecycleError::FileNotFound`] for missing or soft-deleted files.
    pub fn override_label(
        &self,
        actor: &Actor,
        file_id: FileId,
        new_label: &str,
        justification: &str,
    ) -> Result<FileRecord, LifecycleError> {
        if !actor.is_admin() {
            return Err(LifecycleError::Unauthorized);
        }
        if justification.trim().is_empty() {
            return Err(LifecycleError::MissingJustification);
        }
        let label = Label::parse(new_label)
            .ok_or_else(|| LifecycleError::InvalidLabel(new_label.trim().to_string()))?;
        let now = self.clock.now();

        self.store.with_txn(|txn| {
            let file = live_file(txn, file_id)?;
            let previous = file.label;
            let policy = evaluate(label.as_str(), ACTION_EXTERNAL_LINK, None);
            txn.update_file_classification(file_id, label, policy.decision, &policy.reason)?;
            txn.append_audit(&audit(
                Some(actor),
                AUDIT_LABEL_OVERRIDE,
                file_id,
                now,
                json!({
                    "from": previous.as_str(),
                    "to": label.as_str(),
                    "justification": justification,
                }),
            ))?;
            txn.append_audit(&audit(
                Some(actor),
                AUDIT_POLICY_DECISION,
                file_id,
                now,
                json!({
                    "action": ACTION_EXTERNAL_LINK,
                    "decision": policy.decision.as_str(),
                    "reason": policy.reason,
                    "updated_by": AUDIT_LABEL_OVERRIDE,
                }),
            ))?;
            txn.file(file_id)?.ok_or(LifecycleError::FileNotFound(file_id))
        })
    }

    /// Grants a user read access to a file (owner or admin only).
    ///
    /// Creation is idempotent on the `(file, user)` pair: an existing share
    /// is returned without new state and without a duplicate
    /// `internal_share_added` entry.
    ///
    /// # Errors
    /// Returns [`LifecycleError::TargetUserNotFound`] when the email resolves
    /// to no user, [`LifecycleError::MissingRequiredField`] when policy
    /// requires the email and it is blank, plus the usual authorization and
    /// not-found rejections.
    pub fn add_internal_share(
        &self,
        actor: &Actor,
        file_id: FileId,
        target_email: &str,
    ) -> Result<InternalShareOutcome, LifecycleError> {
        let now = self.clock.now();
        let normalized_email = target_email.trim().to_lowercase();

        self.store.with_txn(|txn| {
            let file = live_file(txn, file_id)?;
            ensure_owner_or_admin(&file, actor)?;

            let target = txn
                .user_by_email(&normalized_email)?
                .ok_or(LifecycleError::TargetUserNotFound)?;

            let policy = evaluate(file.label.as_str(), ACTION_INTERNAL_SHARE, None);
            if requires(&policy, FIELD_TARGET_USER_EMAIL) && target_email.trim().is_empty() {
                return Err(LifecycleError::MissingRequiredField(
                    FIELD_TARGET_USER_EMAIL.to_string(),
                ));
            }

            if let Some(existing) = txn.share_for(file_id, target.id)? {
                return Ok(InternalShareOutcome {
                    share_id: existing.id,
                    created: false,
                    decision: policy.decision,
                    reason: policy.reason,
                });
            }

            let share_id = txn.insert_share(file_id, target.id, SHARE_PERMISSION_READ, now)?;
            txn.append_audit(&audit(
                Some(actor),
                AUDIT_POLICY_DECISION,
                file_id,
                now,
                json!({
                    "action": ACTION_INTERNAL_SHARE,
                    "decision": policy.decision.as_str(),
                    "reason": policy.reason.clone(),
                }),
            ))?;
            txn.append_audit(&audit(
                Some(actor),
                AUDIT_INTERNAL_SHARE_ADDED,
                file_id,
                now,
                json!({
                    "shared_with_user_id": target.id,
                    "shared_with_email": target.email,
                }),
            ))?;
            Ok(InternalShareOutcome {
                share_id,
                created: true,
                decision: policy.decision,
                reason: policy.reason,
            })
        })
    }

    /// Removes an internal share (owner or admin only).
    ///
    /// # Errors
    /// Returns [`LifecycleError::ShareNotFound`] when no share with that id
    /// exists for the file, plus the usual authorization rejections.
    pub fn remove_internal_share(
        &self,
        actor: &Actor,
        file_id: FileId,
        share_id: ShareId,
    ) -> Result<(), LifecycleError> {
        let now = self.clock.now();
        self.store.with_txn(|txn| {
            let file = live_file(txn, file_id)?;
            ensure_owner_or_admin(&file, actor)?;
            let share = txn.share(file_id, share_id)?.ok_or(LifecycleError::ShareNotFound)?;
            txn.delete_share(share_id)?;
            txn.append_audit(&audit(
                Some(actor),
                AUDIT_INTERNAL_SHARE_REMOVED,
                file_id,
                now,
                json!({ "share_id": share_id, "removed_user_id": share.user_id }),
            ))?;
            Ok(())
        })
    }

    /// Creates an external link (owner or admin only).
    ///
    /// A `block` decision is recorded as a `policy_decision` audit entry and
    /// rejected; no link row and no `external_link_created` entry are
    /// written. For non-blocked decisions the table's required fields are
    /// enforced as preconditions before any write, and `expires_at` must lie
    /// strictly after the creation instant. When the engine carries a default
    /// link lifetime, an omitted `expires_at` falls back to the creation
    /// instant plus that lifetime instead of being rejected.
    ///
    /// # Errors
    /// Returns [`LifecycleError::PolicyBlocked`],
    /// [`LifecycleError::MissingRequiredField`], or
    /// [`LifecycleError::ExpiryNotInFuture`] per the rules above, plus the
    /// usual authorization and not-found rejections.
    pub fn create_external_link(
        &self,
        actor: &Actor,
        file_id: FileId,
        expires_at: Option<Timestamp>,
        justification: Option<&str>,
    ) -> Result<ExternalLinkGrant, LifecycleError> {
        let now = self.clock.now();
        let requested_expiry = expires_at
            .or_else(|| self.default_link_ttl_minutes.map(|minutes| now.plus_minutes(minutes)));
        let attempt = self.store.with_txn(|txn| -> Result<LinkAttempt, LifecycleError> {
            let file = live_file(txn, file_id)?;
            ensure_owner_or_admin(&file, actor)?;

            let policy = evaluate(file.label.as_str(), ACTION_EXTERNAL_LINK, None);
            if policy.decision == Decision::Block {
                txn.append_audit(&audit(
                    Some(actor),
                    AUDIT_POLICY_DECISION,
                    file_id,
                    now,
                    json!({
                        "action": ACTION_EXTERNAL_LINK,
                        "decision": policy.decision.as_str(),
                        "reason": policy.reason.clone(),
                    }),
                ))?;
                // Commits the blocked attempt's audit entry; no link is written.
                return Ok(LinkAttempt::Blocked(policy.reason));
            }

            let expiry = check_link_preconditions(&policy, requested_expiry, justification, now)?;
            let token = self.tokens.generate();
            let link_id = txn.insert_link(&NewExternalLink {
                file_id,
                token,
                expires_at: expiry,
                created_by: actor.user_id,
                justification: justification
                    .filter(|text| !text.trim().is_empty())
                    .map(str::to_string),
                created_at: now,
            })?;
            txn.append_audit(&audit(
                Some(actor),
                AUDIT_POLICY_DECISION,
                file_id,
                now,
                json!({
                    "action": ACTION_EXTERNAL_LINK,
                    "decision": policy.decision.as_str(),
                    "reason": policy.reason.clone(),
                    "required_fields": policy.required_fields,
                }),
            ))?;
            txn.append_audit(&audit(
                Some(actor),
                AUDIT_EXTERNAL_LINK_CREATED,
                file_id,
                now,
                json!({
                    "link_id": link_id,
                    "expires_at": expiry.to_rfc3339(),
                    "decision": policy.decision.as_str(),
                }),
            ))?;
            let link = txn.link(file_id, link_id)?.ok_or(LifecycleError::LinkNotFound)?;
            Ok(LinkAttempt::Created(ExternalLinkGrant {
                link,
                decision: policy.decision,
                reason: policy.reason,
            }))
        })?;

        match attempt {
            LinkAttempt::Blocked(reason) => Err(LifecycleError::PolicyBlocked {
                reason,
            }),
            LinkAttempt::Created(grant) => Ok(grant),
        }
    }

    /// Revokes an external link (owner or admin only). One-way: a link
    /// already revoked is reported as not found and never resurrected.
    ///
    /// # Errors
    /// Returns [`LifecycleError::LinkNotFound`] for missing or already
    /// revoked links, plus the usual authorization rejections.
    pub fn revoke_external_link(
        &self,
        actor: &Actor,
        file_id: FileId,
        link_id: LinkId,
    ) -> Result<(), LifecycleError> {
        let now = self.clock.now();
        self.store.with_txn(|txn| {
            let file = live_file(txn, file_id)?;
            ensure_owner_or_admin(&file, actor)?;
            let link = txn.link(file_id, link_id)?.ok_or(LifecycleError::LinkNotFound)?;
            if link.status != LinkStatus::Active {
                return Err(LifecycleError::LinkNotFound);
            }
            txn.mark_link_revoked(link_id)?;
            txn.append_audit(&audit(
                Some(actor),
                AUDIT_EXTERNAL_LINK_REVOKED,
                file_id,
                now,
                json!({ "link_id": link_id }),
            ))?;
            Ok(())
        })
    }

    /// Resolves an active, unexpired link token to its file.
    ///
    /// Expiry is evaluated lazily against the current instant; no state
    /// transition occurs when a link has lapsed. The anonymous view is
    /// audited with a null actor.
    ///
    /// # Errors
    /// Returns [`LifecycleError::LinkNotFound`] for unknown or revoked
    /// tokens and [`LifecycleError::LinkExpired`] for lapsed ones.
    pub fn access_by_token(&self, token: &LinkToken) -> Result<FileRecord, LifecycleError> {
        let now = self.clock.now();
        self.store.with_txn(|txn| {
            let link = txn.link_by_token(token)?.ok_or(LifecycleError::LinkNotFound)?;
            if link.status != LinkStatus::Active {
                return Err(LifecycleError::LinkNotFound);
            }
            if link.expires_at <= now {
                return Err(LifecycleError::LinkExpired);
            }
            let file = live_file(txn, link.file_id)?;
            txn.append_audit(&audit(
                None,
                AUDIT_EXTERNAL_VIEW,
                file.id,
                now,
                json!({ "link_id": link.id }),
            ))?;
            Ok(file)
        })
    }

    /// Records a download by an authenticated user with access to the file.
    ///
    /// # Errors
    /// Returns [`LifecycleError::Unauthorized`] when the actor is neither
    /// owner, admin, nor holder of an internal share.
    pub fn record_download(
        &self,
        actor: &Actor,
        file_id: FileId,
    ) -> Result<FileRecord, LifecycleError> {
        let now = self.clock.now();
        self.store.with_txn(|txn| {
            let file = live_file(txn, file_id)?;
            ensure_can_access(txn, &file, actor)?;
            txn.append_audit(&audit(
                Some(actor),
                AUDIT_DOWNLOAD,
                file_id,
                now,
                json!({ "filename": file.filename.clone() }),
            ))?;
            Ok(file)
        })
    }

    /// Loads a file for a reader with access (owner, admin, or share holder).
    ///
    /// # Errors
    /// Returns [`LifecycleError::FileNotFound`] or
    /// [`LifecycleError::Unauthorized`].
    pub fn file_details(
        &self,
        actor: &Actor,
        file_id: FileId,
    ) -> Result<FileRecord, LifecycleError> {
        self.store.with_txn(|txn| {
            let file = live_file(txn, file_id)?;
            ensure_can_access(txn, &file, actor)?;
            Ok(file)
        })
    }

    /// Lists live files visible to the actor under the given scope.
    ///
    /// # Errors
    /// Returns [`LifecycleError::Unauthorized`] when a non-admin requests
    /// [`FileScope::All`].
    pub fn list_files(
        &self,
        actor: &Actor,
        scope: FileScope,
    ) -> Result<Vec<FileRecord>, LifecycleError> {
        self.store.with_txn(|txn| match scope {
            FileScope::Mine => Ok(txn.files_owned_by(actor.user_id)?),
            FileScope::SharedWithMe => Ok(txn.files_shared_with(actor.user_id)?),
            FileScope::All => {
                if !actor.is_admin() {
                    return Err(LifecycleError::Unauthorized);
                }
                Ok(txn.all_files()?)
            }
        })
    }

    /// Lists the audit timeline for one file, newest first.
    ///
    /// # Errors
    /// Returns [`LifecycleError::FileNotFound`] or
    /// [`LifecycleError::Unauthorized`].
    pub fn file_audit_timeline(
        &self,
        actor: &Actor,
        file_id: FileId,
    ) -> Result<Vec<AuditEntry>, LifecycleError> {
        self.store.with_txn(|txn| {
            let file = live_file(txn, file_id)?;
            ensure_can_access(txn, &file, actor)?;
            Ok(txn.audit_for_target(TARGET_FILE, &file_id.to_string())?)
        })
    }

    /// Lists recent audit activity, newest first. Non-admin actors see only
    /// entries they produced.
    ///
    /// # Errors
    /// Returns [`LifecycleError::Store`] when the read fails.
    pub fn recent_activity(
        &self,
        actor: &Actor,
        limit: usize,
    ) -> Result<Vec<AuditEntry>, LifecycleError> {
        let filter = if actor.is_admin() { None } else { Some(actor.user_id) };
        self.store.with_txn(|txn| Ok(txn.recent_audit(filter, limit)?))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns `true` when the filename carries an accepted extension.
fn has_allowed_extension(filename: &str) -> bool {
    let lowered = filename.to_lowercase();
    ALLOWED_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext))
}

/// Loads a file and rejects missing or soft-deleted rows.
fn live_file(txn: &mut dyn StoreTxn, file_id: FileId) -> Result<FileRecord, LifecycleError> {
    let file = txn.file(file_id)?.ok_or(LifecycleError::FileNotFound(file_id))?;
    if file.is_deleted {
        return Err(LifecycleError::FileNotFound(file_id));
    }
    Ok(file)
}

/// Rejects actors that are neither the file's owner nor an administrator.
fn ensure_owner_or_admin(file: &FileRecord, actor: &Actor) -> Result<(), LifecycleError> {
    if actor.is_admin() || file.owner_user_id == actor.user_id {
        Ok(())
    } else {
        Err(LifecycleError::Unauthorized)
    }
}

/// Rejects actors without read access (owner, admin, or share holder).
fn ensure_can_access(
    txn: &mut dyn StoreTxn,
    file: &FileRecord,
    actor: &Actor,
) -> Result<(), LifecycleError> {
    if actor.is_admin() || file.owner_user_id == actor.user_id {
        return Ok(());
    }
    if txn.share_for(file.id, actor.user_id)?.is_some() {
        return Ok(());
    }
    Err(LifecycleError::Unauthorized)
}

/// Returns `true` when the policy result requires the named field.
fn requires(policy: &PolicyResult, field: &str) -> bool {
    policy.required_fields.iter().any(|required| required == field)
}

/// Enforces the link-creation preconditions and returns the expiry instant.
fn check_link_preconditions(
    policy: &PolicyResult,
    expires_at: Option<Timestamp>,
    justification: Option<&str>,
    now: Timestamp,
) -> Result<Timestamp, LifecycleError> {
    if requires(policy, FIELD_EXPIRES_AT) && expires_at.is_none() {
        return Err(LifecycleError::MissingRequiredField(FIELD_EXPIRES_AT.to_string()));
    }
    if requires(policy, FIELD_JUSTIFICATION)
        && justification.is_none_or(|text| text.trim().is_empty())
    {
        return Err(LifecycleError::MissingRequiredField(FIELD_JUSTIFICATION.to_string()));
    }
    let expiry = expires_at.ok_or_else(|| {
        LifecycleError::MissingRequiredField(FIELD_EXPIRES_AT.to_string())
    })?;
    if expiry <= now {
        return Err(LifecycleError::ExpiryNotInFuture);
    }
    Ok(expiry)
}

/// Builds an audit entry targeting one file.
fn audit(
    actor: Option<&Actor>,
    action: &str,
    file_id: FileId,
    timestamp: Timestamp,
    metadata: Value,
) -> NewAuditEntry {
    NewAuditEntry {
        actor_user_id: actor.map(|acting| acting.user_id),
        action: action.to_string(),
        target_type: TARGET_FILE.to_string(),
        target_id: file_id.to_string(),
        timestamp,
        metadata: into_object(metadata),
    }
}

/// Extracts the object map from a `json!` literal.
fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
