// crates/shareguard-core/src/core/records.rs
// ============================================================================
// Module: ShareGuard Records
// Description: Persisted entities created and consumed by the sharing lifecycle.
// Purpose: Provide stable, serializable record types for files, shares, links, and audit.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! These types are the canonical persisted shapes. Insert shapes (`New*`)
//! carry everything except the store-assigned row id; the store returns the
//! id on insert. Audit entries are append-only facts and are never mutated
//! or deleted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::actor::Role;
use crate::core::identifiers::AuditId;
use crate::core::identifiers::FileId;
use crate::core::identifiers::LinkId;
use crate::core::identifiers::LinkToken;
use crate::core::identifiers::ShareId;
use crate::core::identifiers::UserId;
use crate::core::label::Label;
use crate::core::policy::Decision;
use crate::core::summary::ScanSummary;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Audit Action Tags
// ============================================================================

/// Audit action: file uploaded.
pub const AUDIT_UPLOAD: &str = "upload";
/// Audit action: policy evaluated for a file.
pub const AUDIT_POLICY_DECISION: &str = "policy_decision";
/// Audit action: label overridden by an administrator.
pub const AUDIT_LABEL_OVERRIDE: &str = "label_override";
/// Audit action: internal share granted.
pub const AUDIT_INTERNAL_SHARE_ADDED: &str = "internal_share_added";
/// Audit action: internal share removed.
pub const AUDIT_INTERNAL_SHARE_REMOVED: &str = "internal_share_removed";
/// Audit action: external link created.
pub const AUDIT_EXTERNAL_LINK_CREATED: &str = "external_link_created";
/// Audit action: external link revoked.
pub const AUDIT_EXTERNAL_LINK_REVOKED: &str = "external_link_revoked";
/// Audit action: file downloaded by an authenticated user.
pub const AUDIT_DOWNLOAD: &str = "download";
/// Audit action: file accessed anonymously through an external link.
pub const AUDIT_EXTERNAL_VIEW: &str = "external_view";

/// Audit target type for file records.
pub const TARGET_FILE: &str = "file";

// ============================================================================
// SECTION: Users
// ============================================================================

/// User known to the persistence store.
///
/// Identity verification happens in the host; this record only supplies the
/// email and role the lifecycle resolves against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Row identifier.
    pub id: UserId,
    /// Unique lowercase email address.
    pub email: String,
    /// Role held by the user.
    pub role: Role,
    /// Creation instant.
    pub created_at: Timestamp,
}

// ============================================================================
// SECTION: Files
// ============================================================================

/// Persisted file record with its classification and resting policy decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Row identifier.
    pub id: FileId,
    /// Original filename as uploaded.
    pub filename: String,
    /// Owner of the file.
    pub owner_user_id: UserId,
    /// Creation instant.
    pub created_at: Timestamp,
    /// Content size in bytes.
    pub size: u64,
    /// Declared content type.
    pub content_type: String,
    /// Current sensitivity label.
    pub label: Label,
    /// Scan summary captured at upload, persisted verbatim.
    pub scan_summary: ScanSummary,
    /// Resting policy decision (evaluated for external linking).
    pub policy_decision: Decision,
    /// Reason string for the resting decision.
    pub decision_reason: String,
    /// Path assigned by the blob store collaborator.
    pub storage_path: String,
    /// Soft-delete flag; deleted files are invisible to the lifecycle.
    pub is_deleted: bool,
}

/// Insert shape for a new file record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFileRecord {
    /// Original filename as uploaded.
    pub filename: String,
    /// Owner of the file.
    pub owner_user_id: UserId,
    /// Creation instant.
    pub created_at: Timestamp,
    /// Content size in bytes.
    pub size: u64,
    /// Declared content type.
    pub content_type: String,
    /// Sensitivity label derived at upload.
    pub label: Label,
    /// Scan summary captured at upload.
    pub scan_summary: ScanSummary,
    /// Resting policy decision.
    pub policy_decision: Decision,
    /// Reason string for the resting decision.
    pub decision_reason: String,
    /// Path assigned by the blob store collaborator.
    pub storage_path: String,
}

// ============================================================================
// SECTION: Internal Shares
// ============================================================================

/// Read permission granted to internal shares.
pub const SHARE_PERMISSION_READ: &str = "read";

/// Grant of read access to a specific user within the organization.
///
/// # Invariants
/// - At most one share per `(file, user)` pair; enforced as a hard store
///   constraint, not an application-level check.
/// - Never expires; removed only by explicit deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalShare {
    /// Row identifier.
    pub id: ShareId,
    /// File being shared.
    pub file_id: FileId,
    /// User receiving access.
    pub user_id: UserId,
    /// Granted permission (always `read`).
    pub permission: String,
    /// Creation instant.
    pub created_at: Timestamp,
}

// ============================================================================
// SECTION: External Links
// ============================================================================

/// Lifecycle state of an external link.
///
/// # Invariants
/// - `Active` -> `Revoked` is one-way; a revoked link is never resurrected.
/// - Expiry is a passive attribute checked at access time; elapsing time
///   triggers no state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    /// Link can be redeemed until it expires or is revoked.
    Active,
    /// Link has been revoked (terminal).
    Revoked,
}

impl LinkStatus {
    /// Returns the stable wire label for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
        }
    }
}

/// Time-bounded, revocable, tokenized access grant to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLink {
    /// Row identifier.
    pub id: LinkId,
    /// File the link grants access to.
    pub file_id: FileId,
    /// Unique bearer token.
    pub token: LinkToken,
    /// Expiry instant; strictly in the future at creation time.
    pub expires_at: Timestamp,
    /// User who created the link.
    pub created_by: UserId,
    /// Current lifecycle status.
    pub status: LinkStatus,
    /// Business justification, when policy warned.
    pub justification: Option<String>,
    /// Creation instant.
    pub created_at: Timestamp,
}

/// Insert shape for a new external link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExternalLink {
    /// File the link grants access to.
    pub file_id: FileId,
    /// Unique bearer token.
    pub token: LinkToken,
    /// Expiry instant.
    pub expires_at: Timestamp,
    /// User creating the link.
    pub created_by: UserId,
    /// Business justification, when policy warned.
    pub justification: Option<String>,
    /// Creation instant.
    pub created_at: Timestamp,
}

// ============================================================================
// SECTION: Audit Trail
// ============================================================================

/// Append-only audit fact.
///
/// # Invariants
/// - Never mutated or deleted.
/// - `actor_user_id` of `None` denotes a system- or anonymously-initiated
///   event (seeding, external link views).
/// - `timestamp` is assigned at creation and reflects insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Row identifier, assigned in insertion order.
    pub id: AuditId,
    /// Acting user, or `None` for system-initiated events.
    pub actor_user_id: Option<UserId>,
    /// Action tag (one of the `AUDIT_*` constants).
    pub action: String,
    /// Target entity type.
    pub target_type: String,
    /// Target entity identifier, stringified.
    pub target_id: String,
    /// Instant the entry was created.
    pub timestamp: Timestamp,
    /// Arbitrary structured metadata.
    pub metadata: Map<String, Value>,
}

/// Insert shape for a new audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAuditEntry {
    /// Acting user, or `None` for system-initiated events.
    pub actor_user_id: Option<UserId>,
    /// Action tag (one of the `AUDIT_*` constants).
    pub action: String,
    /// Target entity type.
    pub target_type: String,
    /// Target entity identifier, stringified.
    pub target_id: String,
    /// Instant the entry was created.
    pub timestamp: Timestamp,
    /// Arbitrary structured metadata.
    pub metadata: Map<String, Value>,
}
