// crates/shareguard-core/src/core/mod.rs
// ============================================================================
// Module: ShareGuard Core Types
// Description: Canonical ShareGuard classification and record structures.
// Purpose: Provide stable, serializable types plus the pure decision logic.
// Dependencies: regex, serde, serde_json, time
// ============================================================================

//! ## Overview
//! ShareGuard core types define the scan summary, sensitivity labels, policy
//! decisions, and persisted record shapes. These types are the canonical
//! source of truth for any derived API surfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod actor;
pub mod identifiers;
pub mod label;
pub mod patterns;
pub mod policy;
pub mod records;
pub mod redact;
pub mod scanner;
pub mod summary;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use actor::Actor;
pub use actor::Role;
pub use identifiers::AuditId;
pub use identifiers::FileId;
pub use identifiers::LinkId;
pub use identifiers::LinkToken;
pub use identifiers::ShareId;
pub use identifiers::UserId;
pub use label::HIGH_VOLUME_THRESHOLD;
pub use label::Label;
pub use label::derive_label;
pub use patterns::CATEGORY_CREDIT_CARDS;
pub use patterns::CATEGORY_EMAILS;
pub use patterns::CATEGORY_GENERIC_IDS;
pub use patterns::CATEGORY_ORDER;
pub use patterns::CATEGORY_PHONES;
pub use patterns::PatternSet;
pub use patterns::luhn_valid;
pub use policy::ACTION_EXTERNAL_LINK;
pub use policy::ACTION_INTERNAL_SHARE;
pub use policy::Decision;
pub use policy::FIELD_EXPIRES_AT;
pub use policy::FIELD_JUSTIFICATION;
pub use policy::FIELD_TARGET_USER_EMAIL;
pub use policy::PolicyResult;
pub use policy::evaluate;
pub use records::AUDIT_DOWNLOAD;
pub use records::AUDIT_EXTERNAL_LINK_CREATED;
pub use records::AUDIT_EXTERNAL_LINK_REVOKED;
pub use records::AUDIT_EXTERNAL_VIEW;
pub use records::AUDIT_INTERNAL_SHARE_ADDED;
pub use records::AUDIT_INTERNAL_SHARE_REMOVED;
pub use records::AUDIT_LABEL_OVERRIDE;
pub use records::AUDIT_POLICY_DECISION;
pub use records::AUDIT_UPLOAD;
pub use records::AuditEntry;
pub use records::ExternalLink;
pub use records::FileRecord;
pub use records::InternalShare;
pub use records::LinkStatus;
pub use records::NewAuditEntry;
pub use records::NewExternalLink;
pub use records::NewFileRecord;
pub use records::SHARE_PERMISSION_READ;
pub use records::TARGET_FILE;
pub use records::UserRecord;
pub use redact::redact;
pub use scanner::Scanner;
pub use summary::ScanScope;
pub use summary::ScanSummary;
pub use time::Timestamp;
pub use time::TimestampParseError;
