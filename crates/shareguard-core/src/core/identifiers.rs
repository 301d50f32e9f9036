// crates/shareguard-core/src/core/identifiers.rs
// ============================================================================
// Module: ShareGuard Identifiers
// Description: Canonical opaque identifiers for ShareGuard records.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical identifiers used throughout ShareGuard.
//! Numeric identifiers are persistence row ids and enforce a positive,
//! 1-based invariant at construction boundaries. The link token is an opaque
//! string whose entropy guarantees live with the token source, not here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// File record identifier.
///
/// # Invariants
/// - Always >= 1 (positive, 1-based row id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(i64);

impl FileId {
    /// Creates a file identifier from a raw value (returns `None` if not positive).
    #[must_use]
    pub const fn from_raw(raw: i64) -> Option<Self> {
        if raw >= 1 { Some(Self(raw)) } else { None }
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// User record identifier.
///
/// # Invariants
/// - Always >= 1 (positive, 1-based row id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Creates a user identifier from a raw value (returns `None` if not positive).
    #[must_use]
    pub const fn from_raw(raw: i64) -> Option<Self> {
        if raw >= 1 { Some(Self(raw)) } else { None }
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Internal share record identifier.
///
/// # Invariants
/// - Always >= 1 (positive, 1-based row id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareId(i64);

impl ShareId {
    /// Creates a share identifier from a raw value (returns `None` if not positive).
    #[must_use]
    pub const fn from_raw(raw: i64) -> Option<Self> {
        if raw >= 1 { Some(Self(raw)) } else { None }
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ShareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// External link record identifier.
///
/// # Invariants
/// - Always >= 1 (positive, 1-based row id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(i64);

impl LinkId {
    /// Creates a link identifier from a raw value (returns `None` if not positive).
    #[must_use]
    pub const fn from_raw(raw: i64) -> Option<Self> {
        if raw >= 1 { Some(Self(raw)) } else { None }
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Audit trail entry identifier.
///
/// # Invariants
/// - Always >= 1 (positive, 1-based row id).
/// - Assigned by the store in insertion order; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditId(i64);

impl AuditId {
    /// Creates an audit identifier from a raw value (returns `None` if not positive).
    #[must_use]
    pub const fn from_raw(raw: i64) -> Option<Self> {
        if raw >= 1 { Some(Self(raw)) } else { None }
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for AuditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Link Token
// ============================================================================

/// Opaque bearer token granting anonymous access to one file.
///
/// # Invariants
/// - Opaque UTF-8 string; uniqueness is enforced by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkToken(String);

impl LinkToken {
    /// Creates a new link token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for LinkToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LinkToken {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
