// crates/shareguard-core/src/core/summary.rs
// ============================================================================
// Module: ShareGuard Scan Summary
// Description: Structured result of scanning file content for sensitive tokens.
// Purpose: Provide a stable, serializable scan summary attached to file records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`ScanSummary`] is immutable once produced and is persisted verbatim as
//! structured data on the file record. Counts are raw match counts including
//! duplicates; examples carry at most three distinct redacted strings per
//! category in first-seen order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Scan Scope
// ============================================================================

/// Extraction scope applied while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanScope {
    /// Full lenient text decode of the content.
    Full,
    /// Shallow best-effort preview only (binary formats such as PDF).
    Limited,
}

impl ScanScope {
    /// Returns the stable wire label for this scope.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Limited => "limited",
        }
    }
}

// ============================================================================
// SECTION: Scan Summary
// ============================================================================

/// Structured result of scanning one file's content.
///
/// # Invariants
/// - Immutable once produced.
/// - `counts` holds raw match counts including duplicates.
/// - `examples` values hold at most three distinct redacted strings each, in
///   first-seen order. Deduplication keys on the redacted value, so distinct
///   originals that redact identically collapse into one example; `counts`
///   remain accurate regardless.
/// - `categories_detected` lists categories with a raw count above zero, in
///   canonical category order.
/// - `total_matches` equals the sum of all counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Extraction scope applied to the content.
    pub scan_scope: ScanScope,
    /// Raw match count per category.
    pub counts: BTreeMap<String, u64>,
    /// Up to three distinct redacted examples per category.
    pub examples: BTreeMap<String, Vec<String>>,
    /// Categories whose raw count is above zero.
    pub categories_detected: Vec<String>,
    /// Sum of raw counts across categories.
    pub total_matches: u64,
    /// Free-text caveats about scan fidelity.
    pub notes: Vec<String>,
}
