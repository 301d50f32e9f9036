// crates/shareguard-core/src/core/label.rs
// ============================================================================
// Module: ShareGuard Sensitivity Labels
// Description: Sensitivity classification and the label-derivation rule.
// Purpose: Map scan summaries to labels with stable canonical wire forms.
// Dependencies: serde, crate::core::summary
// ============================================================================

//! ## Overview
//! A label classifies one file's sensitivity. Labels are derived
//! automatically from a scan summary or set manually through an
//! administrative override. `Public` is never produced automatically; it is
//! reachable only through an override.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::summary::ScanSummary;

// ============================================================================
// SECTION: Label
// ============================================================================

/// Total-match threshold above which content is Highly Confidential.
pub const HIGH_VOLUME_THRESHOLD: u64 = 5;

/// Sensitivity classification attached to a file.
///
/// # Invariants
/// - Canonical display forms are stable wire values; parsing is
///   case-insensitive and trims surrounding whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    /// Safe for public disclosure.
    Public,
    /// Default for content with no detected matches.
    Internal,
    /// Content with detected sensitive tokens.
    Confidential,
    /// Content with multiple categories or high match volume.
    #[serde(rename = "Highly Confidential")]
    HighlyConfidential,
}

impl Label {
    /// Returns the canonical stored form of this label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Internal => "Internal",
            Self::Confidential => "Confidential",
            Self::HighlyConfidential => "Highly Confidential",
        }
    }

    /// Parses a label from its canonical form, case-insensitively.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "public" => Some(Self::Public),
            "internal" => Some(Self::Internal),
            "confidential" => Some(Self::Confidential),
            "highly confidential" => Some(Self::HighlyConfidential),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Label Derivation
// ============================================================================

/// Derives a sensitivity label from a scan summary.
///
/// Pure function of `total_matches` and `categories_detected`: zero matches
/// yield `Internal`; two or more detected categories, or a total at or above
/// [`HIGH_VOLUME_THRESHOLD`], yield `Highly Confidential`; anything else is
/// `Confidential`. `Public` is never derived.
#[must_use]
pub fn derive_label(summary: &ScanSummary) -> Label {
    if summary.total_matches == 0 {
        return Label::Internal;
    }
    if summary.categories_detected.len() >= 2 || summary.total_matches >= HIGH_VOLUME_THRESHOLD {
        return Label::HighlyConfidential;
    }
    Label::Confidential
}
