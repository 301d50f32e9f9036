// crates/shareguard-core/src/core/scanner.rs
// ============================================================================
// Module: ShareGuard Scanner
// Description: Orchestrates text extraction, pattern matching, and redaction.
// Purpose: Produce a ScanSummary for any byte content without ever failing.
// Dependencies: regex, crate::core::{patterns, redact, summary}
// ============================================================================

//! ## Overview
//! The scanner decides the extraction scope (full lenient decode vs a shallow
//! PDF preview), runs the four category matchers over the filename plus the
//! extracted text, and summarizes matches as counts and redacted examples.
//! Scanning is total: for any byte content the worst case is a summary with
//! all counts at zero.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use regex::Regex;

use crate::core::patterns::CATEGORY_CREDIT_CARDS;
use crate::core::patterns::CATEGORY_EMAILS;
use crate::core::patterns::CATEGORY_GENERIC_IDS;
use crate::core::patterns::CATEGORY_ORDER;
use crate::core::patterns::CATEGORY_PHONES;
use crate::core::patterns::PatternSet;
use crate::core::redact::redact;
use crate::core::summary::ScanScope;
use crate::core::summary::ScanSummary;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum raw bytes inspected for limited-scope (PDF) previews.
const DEFAULT_PDF_PREVIEW_BYTES: usize = 16_384;
/// Caveat attached to every limited-scope summary.
const PDF_SCOPE_NOTE: &str = "PDF scan is limited to filename and trivial text preview.";
/// Maximum distinct redacted examples reported per category.
const MAX_EXAMPLES_PER_CATEGORY: usize = 3;
/// Identifier-like runs kept from a PDF preview (>= 4 chars).
const IDENTIFIER_RUN_PATTERN: &str = r"[A-Za-z0-9@._:\-+]{4,}";

// ============================================================================
// SECTION: Scanner
// ============================================================================

/// Content scanner owning compiled patterns.
///
/// # Invariants
/// - Pure and stateless after construction; safe to share across threads.
/// - [`Scanner::scan`] never fails for any byte content.
#[derive(Debug, Clone)]
pub struct Scanner {
    /// Compiled category matchers.
    patterns: PatternSet,
    /// Matcher for identifier-like runs in PDF previews.
    identifier_runs: Regex,
    /// Maximum raw bytes inspected for limited-scope previews.
    preview_bytes: usize,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// Creates a scanner with the built-in category matchers and the default
    /// preview window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_preview_bytes(DEFAULT_PDF_PREVIEW_BYTES)
    }

    /// Creates a scanner whose limited-scope previews inspect at most
    /// `preview_bytes` raw bytes.
    #[must_use]
    pub fn with_preview_bytes(preview_bytes: usize) -> Self {
        #[allow(
            clippy::expect_used,
            reason = "Built-in patterns are constants whose validity is covered by unit tests."
        )]
        let identifier_runs =
            Regex::new(IDENTIFIER_RUN_PATTERN).expect("built-in pattern must compile");
        Self {
            patterns: PatternSet::new(),
            identifier_runs,
            preview_bytes,
        }
    }

    /// Scans file content and produces a [`ScanSummary`].
    ///
    /// The search text is the filename concatenated with a space and the
    /// extracted body text, so sensitive-looking filenames are detected even
    /// when the body yields nothing.
    #[must_use]
    pub fn scan(&self, filename: &str, content_type: &str, data: &[u8]) -> ScanSummary {
        let (text, scan_scope, notes) = self.extract_text(filename, content_type, data);
        let searchable = format!("{filename} {text}");

        let matches_by_category: [(&str, Vec<&str>); 4] = [
            (CATEGORY_EMAILS, self.patterns.emails(&searchable)),
            (CATEGORY_PHONES, self.patterns.phones(&searchable)),
            (CATEGORY_CREDIT_CARDS, self.patterns.credit_cards(&searchable)),
            (CATEGORY_GENERIC_IDS, self.patterns.generic_ids(&searchable)),
        ];

        let mut counts = BTreeMap::new();
        let mut examples = BTreeMap::new();
        for (category, matches) in &matches_by_category {
            counts.insert((*category).to_string(), u64::try_from(matches.len()).unwrap_or(u64::MAX));
            examples.insert((*category).to_string(), summarize_examples(matches));
        }
        let categories_detected: Vec<String> = CATEGORY_ORDER
            .iter()
            .filter(|category| counts.get(**category).is_some_and(|count| *count > 0))
            .map(|category| (*category).to_string())
            .collect();
        let total_matches = counts.values().sum();

        ScanSummary {
            scan_scope,
            counts,
            examples,
            categories_detected,
            total_matches,
            notes,
        }
    }

    /// Extracts searchable text and decides the scan scope.
    ///
    /// PDF content (by suffix or declared type) gets a shallow preview: at
    /// most the configured preview window decoded leniently, reduced to
    /// identifier-like runs of four or more characters. Everything else is
    /// decoded as UTF-8 in full with invalid sequences dropped.
    fn extract_text(
        &self,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> (String, ScanScope, Vec<String>) {
        let lowered = filename.to_lowercase();
        if lowered.ends_with(".pdf") || content_type == "application/pdf" {
            let preview_len = data.len().min(self.preview_bytes);
            // Latin-1 style decode: every byte maps to a scalar, nothing errors.
            let preview: String = data[..preview_len].iter().map(|&byte| byte as char).collect();
            let runs: Vec<&str> =
                self.identifier_runs.find_iter(&preview).map(|found| found.as_str()).collect();
            return (runs.join(" "), ScanScope::Limited, vec![PDF_SCOPE_NOTE.to_string()]);
        }
        (decode_ignoring_invalid(data), ScanScope::Full, Vec::new())
    }
}

/// Decodes bytes as UTF-8, dropping invalid sequences entirely.
///
/// Dropping (rather than substituting a replacement character) keeps digit
/// runs contiguous across a stray invalid byte, so a card number interrupted
/// mid-run is still reassembled and matched.
fn decode_ignoring_invalid(data: &[u8]) -> String {
    let mut text = String::with_capacity(data.len());
    for chunk in data.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// Reduces raw matches to at most three distinct redacted examples.
///
/// Deduplication keys on the redacted value: two different originals that
/// redact identically count as one example. Counts elsewhere in the summary
/// are unaffected.
fn summarize_examples(matches: &[&str]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut redacted = Vec::new();
    for matched in matches {
        let masked = redact(matched);
        if !seen.insert(masked.clone()) {
            continue;
        }
        redacted.push(masked);
        if redacted.len() >= MAX_EXAMPLES_PER_CATEGORY {
            break;
        }
    }
    redacted
}
