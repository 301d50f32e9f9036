// crates/shareguard-core/src/core/patterns.rs
// ============================================================================
// Module: ShareGuard Pattern Extractor
// Description: Category matchers for sensitive-looking tokens in text.
// Purpose: Find email, phone, card-number, and generic-id matches independently.
// Dependencies: regex
// ============================================================================

//! ## Overview
//! Four independent category matchers run over one search text. Matching is
//! per-category: the same substring may satisfy more than one category, and
//! an empty match set is a normal outcome. Card-number candidates must
//! additionally pass a Luhn checksum; failures are discarded entirely rather
//! than flagged. The category names are a stable wire contract consumed by
//! downstream systems.

// ============================================================================
// SECTION: Imports
// ============================================================================

use regex::Regex;
use regex::RegexBuilder;

// ============================================================================
// SECTION: Categories
// ============================================================================

/// Stable category name for email matches.
pub const CATEGORY_EMAILS: &str = "emails";
/// Stable category name for phone-number matches.
pub const CATEGORY_PHONES: &str = "phones";
/// Stable category name for Luhn-valid card-number matches.
pub const CATEGORY_CREDIT_CARDS: &str = "credit_cards";
/// Stable category name for SSN-shaped and `ID`-prefixed matches.
pub const CATEGORY_GENERIC_IDS: &str = "generic_ids";

/// All category names in canonical reporting order.
pub const CATEGORY_ORDER: [&str; 4] =
    [CATEGORY_EMAILS, CATEGORY_PHONES, CATEGORY_CREDIT_CARDS, CATEGORY_GENERIC_IDS];

/// Email pattern: standard `local@domain.tld` shape.
const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";
/// Phone pattern: North-American 10-digit shapes with optional country code.
const PHONE_PATTERN: &str = r"\b(?:\+?\d{1,2}[\s.-]?)?(?:\(?\d{3}\)?[\s.-]?)\d{3}[\s.-]?\d{4}\b";
/// Card pattern: 13-19 digit runs with optional separators (Luhn-filtered afterwards).
const CARD_PATTERN: &str = r"\b(?:\d[ -]*?){13,19}\b";
/// Generic id pattern: SSN shape or `ID`-prefixed alphanumeric token.
const GENERIC_ID_PATTERN: &str = r"\b(?:\d{3}-\d{2}-\d{4}|ID[:\s-]?[A-Za-z0-9]{6,14})\b";

// ============================================================================
// SECTION: Pattern Set
// ============================================================================

/// Compiled category matchers applied to one search text.
///
/// # Invariants
/// - Patterns are built-in and compile at construction; construction never fails.
/// - Matchers are independent; no matcher raises on malformed input.
#[derive(Debug, Clone)]
pub struct PatternSet {
    /// Email matcher.
    email: Regex,
    /// Phone-number matcher.
    phone: Regex,
    /// Card-number candidate matcher (pre-Luhn).
    card: Regex,
    /// Generic-id matcher (case-insensitive).
    generic_id: Regex,
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternSet {
    /// Compiles the built-in category matchers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            email: compile(EMAIL_PATTERN, false),
            phone: compile(PHONE_PATTERN, false),
            card: compile(CARD_PATTERN, false),
            generic_id: compile(GENERIC_ID_PATTERN, true),
        }
    }

    /// Returns all email matches in `text`, in order of appearance.
    #[must_use]
    pub fn emails<'t>(&self, text: &'t str) -> Vec<&'t str> {
        capture(&self.email, text)
    }

    /// Returns all phone-number matches in `text`, in order of appearance.
    #[must_use]
    pub fn phones<'t>(&self, text: &'t str) -> Vec<&'t str> {
        capture(&self.phone, text)
    }

    /// Returns all Luhn-valid card-number matches in `text`, in order of appearance.
    ///
    /// Candidates failing the Luhn checksum are discarded entirely.
    #[must_use]
    pub fn credit_cards<'t>(&self, text: &'t str) -> Vec<&'t str> {
        capture(&self.card, text).into_iter().filter(|candidate| luhn_valid(candidate)).collect()
    }

    /// Returns all generic-id matches in `text`, in order of appearance.
    #[must_use]
    pub fn generic_ids<'t>(&self, text: &'t str) -> Vec<&'t str> {
        capture(&self.generic_id, text)
    }
}

/// Collects full-match slices for every non-overlapping match.
fn capture<'t>(pattern: &Regex, text: &'t str) -> Vec<&'t str> {
    pattern.find_iter(text).map(|found| found.as_str()).collect()
}

/// Compiles a built-in pattern.
fn compile(pattern: &str, case_insensitive: bool) -> Regex {
    #[allow(
        clippy::expect_used,
        reason = "Built-in patterns are constants whose validity is covered by unit tests."
    )]
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .expect("built-in pattern must compile")
}

// ============================================================================
// SECTION: Luhn Checksum
// ============================================================================

/// Validates a card-number candidate against the Luhn checksum.
///
/// Non-digit characters are ignored. Sequences with fewer than 13 or more
/// than 19 digits are rejected outright. Starting from the rightmost digit,
/// every second digit is doubled (subtracting 9 when the doubled value
/// exceeds 9); the candidate is valid iff the digit sum is divisible by 10.
#[must_use]
pub fn luhn_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|ch| ch.to_digit(10)).collect();
    if digits.len() < 13 || digits.len() > 19 {
        return false;
    }
    let parity = digits.len() % 2;
    let checksum: u32 = digits
        .iter()
        .enumerate()
        .map(|(index, &digit)| {
            if index % 2 == parity {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();
    checksum % 10 == 0
}
