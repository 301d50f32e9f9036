// crates/shareguard-core/src/core/policy.rs
// ============================================================================
// Module: ShareGuard Policy Engine
// Description: Pure decision table for sharing actions against labels.
// Purpose: Map (label, action, context) to a decision, reason, and preconditions.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The policy engine is a pure, exhaustive decision table. Labels are
//! normalized (trim + case-fold) before matching; rules are evaluated in
//! order and the first match wins. Evaluation never fails: actions outside
//! the two known ones degrade to a fallback `warn` that signals manual
//! review.
//!
//! The fallback echoes the keys of the supplied context back as
//! `required_fields` — it reports fields the caller already provided rather
//! than fields still needed. That is a quirk of the table's contract,
//! preserved for compatibility; treat it as a manual-review signal, not a
//! precondition list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Contract Strings
// ============================================================================

/// Action name for granting a user read access inside the organization.
pub const ACTION_INTERNAL_SHARE: &str = "INTERNAL_SHARE";
/// Action name for creating a tokenized external link.
pub const ACTION_EXTERNAL_LINK: &str = "EXTERNAL_LINK";

/// Precondition field: target user email for an internal share.
pub const FIELD_TARGET_USER_EMAIL: &str = "target_user_email";
/// Precondition field: expiry instant for an external link.
pub const FIELD_EXPIRES_AT: &str = "expires_at";
/// Precondition field: business justification for a warned action.
pub const FIELD_JUSTIFICATION: &str = "justification";

// ============================================================================
// SECTION: Decision
// ============================================================================

/// Policy decision outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Action may proceed once required fields are supplied.
    Allow,
    /// Action may proceed with extra caution; preconditions still apply.
    Warn,
    /// Action is refused outright.
    Block,
}

impl Decision {
    /// Returns the stable wire label for this decision.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Warn => "warn",
            Self::Block => "block",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one policy evaluation.
///
/// # Invariants
/// - Pure function output: no identity, no persistence of its own.
/// - `required_fields` is advisory metadata; the engine performs no field
///   presence checks itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyResult {
    /// Decision outcome.
    pub decision: Decision,
    /// Human-readable reason for the decision.
    pub reason: String,
    /// Field names the caller must supply before the action may proceed.
    pub required_fields: Vec<String>,
}

impl PolicyResult {
    /// Builds a result from a decision, reason, and required field names.
    fn new(decision: Decision, reason: &str, required_fields: &[&str]) -> Self {
        Self {
            decision,
            reason: reason.to_string(),
            required_fields: required_fields.iter().map(|field| (*field).to_string()).collect(),
        }
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Evaluates the sharing policy for a label and requested action.
///
/// The label is normalized (trim + lowercase) before matching, so stored and
/// user-supplied spellings evaluate identically. Rules are ordered; the
/// first match wins. Unknown actions reach the fallback `warn` rule rather
/// than failing.
#[must_use]
pub fn evaluate(label: &str, action: &str, context: Option<&Map<String, Value>>) -> PolicyResult {
    let normalized = label.trim().to_lowercase();

    if action == ACTION_INTERNAL_SHARE {
        if normalized == "highly confidential" {
            return PolicyResult::new(
                Decision::Allow,
                "Highly Confidential files can only be shared to explicit allowlisted users.",
                &[FIELD_TARGET_USER_EMAIL],
            );
        }
        return PolicyResult::new(
            Decision::Allow,
            "Internal sharing is allowed for this classification.",
            &[],
        );
    }

    if action == ACTION_EXTERNAL_LINK {
        if normalized == "public" || normalized == "internal" {
            return PolicyResult::new(
                Decision::Allow,
                "External links allowed with an explicit expiry.",
                &[FIELD_EXPIRES_AT],
            );
        }
        if normalized == "confidential" {
            return PolicyResult::new(
                Decision::Warn,
                "Confidential data needs a business justification and expiry before external \
                 sharing.",
                &[FIELD_JUSTIFICATION, FIELD_EXPIRES_AT],
            );
        }
        if normalized == "highly confidential" {
            return PolicyResult::new(
                Decision::Block,
                "Highly Confidential data cannot be shared through external links.",
                &[],
            );
        }
    }

    // Fallback: echoes supplied context keys, see module docs.
    PolicyResult {
        decision: Decision::Warn,
        reason: "Policy fallback triggered. Manual review is recommended.".to_string(),
        required_fields: context
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default(),
    }
}
