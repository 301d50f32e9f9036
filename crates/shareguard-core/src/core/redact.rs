// crates/shareguard-core/src/core/redact.rs
// ============================================================================
// Module: ShareGuard Redactor
// Description: Irreversible partial masking of matched tokens for safe display.
// Purpose: Guarantee scan output never exposes a full matched value.
// Dependencies: (none)
// ============================================================================

//! ## Overview
//! Redaction masks a matched token so scan summaries can carry illustrative
//! examples without reproducing the sensitive value. Masking is total: any
//! string input yields a masked output, and the original can never be
//! reconstructed from it.

// ============================================================================
// SECTION: Redaction
// ============================================================================

/// Masks a matched token for safe display.
///
/// The input is trimmed first. Tokens containing `@` are masked as
/// `local@domain` where each side keeps only its first character followed by
/// `***`; everything after the domain's first character (including the
/// top-level suffix) is dropped. Other tokens of four characters or fewer
/// become all asterisks; longer tokens keep their first two and last two
/// characters around a run of asterisks.
///
/// Character positions are Unicode scalar values, not bytes.
#[must_use]
pub fn redact(token: &str) -> String {
    let value = token.trim();
    if let Some((local, domain)) = value.split_once('@') {
        let masked_local = mask_head(local);
        let masked_domain = mask_head(domain);
        return format!("{masked_local}@{masked_domain}");
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    let middle = "*".repeat(chars.len() - 4);
    format!("{head}{middle}{tail}")
}

/// Keeps the first character of `part` and appends `***`; empty input masks to `***`.
fn mask_head(part: &str) -> String {
    part.chars().next().map_or_else(|| "***".to_string(), |first| format!("{first}***"))
}
