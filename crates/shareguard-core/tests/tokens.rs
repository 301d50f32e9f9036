// crates/shareguard-core/tests/tokens.rs
// ============================================================================
// Module: Link Token Tests
// Description: Tests for the CSPRNG-backed link token source.
// Purpose: Validate token shape, alphabet, and uniqueness.
// Dependencies: shareguard-core
// ============================================================================
//! ## Overview
//! External link tokens travel in URLs, so they must stay within the
//! URL-safe base64 alphabet and carry enough entropy that collisions are
//! negligible before the store's uniqueness constraint ever fires.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::HashSet;

use shareguard_core::OsRngTokenSource;
use shareguard_core::TokenSource;

// 24 random bytes encode to 32 base64 characters without padding.
const EXPECTED_TOKEN_LENGTH: usize = 32;

#[test]
fn tokens_have_a_stable_length() {
    let source = OsRngTokenSource;
    for _ in 0..16 {
        assert_eq!(source.generate().as_str().len(), EXPECTED_TOKEN_LENGTH);
    }
}

#[test]
fn tokens_use_only_the_url_safe_alphabet() {
    let source = OsRngTokenSource;
    for _ in 0..16 {
        let token = source.generate();
        assert!(
            token
                .as_str()
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'),
            "token {token:?} left the url-safe alphabet"
        );
    }
}

#[test]
fn tokens_do_not_repeat_across_many_draws() {
    let source = OsRngTokenSource;
    let mut seen = HashSet::new();
    for _ in 0..1_000 {
        assert!(seen.insert(source.generate().as_str().to_string()));
    }
}
