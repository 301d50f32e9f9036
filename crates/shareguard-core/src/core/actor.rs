// crates/shareguard-core/src/core/actor.rs
// ============================================================================
// Module: ShareGuard Acting Identity
// Description: Authenticated actor and role model supplied by the host.
// Purpose: Provide the identity inputs every lifecycle operation authorizes against.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! ShareGuard never verifies credentials. The host's identity provider hands
//! every lifecycle operation an already-authenticated [`Actor`]; this module
//! only models that input and the role checks the policy-gated operations
//! rely on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::UserId;

// ============================================================================
// SECTION: Roles
// ============================================================================

/// Role held by an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Ordinary user; may manage only files they own.
    User,
    /// Administrator; may manage any file and override labels.
    Admin,
}

impl Role {
    /// Returns the stable label for this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Admin => "Admin",
        }
    }

    /// Parses a role label (case-insensitive); unknown labels map to `User`.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        if input.trim().eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Actor
// ============================================================================

/// Authenticated identity performing a lifecycle operation.
///
/// # Invariants
/// - Produced by the host's identity provider; the core never verifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Identifier of the acting user.
    pub user_id: UserId,
    /// Role held by the acting user.
    pub role: Role,
}

impl Actor {
    /// Creates a new actor.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self {
            user_id,
            role,
        }
    }

    /// Returns `true` when the actor holds the administrator role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}
