// crates/shareguard-core/src/lib.rs
// ============================================================================
// Module: ShareGuard Core Library
// Description: Public API surface for the ShareGuard core.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! ShareGuard core provides deterministic content scanning, sensitivity
//! labeling, and policy-gated sharing for uploaded files. Every
//! state-changing operation records an audit trail in the same unit of work,
//! and storage integrates through explicit interfaces rather than a fixed
//! backend.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::Clock;
pub use interfaces::OsRngTokenSource;
pub use interfaces::ShareStore;
pub use interfaces::StoreError;
pub use interfaces::StoreTxn;
pub use interfaces::SystemClock;
pub use interfaces::TokenSource;
pub use runtime::ALLOWED_EXTENSIONS;
pub use runtime::ExternalLinkGrant;
pub use runtime::FileScope;
pub use runtime::InMemoryShareStore;
pub use runtime::InternalShareOutcome;
pub use runtime::LifecycleError;
pub use runtime::SharingLifecycle;
