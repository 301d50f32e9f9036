// crates/shareguard-core/src/runtime/mod.rs
// ============================================================================
// Module: ShareGuard Runtime
// Description: Sharing lifecycle orchestration and store implementations.
// Purpose: Drive uploads, shares, links, and audit through a share store.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The runtime layer turns the pure core modules into an operational system:
//! [`lifecycle`] owns every audited operation from upload to link access, and
//! [`store`] provides an in-memory [`crate::interfaces::ShareStore`] used by
//! tests and local demos.

/// Audited sharing lifecycle operations.
pub mod lifecycle;
/// In-memory share store.
pub mod store;

pub use lifecycle::ALLOWED_EXTENSIONS;
pub use lifecycle::ExternalLinkGrant;
pub use lifecycle::FileScope;
pub use lifecycle::InternalShareOutcome;
pub use lifecycle::LifecycleError;
pub use lifecycle::SharingLifecycle;
pub use store::InMemoryShareStore;
