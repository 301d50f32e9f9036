// crates/shareguard-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Share Store
// Description: Durable ShareStore backend using SQLite WAL.
// Purpose: Provide production-grade persistence for ShareGuard state.
// Dependencies: shareguard-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`shareguard_core::ShareStore`]
//! implementation. Every lifecycle operation maps to one SQLite transaction,
//! so state changes and their audit entries commit together or not at all.
//! Database contents are treated as untrusted on read: rows that fail to
//! decode report corruption rather than defaults.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteShareStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
