// crates/shareguard-config/src/lib.rs
// ============================================================================
// Module: ShareGuard Config Library
// Description: Configuration loading and validation for ShareGuard.
// Purpose: Expose the canonical config model with fail-closed parsing.
// Dependencies: crate::config
// ============================================================================

//! ## Overview
//! Process configuration for ShareGuard hosts, loaded from a TOML file with
//! strict size and path limits. Missing or invalid configuration fails
//! closed rather than falling back to permissive defaults.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::LinksConfig;
pub use config::ScanConfig;
pub use config::ShareGuardConfig;
pub use config::StorageConfig;
