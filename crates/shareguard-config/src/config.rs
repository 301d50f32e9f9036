// crates/shareguard-config/src/config.rs
// ============================================================================
// Module: ShareGuard Configuration
// Description: Configuration loading and validation for ShareGuard.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: shareguard-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown fields are rejected so typos surface at load rather than silently
//! enabling defaults. Missing or invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use shareguard_core::Scanner;
use shareguard_store_sqlite::SqliteStoreConfig;
use shareguard_store_sqlite::SqliteStoreMode;
use shareguard_store_sqlite::SqliteSyncMode;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "shareguard.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "SHAREGUARD_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default busy timeout for the `SQLite` store (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default external link lifetime in minutes.
const DEFAULT_LINK_TTL_MINUTES: u64 = 7 * 24 * 60;
/// Maximum allowed external link lifetime in minutes (one year).
const MAX_LINK_TTL_MINUTES: u64 = 366 * 24 * 60;
/// Default limited-scope preview size in bytes.
const DEFAULT_PREVIEW_BYTES: usize = 16_384;
/// Maximum allowed limited-scope preview size in bytes.
const MAX_PREVIEW_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// ShareGuard host configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShareGuardConfig {
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// External link configuration.
    #[serde(default)]
    pub links: LinksConfig,
    /// Content scanning configuration.
    #[serde(default)]
    pub scan: ScanConfig,
}

impl ShareGuardConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit path, the `SHAREGUARD_CONFIG` environment
    /// variable, then `shareguard.toml` in the working directory.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.storage.validate()?;
        self.links.validate()?;
        self.scan.validate()?;
        Ok(())
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the `SQLite` database file.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Directory holding uploaded file content.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Busy timeout for `SQLite` connections in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            upload_dir: default_upload_dir(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StorageConfig {
    /// Builds the `SQLite` store configuration from the storage section.
    #[must_use]
    pub fn sqlite_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.database_path.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
        }
    }

    /// Validates storage settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_field("storage.database_path", &self.database_path)?;
        validate_path_field("storage.upload_dir", &self.upload_dir)?;
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "storage.busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// External link configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinksConfig {
    /// Default link lifetime in minutes when callers supply no expiry.
    #[serde(default = "default_link_ttl_minutes")]
    pub default_ttl_minutes: u64,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            default_ttl_minutes: default_link_ttl_minutes(),
        }
    }
}

impl LinksConfig {
    /// Validates link settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_ttl_minutes == 0 {
            return Err(ConfigError::Invalid(
                "links.default_ttl_minutes must be greater than zero".to_string(),
            ));
        }
        if self.default_ttl_minutes > MAX_LINK_TTL_MINUTES {
            return Err(ConfigError::Invalid(
                "links.default_ttl_minutes exceeds the one-year limit".to_string(),
            ));
        }
        Ok(())
    }
}

/// Content scanning configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Maximum bytes inspected for limited-scope (PDF) previews.
    #[serde(default = "default_preview_bytes")]
    pub preview_bytes: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            preview_bytes: default_preview_bytes(),
        }
    }
}

impl ScanConfig {
    /// Builds a scanner honoring the configured preview window.
    #[must_use]
    pub fn scanner(&self) -> Scanner {
        Scanner::with_preview_bytes(self.preview_bytes)
    }

    /// Validates scan settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.preview_bytes == 0 {
            return Err(ConfigError::Invalid(
                "scan.preview_bytes must be greater than zero".to_string(),
            ));
        }
        if self.preview_bytes > MAX_PREVIEW_BYTES {
            return Err(ConfigError::Invalid("scan.preview_bytes exceeds limit".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Returns the default `SQLite` database path.
fn default_database_path() -> PathBuf {
    PathBuf::from("shareguard.db")
}

/// Returns the default upload directory.
fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default external link lifetime in minutes.
const fn default_link_ttl_minutes() -> u64 {
    DEFAULT_LINK_TTL_MINUTES
}

/// Returns the default limited-scope preview size in bytes.
const fn default_preview_bytes() -> usize {
    DEFAULT_PREVIEW_BYTES
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path field against length constraints.
fn validate_path_field(field: &str, value: &Path) -> Result<(), ConfigError> {
    let text = value.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in value.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}
