//! # Sync Error Types
//!
//! Error types for branch sync, stores and caches.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Input       │  │     Refresh             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Validation     │  │  DatabaseError          │ │
//! │  │  InvalidUrl     │  │                 │  │  StoreFailed            │ │
//! │  │  ConfigLoad/Save│  │                 │  │  CacheFailed            │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Refresh errors never escape a branch switch: the orchestrator turns   │
//! │  them into SyncReport.errors entries.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use lats_core::ValidationError;
use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering config, store and cache failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid vendor URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Input Errors
    // =========================================================================
    /// Rejected input (e.g. empty branch id).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Refresh Errors
    // =========================================================================
    /// Repository call failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A store could not reload its data.
    #[error("Store '{store}' failed: {message}")]
    StoreFailed { store: String, message: String },

    /// A cache could not be cleared or filled.
    #[error("Cache '{cache}' failed: {message}")]
    CacheFailed { cache: String, message: String },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Creates a StoreFailed error.
    pub fn store(store: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::StoreFailed {
            store: store.into(),
            message: message.into(),
        }
    }

    /// Creates a CacheFailed error.
    pub fn cache(cache: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::CacheFailed {
            cache: cache.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::InvalidUrl(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<lats_db::DbError> for SyncError {
    fn from(err: lats_db::DbError) -> Self {
        SyncError::DatabaseError(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}
