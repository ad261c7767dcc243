//! # Error Types
//!
//! Domain-specific error types for lats-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lats-core errors (this file)                                          │
//! │  ├── CoreError          - General domain errors                        │
//! │  └── ValidationError    - Input validation failures                    │
//! │                                                                         │
//! │  lats-db            └── DbError           - Database failures          │
//! │  lats-sync          └── SyncError         - Sync/cache failures        │
//! │  lats-integrations  └── IntegrationError  - Vendor API failures        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SyncError → SyncReport.errors     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Name does not match any sync step.
    #[error("Unknown sync domain: {0}")]
    UnknownSyncDomain(String),

    /// Name does not match any supported integration.
    #[error("Unknown integration: {0}")]
    UnknownIntegration(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any I/O happens so that bad input never reaches the
/// database or a vendor API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value or length is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g. phone number with letters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "branch_id".to_string(),
        };
        assert_eq!(err.to_string(), "branch_id is required");

        let err = ValidationError::OutOfRange {
            field: "phone".to_string(),
            min: 9,
            max: 15,
        };
        assert_eq!(err.to_string(), "phone must be between 9 and 15");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "phone".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: phone is required");
    }
}
