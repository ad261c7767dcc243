//! # Validation Module
//!
//! Input checks that run before any I/O.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web UI                                                       │
//! │  └── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Service layer (Rust)                                         │
//! │  └── THIS MODULE: branch ids, phone numbers                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Vendor API / database constraints                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lats_core::validation::{normalize_phone, validate_branch_id};
//!
//! assert_eq!(validate_branch_id(" branch-001 ").unwrap(), "branch-001");
//! assert_eq!(normalize_phone("+255 712-345-678").unwrap(), "255712345678");
//! ```

use crate::error::ValidationError;
use crate::TEST_PHONE_PREFIX;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Shortest accepted phone number (digits only).
const MIN_PHONE_DIGITS: usize = 9;

/// Longest accepted phone number (E.164 limit).
const MAX_PHONE_DIGITS: usize = 15;

/// Validates a branch identifier and returns it trimmed.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most 64 characters (after trimming)
pub fn validate_branch_id(branch_id: &str) -> ValidationResult<&str> {
    let branch_id = branch_id.trim();

    if branch_id.is_empty() {
        return Err(ValidationError::Required {
            field: "branch_id".to_string(),
        });
    }

    if branch_id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "branch_id".to_string(),
            max: 64,
        });
    }

    Ok(branch_id)
}

/// Normalises a phone number to international digits only.
///
/// Strips a leading `+`, spaces, dashes, dots and parentheses. The result
/// is what vendor APIs expect (`255712345678`, no plus sign).
///
/// ## Example
/// ```rust
/// use lats_core::validation::normalize_phone;
///
/// assert_eq!(normalize_phone("(255) 712.345.678").unwrap(), "255712345678");
/// assert!(normalize_phone("call me").is_err());
/// ```
pub fn normalize_phone(phone: &str) -> ValidationResult<String> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    let digits: String = trimmed
        .trim_start_matches('+')
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(ValidationError::OutOfRange {
            field: "phone".to_string(),
            min: MIN_PHONE_DIGITS as i64,
            max: MAX_PHONE_DIGITS as i64,
        });
    }

    Ok(digits)
}

/// Returns true for numbers reserved for gateway testing.
///
/// Expects an already normalised number.
pub fn is_test_phone(normalized: &str) -> bool {
    normalized.starts_with(TEST_PHONE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_branch_id() {
        assert!(validate_branch_id("main").is_ok());
        assert!(validate_branch_id("").is_err());
        assert!(validate_branch_id("   ").is_err());
        assert!(validate_branch_id(&"b".repeat(65)).is_err());
        assert_eq!(validate_branch_id("  dar \t").unwrap(), "dar");
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+255712345678").unwrap(), "255712345678");
        assert_eq!(normalize_phone(" 255 712 345 678 ").unwrap(), "255712345678");
        assert!(matches!(
            normalize_phone(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            normalize_phone("2557abc45678"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            normalize_phone("12345"),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_is_test_phone() {
        assert!(is_test_phone("255700000000"));
        assert!(is_test_phone("255700123456"));
        assert!(!is_test_phone("255712345678"));
    }
}
