//! # Error Types
//!
//! Domain-specific error types for mandi-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mandi-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule outcomes (rate not found)        │
//! │  └── ValidationError  - Caller-side input guards                       │
//! │                                                                         │
//! │  mandi-session errors (separate crate)                                 │
//! │  └── SessionError     - Config, backend and provider failures          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SessionError → UI                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The permission engine has no error type at all: malformed or missing
//! permission data resolves to "no permission".

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// No tax rate row matches the category, neither for the exact region
    /// nor for the wildcard region.
    ///
    /// ## Caller Options
    /// ```text
    /// resolve_rate(category 7, "TN")
    ///      │
    ///      ▼
    /// TaxRateNotFound { category_id: 7, region_code: "TN" }
    ///      │
    ///      ├──► skip the line
    ///      ├──► apply a default percentage
    ///      └──► show "tax rate missing" in the UI
    /// ```
    #[error("No tax rate for category {category_id} in region {region_code}")]
    TaxRateNotFound { category_id: i64, region_code: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Returned by the opt-in guards in [`crate::validation`]; the calculators
/// never raise them on their own.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., non-alphanumeric region code, NaN price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::TaxRateNotFound {
            category_id: 7,
            region_code: "TN".to_string(),
        };
        assert_eq!(err.to_string(), "No tax rate for category 7 in region TN");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "region_code".to_string(),
        };
        assert_eq!(err.to_string(), "region_code is required");

        let err = ValidationError::OutOfRange {
            field: "tax_percentage".to_string(),
            min: 0.0,
            max: 100.0,
        };
        assert_eq!(err.to_string(), "tax_percentage must be between 0 and 100");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
