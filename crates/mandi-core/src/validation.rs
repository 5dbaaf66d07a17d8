//! # Validation Module
//!
//! Opt-in input guards for the tax calculator's callers.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form inputs (TypeScript)                                     │
//! │  ├── Basic format checks (empty, numeric)                              │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Quantity, percentage, price, region code guards                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: compute_split                                                │
//! │  └── No checks; computes whatever it is given                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mandi_core::validation::{validate_quantity, validate_tax_percentage};
//!
//! assert!(validate_quantity(3).is_ok());
//! assert!(validate_tax_percentage(-1.0).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_REGION_CODE_LEN, MAX_TAX_PERCENTAGE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity (must be at least 1).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a tax percentage.
///
/// ## Rules
/// - Must be a finite number
/// - Must be between 0 and 100 (GST slabs are 0, 5, 12, 18, 28)
pub fn validate_tax_percentage(pct: f64) -> ValidationResult<()> {
    if !pct.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "tax_percentage".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if !(0.0..=MAX_TAX_PERCENTAGE).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: "tax_percentage".to_string(),
            min: 0.0,
            max: MAX_TAX_PERCENTAGE,
        });
    }

    Ok(())
}

/// Validates a unit price. Zero is allowed (free samples).
pub fn validate_unit_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "unit_price".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if price < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "unit_price".to_string(),
            min: 0.0,
            max: f64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a region code (`"MH"`, `"KA"`, `"ALL"`).
///
/// ## Rules
/// - Must not be empty
/// - At most 8 characters
/// - ASCII letters and digits only
pub fn validate_region_code(code: &str) -> ValidationResult<()> {
    if code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "region_code".to_string(),
        });
    }

    if code.len() > MAX_REGION_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "region_code".to_string(),
            max: MAX_REGION_CODE_LEN,
        });
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "region_code".to_string(),
            reason: "must contain only letters and digits".to_string(),
        });
    }

    Ok(())
}

/// Runs every guard relevant to one priced line.
pub fn validate_line(
    unit_price: f64,
    quantity: i64,
    tax_percentage: f64,
    buyer_region: &str,
    seller_region: &str,
) -> ValidationResult<()> {
    validate_unit_price(unit_price)?;
    validate_quantity(quantity)?;
    validate_tax_percentage(tax_percentage)?;
    validate_region_code(buyer_region)?;
    validate_region_code(seller_region)
}

// =============================================================================
// Unit Tests
// =============================================================================
