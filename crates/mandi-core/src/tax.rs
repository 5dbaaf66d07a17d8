//! # GST Tax Split
//!
//! Resolves the GST rate for a category/region and splits the tax into its
//! central, state and integrated components.
//!
//! ## Split Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  base = unit_price × quantity                                           │
//! │  tax  = base × tax_percentage / 100                                     │
//! │                                                                         │
//! │  buyer region == seller region  (intra-state supply)                    │
//! │      CGST = tax / 2    SGST = tax / 2    IGST = 0                       │
//! │                                                                         │
//! │  buyer region != seller region  (inter-state supply)                    │
//! │      CGST = 0          SGST = 0          IGST = tax                     │
//! │                                                                         │
//! │  total = base + tax                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Numeric Semantics
//! Amounts are `f64` and returned unrounded, matching what the order and
//! invoice pages display after their own formatting. Use
//! [`TaxSplitResult::rounded`] for a 2-decimal copy.
//!
//! ## Usage
//! ```rust
//! use mandi_core::tax::compute_split;
//!
//! let split = compute_split(100.0, 2, 18.0, "MH", "MH");
//! assert_eq!(split.cgst, 18.0);
//! assert_eq!(split.total_price, 236.0);
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{TaxRate, TaxSplitResult};
use crate::FALLBACK_REGION;

// =============================================================================
// Rate Resolution
// =============================================================================

/// Finds the rate for `category_id` in `region_code`, falling back to the
/// `"ALL"` row.
///
/// ## Lookup Order
/// ```text
/// rows where category_id matches
///      │
///      ├── region_code == region_code?  → first such row
///      ├── region_code == "ALL"?        → first such row
///      └── otherwise                    → TaxRateNotFound
/// ```
pub fn resolve_rate<'a>(
    rates: &'a [TaxRate],
    category_id: i64,
    region_code: &str,
) -> CoreResult<&'a TaxRate> {
    resolve_rate_with_fallback(rates, category_id, region_code, FALLBACK_REGION)
}

/// Same as [`resolve_rate`] with a caller-chosen wildcard region code.
pub fn resolve_rate_with_fallback<'a>(
    rates: &'a [TaxRate],
    category_id: i64,
    region_code: &str,
    fallback_region: &str,
) -> CoreResult<&'a TaxRate> {
    let mut fallback = None;

    for rate in rates.iter().filter(|r| r.category_id == category_id) {
        if rate.region_code == region_code {
            return Ok(rate);
        }
        if fallback.is_none() && rate.region_code == fallback_region {
            fallback = Some(rate);
        }
    }

    fallback.ok_or_else(|| CoreError::TaxRateNotFound {
        category_id,
        region_code: region_code.to_string(),
    })
}

// =============================================================================
// Split Computation
// =============================================================================

/// Computes base, tax, component split and total for one line.
///
/// Quantity and percentage are used as given; see
/// [`crate::validation`] for optional guards.
pub fn compute_split(
    base_price_unit: f64,
    quantity: i64,
    tax_percentage: f64,
    buyer_region: &str,
    seller_region: &str,
) -> TaxSplitResult {
    let base_price = base_price_unit * quantity as f64;
    let tax_amount = base_price * (tax_percentage / 100.0);

    let (cgst, sgst, igst) = if buyer_region == seller_region {
        (tax_amount / 2.0, tax_amount / 2.0, 0.0)
    } else {
        (0.0, 0.0, tax_amount)
    };

    TaxSplitResult {
        base_price,
        tax_amount,
        cgst,
        sgst,
        igst,
        total_price: base_price + tax_amount,
    }
}

/// Resolves the rate and computes the split in one step.
///
/// The rate is looked up for the buyer's region (place of supply).
pub fn compute_split_for_category(
    rates: &[TaxRate],
    category_id: i64,
    base_price_unit: f64,
    quantity: i64,
    buyer_region: &str,
    seller_region: &str,
) -> CoreResult<TaxSplitResult> {
    let rate = resolve_rate(rates, category_id, buyer_region)?;
    Ok(compute_split(
        base_price_unit,
        quantity,
        rate.tax_percentage,
        buyer_region,
        seller_region,
    ))
}

// =============================================================================
// Display Helpers
// =============================================================================

/// Rounds to 2 decimal places (paise).
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats an amount as rupees with 2 decimals, e.g. `₹236.00`.
pub fn format_rupees(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}₹{:.2}", sign, value.abs())
}

impl TaxSplitResult {
    /// Returns a copy with every amount rounded to 2 decimals.
    pub fn rounded(&self) -> TaxSplitResult {
        TaxSplitResult {
            base_price: round2(self.base_price),
            tax_amount: round2(self.tax_amount),
            cgst: round2(self.cgst),
            sgst: round2(self.sgst),
            igst: round2(self.igst),
            total_price: round2(self.total_price),
        }
    }

    /// Checks if the tax was split as CGST + SGST.
    pub fn is_intra_state(&self) -> bool {
        self.igst == 0.0 && (self.cgst != 0.0 || self.sgst != 0.0)
    }
}

impl fmt::Display for TaxSplitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.igst != 0.0 {
            write!(
                f,
                "{} + IGST {} = {}",
                format_rupees(self.base_price),
                format_rupees(self.igst),
                format_rupees(self.total_price)
            )
        } else {
            write!(
                f,
                "{} + CGST {} + SGST {} = {}",
                format_rupees(self.base_price),
                format_rupees(self.cgst),
                format_rupees(self.sgst),
                format_rupees(self.total_price)
            )
        }
    }
}

// =============================================================================
// Order Summary
// =============================================================================

/// Sum of several line splits, e.g. the tax block of an order page.
///
/// Unlike a single [`TaxSplitResult`], a mixed order can carry both
/// CGST/SGST and IGST.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxSummary {
    pub line_count: usize,
    pub base_price: f64,
    pub tax_amount: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    pub total_price: f64,
}

impl AddAssign<&TaxSplitResult> for TaxSummary {
    fn add_assign(&mut self, line: &TaxSplitResult) {
        self.line_count += 1;
        self.base_price += line.base_price;
        self.tax_amount += line.tax_amount;
        self.cgst += line.cgst;
        self.sgst += line.sgst;
        self.igst += line.igst;
        self.total_price += line.total_price;
    }
}

impl<'a> Sum<&'a TaxSplitResult> for TaxSummary {
    fn sum<I: Iterator<Item = &'a TaxSplitResult>>(iter: I) -> Self {
        let mut summary = TaxSummary::default();
        for line in iter {
            summary += line;
        }
        summary
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn rate(category_id: i64, region_code: &str, tax_percentage: f64) -> TaxRate {
        TaxRate {
            category_id,
            hsn_code: "8471".to_string(),
            region_code: region_code.to_string(),
            tax_percentage,
            is_default: region_code == "ALL",
        }
    }

    fn fixture() -> Vec<TaxRate> {
        vec![
            rate(1, "ALL", 18.0),
            rate(1, "MH", 12.0),
            rate(2, "KA", 5.0),
            rate(3, "ALL", 28.0),
        ]
    }

    fn assert_components_sum(split: &TaxSplitResult) {
        assert!((split.cgst + split.sgst + split.igst - split.tax_amount).abs() < EPS);
        assert!(split.igst == 0.0 || (split.cgst == 0.0 && split.sgst == 0.0));
    }

    #[test]
    fn test_intra_state_split() {
        let split = compute_split(100.0, 2, 18.0, "MH", "MH");
        assert_eq!(split.base_price, 200.0);
        assert_eq!(split.tax_amount, 36.0);
        assert_eq!(split.cgst, 18.0);
        assert_eq!(split.sgst, 18.0);
        assert_eq!(split.igst, 0.0);
        assert_eq!(split.total_price, 236.0);
        assert!(split.is_intra_state());
        assert_components_sum(&split);
    }

    #[test]
    fn test_inter_state_split() {
        let split = compute_split(100.0, 1, 18.0, "KA", "MH");
        assert_eq!(split.base_price, 100.0);
        assert_eq!(split.tax_amount, 18.0);
        assert_eq!(split.cgst, 0.0);
        assert_eq!(split.sgst, 0.0);
        assert_eq!(split.igst, 18.0);
        assert_eq!(split.total_price, 118.0);
        assert!(!split.is_intra_state());
        assert_components_sum(&split);
    }

    #[test]
    fn test_split_is_unrounded() {
        let split = compute_split(99.99, 3, 12.5, "TN", "TN");
        assert!((split.tax_amount - 37.49625).abs() < EPS);
        assert!((split.cgst - 18.748125).abs() < EPS);
        assert_components_sum(&split);

        let rounded = split.rounded();
        assert_eq!(rounded.tax_amount, 37.5);
        assert_eq!(rounded.cgst, 18.75);
    }

    #[test]
    fn test_zero_tax() {
        let split = compute_split(250.0, 4, 0.0, "DL", "MH");
        assert_eq!(split.tax_amount, 0.0);
        assert_eq!(split.total_price, 1000.0);
        assert!(!split.is_intra_state());
        assert_components_sum(&split);
    }

    #[test]
    fn test_resolve_exact_region_wins() {
        let rates = fixture();
        let found = resolve_rate(&rates, 1, "MH").unwrap();
        assert_eq!(found.region_code, "MH");
        assert_eq!(found.tax_percentage, 12.0);
    }

    #[test]
    fn test_resolve_falls_back_to_all() {
        let rates = fixture();
        let found = resolve_rate(&rates, 1, "TN").unwrap();
        assert_eq!(found.region_code, "ALL");
        assert_eq!(found.tax_percentage, 18.0);
    }

    #[test]
    fn test_resolve_not_found() {
        let rates = fixture();
        let err = resolve_rate(&rates, 2, "TN").unwrap_err();
        assert_eq!(
            err,
            CoreError::TaxRateNotFound {
                category_id: 2,
                region_code: "TN".to_string()
            }
        );
        assert!(resolve_rate(&rates, 99, "MH").is_err());
        assert!(resolve_rate(&[], 1, "MH").is_err());
    }

    #[test]
    fn test_resolve_with_custom_fallback() {
        let rates = vec![rate(5, "*", 3.0)];
        assert!(resolve_rate(&rates, 5, "GJ").is_err());
        let found = resolve_rate_with_fallback(&rates, 5, "GJ", "*").unwrap();
        assert_eq!(found.tax_percentage, 3.0);
    }

    #[test]
    fn test_compute_split_for_category() {
        let rates = fixture();
        let split = compute_split_for_category(&rates, 3, 1000.0, 1, "GJ", "MH").unwrap();
        assert!((split.igst - 280.0).abs() < EPS);
        assert!(compute_split_for_category(&rates, 2, 10.0, 1, "GJ", "MH").is_err());
    }

    #[test]
    fn test_display() {
        let split = compute_split(100.0, 2, 18.0, "MH", "MH");
        assert_eq!(
            split.to_string(),
            "₹200.00 + CGST ₹18.00 + SGST ₹18.00 = ₹236.00"
        );
        let split = compute_split(100.0, 1, 18.0, "KA", "MH");
        assert_eq!(split.to_string(), "₹100.00 + IGST ₹18.00 = ₹118.00");
        assert_eq!(format_rupees(-5.5), "-₹5.50");
    }

    #[test]
    fn test_summary_of_mixed_order() {
        let lines = [
            compute_split(100.0, 2, 18.0, "MH", "MH"),
            compute_split(100.0, 1, 18.0, "KA", "MH"),
        ];
        let summary: TaxSummary = lines.iter().sum();
        assert_eq!(summary.line_count, 2);
        assert_eq!(summary.base_price, 300.0);
        assert_eq!(summary.tax_amount, 54.0);
        assert_eq!(summary.cgst, 18.0);
        assert_eq!(summary.igst, 18.0);
        assert_eq!(summary.total_price, 354.0);
    }
}
