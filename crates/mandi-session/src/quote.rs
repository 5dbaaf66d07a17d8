//! # Order Tax Quotes
//!
//! Prices a multi-line order against the current rate table.
//!
//! ```text
//! lines ──► validate ──► rates() ──► per line:
//!                                      resolve_rate(category, buyer region)
//!                                        ├── found   → check pct → compute_split → LineQuote
//!                                        └── missing → UnresolvedLine (no guess)
//!                                    summary = Σ line splits
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use mandi_core::tax::{compute_split, resolve_rate_with_fallback};
use mandi_core::validation::{
    validate_quantity, validate_region_code, validate_tax_percentage, validate_unit_price,
};
use mandi_core::{CoreError, TaxSplitResult, TaxSummary};

use crate::config::TaxSettings;
use crate::error::SessionResult;
use crate::rates::TaxRateProvider;

/// One order line to be priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub category_id: i64,
    pub unit_price: f64,
    pub quantity: i64,
    pub buyer_region: String,

    /// Falls back to the configured seller region when absent.
    #[serde(default)]
    pub seller_region: Option<String>,
}

impl QuoteLine {
    pub fn new(
        category_id: i64,
        unit_price: f64,
        quantity: i64,
        buyer_region: impl Into<String>,
    ) -> Self {
        QuoteLine {
            category_id,
            unit_price,
            quantity,
            buyer_region: buyer_region.into(),
            seller_region: None,
        }
    }

    pub fn with_seller(mut self, seller_region: impl Into<String>) -> Self {
        self.seller_region = Some(seller_region.into());
        self
    }
}

/// A priced line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineQuote {
    /// Position in the request.
    pub index: usize,
    pub category_id: i64,
    pub region_code: String,
    pub hsn_code: String,
    pub tax_percentage: f64,
    pub split: TaxSplitResult,
}

/// A line with no applicable rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnresolvedLine {
    pub index: usize,
    pub category_id: i64,
    pub region_code: String,
}

/// Result of pricing an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderQuote {
    pub lines: Vec<LineQuote>,
    pub unresolved: Vec<UnresolvedLine>,
    pub summary: TaxSummary,
}

impl OrderQuote {
    /// Checks if every line was priced.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Prices orders with rates from a provider.
pub struct Quoter {
    provider: Arc<dyn TaxRateProvider>,
    settings: TaxSettings,
}

impl Quoter {
    pub fn new(provider: Arc<dyn TaxRateProvider>, settings: TaxSettings) -> Self {
        Quoter { provider, settings }
    }

    pub fn settings(&self) -> &TaxSettings {
        &self.settings
    }

    /// Prices `lines`.
    ///
    /// Malformed input (non-positive quantity, negative price, bad region
    /// code) fails the whole quote, and so does a matched rate row whose
    /// percentage is outside 0..=100. A missing rate only moves that line to
    /// [`OrderQuote::unresolved`].
    pub async fn quote_order(&self, lines: &[QuoteLine]) -> SessionResult<OrderQuote> {
        for line in lines {
            validate_unit_price(line.unit_price).map_err(CoreError::from)?;
            validate_quantity(line.quantity).map_err(CoreError::from)?;
            validate_region_code(&line.buyer_region).map_err(CoreError::from)?;
            if let Some(seller) = &line.seller_region {
                validate_region_code(seller).map_err(CoreError::from)?;
            }
        }

        let rates = self.provider.rates().await?;
        let mut quote = OrderQuote::default();

        for (index, line) in lines.iter().enumerate() {
            let seller_region = line
                .seller_region
                .as_deref()
                .unwrap_or(&self.settings.seller_region);

            match resolve_rate_with_fallback(
                &rates,
                line.category_id,
                &line.buyer_region,
                &self.settings.fallback_region,
            ) {
                Ok(rate) => {
                    validate_tax_percentage(rate.tax_percentage).map_err(|e| {
                        warn!(
                            index,
                            category_id = rate.category_id,
                            region_code = %rate.region_code,
                            tax_percentage = rate.tax_percentage,
                            "Rate row has an invalid percentage"
                        );
                        CoreError::from(e)
                    })?;

                    let split = compute_split(
                        line.unit_price,
                        line.quantity,
                        rate.tax_percentage,
                        &line.buyer_region,
                        seller_region,
                    );
                    quote.summary += &split;
                    quote.lines.push(LineQuote {
                        index,
                        category_id: line.category_id,
                        region_code: rate.region_code.clone(),
                        hsn_code: rate.hsn_code.clone(),
                        tax_percentage: rate.tax_percentage,
                        split,
                    });
                }
                Err(e) => {
                    warn!(index, error = %e, "Quote line left unresolved");
                    quote.unresolved.push(UnresolvedLine {
                        index,
                        category_id: line.category_id,
                        region_code: line.buyer_region.clone(),
                    });
                }
            }
        }

        debug!(
            lines = quote.lines.len(),
            unresolved = quote.unresolved.len(),
            total = quote.summary.total_price,
            "Order quoted"
        );
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use crate::rates::FixtureRateProvider;
    use mandi_core::{TaxRate, ValidationError};

    const EPS: f64 = 1e-9;

    fn quoter() -> Quoter {
        Quoter::new(Arc::new(FixtureRateProvider::builtin()), TaxSettings::default())
    }

    #[tokio::test]
    async fn test_intra_state_line_uses_configured_seller() {
        // electronics, 18% everywhere; buyer in MH, default seller MH
        let quote = quoter()
            .quote_order(&[QuoteLine::new(4, 100.0, 2, "MH")])
            .await
            .unwrap();

        assert!(quote.is_complete());
        let split = quote.lines[0].split;
        assert!((split.base_price - 200.0).abs() < EPS);
        assert!((split.cgst - 18.0).abs() < EPS);
        assert!((split.sgst - 18.0).abs() < EPS);
        assert_eq!(split.igst, 0.0);
        assert!((split.total_price - 236.0).abs() < EPS);
        assert_eq!(quote.lines[0].region_code, "ALL");
    }

    #[tokio::test]
    async fn test_explicit_seller_makes_inter_state() {
        let line = QuoteLine::new(4, 100.0, 1, "MH").with_seller("KA");
        let quote = quoter().quote_order(&[line]).await.unwrap();

        let split = quote.lines[0].split;
        assert!((split.igst - 18.0).abs() < EPS);
        assert_eq!(split.cgst, 0.0);
    }

    #[tokio::test]
    async fn test_region_specific_rate_wins() {
        // snacks: 12% ALL, 18% MH
        let quote = quoter()
            .quote_order(&[
                QuoteLine::new(3, 100.0, 1, "MH"),
                QuoteLine::new(3, 100.0, 1, "TN"),
            ])
            .await
            .unwrap();

        assert_eq!(quote.lines[0].tax_percentage, 18.0);
        assert_eq!(quote.lines[1].tax_percentage, 12.0);
        assert_eq!(quote.lines[0].hsn_code, "2106");
    }

    #[tokio::test]
    async fn test_summary_mixes_components() {
        let quote = quoter()
            .quote_order(&[
                QuoteLine::new(4, 100.0, 2, "MH"),
                QuoteLine::new(4, 100.0, 1, "KA"),
            ])
            .await
            .unwrap();

        let summary = quote.summary;
        assert_eq!(summary.line_count, 2);
        assert!((summary.base_price - 300.0).abs() < EPS);
        assert!((summary.cgst - 18.0).abs() < EPS);
        assert!((summary.igst - 18.0).abs() < EPS);
        assert!((summary.tax_amount - (summary.cgst + summary.sgst + summary.igst)).abs() < EPS);
        assert!((summary.total_price - 354.0).abs() < EPS);
    }

    #[tokio::test]
    async fn test_unknown_category_is_reported() {
        let quote = quoter()
            .quote_order(&[
                QuoteLine::new(4, 50.0, 1, "MH"),
                QuoteLine::new(77, 10.0, 3, "GJ"),
            ])
            .await
            .unwrap();

        assert!(!quote.is_complete());
        assert_eq!(quote.lines.len(), 1);
        assert_eq!(
            quote.unresolved,
            vec![UnresolvedLine {
                index: 1,
                category_id: 77,
                region_code: "GJ".to_string(),
            }]
        );
        assert_eq!(quote.summary.line_count, 1);
    }

    #[tokio::test]
    async fn test_custom_fallback_region() {
        let rates = vec![TaxRate {
            category_id: 1,
            hsn_code: String::new(),
            region_code: "IN".to_string(),
            tax_percentage: 5.0,
            is_default: true,
        }];
        let settings = TaxSettings {
            fallback_region: "IN".to_string(),
            ..TaxSettings::default()
        };
        let quoter = Quoter::new(Arc::new(FixtureRateProvider::from_rates(rates)), settings);

        let quote = quoter
            .quote_order(&[QuoteLine::new(1, 20.0, 1, "KA")])
            .await
            .unwrap();
        assert!(quote.is_complete());
        assert!((quote.summary.tax_amount - 1.0).abs() < EPS);
    }

    #[tokio::test]
    async fn test_invalid_line_rejected() {
        let err = quoter()
            .quote_order(&[QuoteLine::new(4, 100.0, 0, "MH")])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Core(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));

        let err = quoter()
            .quote_order(&[QuoteLine::new(4, 100.0, 1, "")])
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_order() {
        let quote = quoter().quote_order(&[]).await.unwrap();
        assert!(quote.is_complete());
        assert_eq!(quote.summary, TaxSummary::default());
    }

    #[tokio::test]
    async fn test_out_of_range_rate_row_rejected() {
        let row = |region: &str, pct| TaxRate {
            category_id: 8,
            hsn_code: String::new(),
            region_code: region.to_string(),
            tax_percentage: pct,
            is_default: false,
        };
        let rates = vec![row("MH", -5.0), row("ALL", 120.0), row("KA", 12.0)];
        let quoter = Quoter::new(
            Arc::new(FixtureRateProvider::from_rates(rates)),
            TaxSettings::default(),
        );

        for buyer in ["MH", "TN"] {
            let err = quoter
                .quote_order(&[QuoteLine::new(8, 100.0, 1, buyer)])
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                SessionError::Core(CoreError::Validation(ValidationError::OutOfRange { .. }))
            ));
        }

        let quote = quoter
            .quote_order(&[QuoteLine::new(8, 100.0, 1, "KA")])
            .await
            .unwrap();
        assert!((quote.summary.tax_amount - 12.0).abs() < EPS);
    }
}
