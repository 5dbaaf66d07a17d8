//! # Tax Rate Providers
//!
//! Where quote computations get their rate table from.
//!
//! The rate table is a JSON array of [`TaxRate`] records:
//! ```json
//! [
//!   { "category_id": 1, "hsn_code": "1006", "region_code": "ALL", "tax_percentage": 5.0, "is_default": true },
//!   { "category_id": 1, "hsn_code": "1006", "region_code": "KA",  "tax_percentage": 0.0 }
//! ]
//! ```

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use mandi_core::TaxRate;

use crate::config::TaxSettings;
use crate::error::{SessionError, SessionResult};

/// Source of the GST rate table.
#[async_trait]
pub trait TaxRateProvider: Send + Sync {
    async fn rates(&self) -> SessionResult<Vec<TaxRate>>;
}

/// Provider backed by a fixed table, loaded once.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureRateProvider {
    rates: Vec<TaxRate>,
}

impl FixtureRateProvider {
    /// Wraps an already loaded table.
    pub fn from_rates(rates: Vec<TaxRate>) -> Self {
        FixtureRateProvider { rates }
    }

    /// Loads a JSON rate table from disk.
    pub fn from_path(path: &Path) -> SessionResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SessionError::RatesLoadFailed(format!("{}: {}", path.display(), e))
        })?;
        let rates: Vec<TaxRate> = serde_json::from_str(&contents).map_err(|e| {
            SessionError::RatesLoadFailed(format!("{}: {}", path.display(), e))
        })?;

        info!(path = %path.display(), count = rates.len(), "Loaded tax rate table");
        Ok(Self::from_rates(rates))
    }

    /// Uses `rates_path` when configured, the built-in table otherwise.
    pub fn from_settings(settings: &TaxSettings) -> SessionResult<Self> {
        match &settings.rates_path {
            Some(path) => Self::from_path(path),
            None => {
                debug!("No rates_path configured, using built-in rate table");
                Ok(Self::builtin())
            }
        }
    }

    /// Development table covering a handful of categories.
    pub fn builtin() -> Self {
        let row = |category_id, hsn: &str, region: &str, pct, is_default| TaxRate {
            category_id,
            hsn_code: hsn.to_string(),
            region_code: region.to_string(),
            tax_percentage: pct,
            is_default,
        };

        Self::from_rates(vec![
            // rice
            row(1, "1006", "ALL", 5.0, true),
            row(1, "1006", "KA", 0.0, false),
            // edible oil
            row(2, "1512", "ALL", 5.0, true),
            // packaged snacks
            row(3, "2106", "ALL", 12.0, true),
            row(3, "2106", "MH", 18.0, false),
            // electronics
            row(4, "8517", "ALL", 18.0, true),
            // aerated drinks
            row(5, "2202", "ALL", 28.0, true),
        ])
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[async_trait]
impl TaxRateProvider for FixtureRateProvider {
    async fn rates(&self) -> SessionResult<Vec<TaxRate>> {
        Ok(self.rates.clone())
    }
}
