//! # Session Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MANDI_SELLER_REGION=KA                                             │
//! │     MANDI_REFRESH_ON_EDIT=false                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/mandi/mandi.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.mandi.marketplace/mandi.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [tax]
//! seller_region = "MH"
//! fallback_region = "ALL"
//! rates_path = "/etc/mandi/rates.json"
//!
//! [permissions]
//! refresh_on_edit = true
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use mandi_core::validation::validate_region_code;

use crate::error::{SessionError, SessionResult};

// =============================================================================
// Tax Settings
// =============================================================================

/// Tax quote settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSettings {
    /// Seller jurisdiction used when a quote line does not name one.
    #[serde(default = "default_seller_region")]
    pub seller_region: String,

    /// Wildcard region code of the rate table.
    #[serde(default = "default_fallback_region")]
    pub fallback_region: String,

    /// JSON rate table. The built-in fixture is used when unset.
    #[serde(default)]
    pub rates_path: Option<PathBuf>,
}

fn default_seller_region() -> String {
    "MH".to_string()
}

fn default_fallback_region() -> String {
    mandi_core::FALLBACK_REGION.to_string()
}

impl Default for TaxSettings {
    fn default() -> Self {
        TaxSettings {
            seller_region: default_seller_region(),
            fallback_region: default_fallback_region(),
            rates_path: None,
        }
    }
}

// =============================================================================
// Permission Settings
// =============================================================================

/// Permission editing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionSettings {
    /// Re-fetch from the backend after saving an edit instead of trusting
    /// the local draft.
    #[serde(default = "default_true")]
    pub refresh_on_edit: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PermissionSettings {
    fn default() -> Self {
        PermissionSettings {
            refresh_on_edit: true,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete session configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MandiConfig {
    #[serde(default)]
    pub tax: TaxSettings,

    #[serde(default)]
    pub permissions: PermissionSettings,
}

impl MandiConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (mandi.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SessionResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SessionResult<()> {
        validate_region_code(&self.tax.seller_region)
            .map_err(|e| SessionError::InvalidConfig(format!("tax.seller_region: {}", e)))?;

        validate_region_code(&self.tax.fallback_region)
            .map_err(|e| SessionError::InvalidConfig(format!("tax.fallback_region: {}", e)))?;

        Ok(())
    }

    /// Applies `MANDI_*` overrides read through `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(region) = lookup("MANDI_SELLER_REGION") {
            debug!(region = %region, "Overriding seller region from environment");
            self.tax.seller_region = region;
        }

        if let Some(path) = lookup("MANDI_RATES_PATH") {
            self.tax.rates_path = Some(PathBuf::from(path));
        }

        if let Some(flag) = lookup("MANDI_REFRESH_ON_EDIT") {
            match flag.parse::<bool>() {
                Ok(value) => self.permissions.refresh_on_edit = value,
                Err(_) => warn!(value = %flag, "Ignoring non-boolean MANDI_REFRESH_ON_EDIT"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "mandi", "marketplace")
            .map(|dirs| dirs.config_dir().join("mandi.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("mandi-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = MandiConfig::default();
        assert_eq!(config.tax.seller_region, "MH");
        assert_eq!(config.tax.fallback_region, "ALL");
        assert!(config.permissions.refresh_on_edit);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: MandiConfig = toml::from_str("[tax]\nseller_region = \"KA\"\n").unwrap();
        assert_eq!(config.tax.seller_region, "KA");
        assert_eq!(config.tax.fallback_region, "ALL");
        assert_eq!(config.permissions, PermissionSettings::default());
    }

    #[test]
    fn test_load_from_file() {
        let path = temp_file(
            "load.toml",
            concat!(
                "[tax]\n",
                "seller_region = \"TN\"\n",
                "rates_path = \"rates.json\"\n",
                "\n",
                "[permissions]\n",
                "refresh_on_edit = false\n",
            ),
        );
        let config = MandiConfig::load(Some(path.clone())).unwrap();
        std::fs::remove_file(path).ok();

        assert_eq!(config.tax.rates_path, Some(PathBuf::from("rates.json")));
        assert!(!config.permissions.refresh_on_edit);
    }

    #[test]
    fn test_load_invalid_file_falls_back() {
        let path = temp_file("broken.toml", "[tax\nseller_region = ");
        let err = MandiConfig::load(Some(path.clone())).unwrap_err();
        assert!(err.is_config_error());

        let config = MandiConfig::load_or_default(Some(path.clone()));
        std::fs::remove_file(path).ok();
        assert_eq!(config, MandiConfig::default());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("MANDI_SELLER_REGION", "GJ"),
            ("MANDI_REFRESH_ON_EDIT", "maybe"),
        ]);
        let mut config = MandiConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.tax.seller_region, "GJ");
        assert!(config.permissions.refresh_on_edit);
        assert!(config.tax.rates_path.is_none());

        let env: HashMap<&str, &str> = HashMap::from([("MANDI_REFRESH_ON_EDIT", "false")]);
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert!(!config.permissions.refresh_on_edit);
    }

    #[test]
    fn test_validation() {
        let mut config = MandiConfig::default();
        config.tax.seller_region = String::new();
        assert!(config.validate().is_err());

        config.tax.seller_region = "KA".to_string();
        config.tax.fallback_region = "ALL-IN".to_string();
        assert!(config.validate().is_err());

        config.tax.fallback_region = "IN".to_string();
        assert!(config.validate().is_ok());
    }
}
