//! # Session Error Types
//!
//! Error types for configuration, backend and rate-provider failures.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Backend      │  │     Rates / Quotes      │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Unavailable    │  │  RatesLoadFailed        │ │
//! │  │  ConfigLoad...  │  │  Rejected       │  │  Core (rate not found)  │ │
//! │  │                 │  │  Unauthorized   │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use mandi_core::CoreError;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session error type.
#[derive(Debug, Error)]
pub enum SessionError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// Backend could not be reached or timed out.
    #[error("Permission backend unavailable: {0}")]
    Unavailable(String),

    /// Backend answered but refused the request.
    #[error("Permission backend rejected request: {0}")]
    Rejected(String),

    /// Caller is not allowed to perform the operation.
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Payload could not be (de)serialized.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    // =========================================================================
    // Rate Errors
    // =========================================================================
    /// Failed to load a tax rate table.
    #[error("Failed to load tax rates: {0}")]
    RatesLoadFailed(String),

    /// Business rule error from mandi-core.
    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::SerializationFailed(err.to_string())
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SessionError {
    /// Returns true if the operation can be retried as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SessionError::Unavailable(_))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidConfig(_)
                | SessionError::ConfigLoadFailed(_)
                | SessionError::RatesLoadFailed(_)
        )
    }
}
