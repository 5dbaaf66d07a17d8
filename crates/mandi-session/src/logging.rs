//! Tracing subscriber setup.
//!
//! The filter comes from `MANDI_LOG` (same syntax as `RUST_LOG`), defaulting
//! to `info`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "MANDI_LOG";

/// Builds the filter from `MANDI_LOG`, or `info` when unset or invalid.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs a global fmt subscriber.
///
/// Returns `false` if a subscriber was already installed (tests, embedding
/// applications), in which case the existing one is kept.
pub fn init_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .try_init()
        .is_ok()
}
