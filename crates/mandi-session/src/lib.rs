//! # mandi-session: Orchestration Layer for Mandi
//!
//! Wires the pure rules of [`mandi_core`] to the outside world: the
//! authorization backend, the GST rate table, configuration and logging.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Session Layer                                    │
//! │                                                                         │
//! │  ┌────────────────────┐  ┌────────────────────┐  ┌──────────────────┐  │
//! │  │ PermissionSession  │  │ PermissionEditor   │  │ Quoter           │  │
//! │  │                    │  │                    │  │                  │  │
//! │  │ Signed-in user's   │  │ Admin edits of     │  │ Order tax quote  │  │
//! │  │ snapshot, can()    │  │ another user, save │  │ + TaxSummary     │  │
//! │  └─────────┬──────────┘  └─────────┬──────────┘  └────────┬─────────┘  │
//! │            │                       │                      │            │
//! │            ▼                       ▼                      ▼            │
//! │  ┌─────────────────────────────────────────┐  ┌──────────────────────┐ │
//! │  │ PermissionBackend (async trait)         │  │ TaxRateProvider      │ │
//! │  │ GET rows / PUT { user_id, permissions } │  │ JSON table / builtin │ │
//! │  └─────────────────────────────────────────┘  └──────────────────────┘ │
//! │                                                                         │
//! │  MandiConfig (defaults → mandi.toml → MANDI_* env) • init_tracing()    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`backend`] - `PermissionBackend` trait and in-memory implementation
//! - [`config`] - TOML/env configuration
//! - [`editor`] - Draft/save cycle for another user's permissions
//! - [`error`] - Session error types
//! - [`logging`] - Tracing subscriber setup
//! - [`quote`] - Multi-line order tax quotes
//! - [`rates`] - Tax rate table providers
//! - [`session`] - Current principal's permission snapshot
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mandi_core::{ActionId, ModuleId};
//! use mandi_session::{FixtureRateProvider, MandiConfig, PermissionSession, QuoteLine, Quoter};
//!
//! mandi_session::init_tracing();
//! let config = MandiConfig::load_or_default(None);
//!
//! let session = PermissionSession::new(backend);
//! session.refresh(user_id).await?;
//! if session.can(&ModuleId::TAX_RATES, &ActionId::MANAGE).await {
//!     // show the rate editor
//! }
//!
//! let rates = FixtureRateProvider::from_settings(&config.tax)?;
//! let quoter = Quoter::new(Arc::new(rates), config.tax.clone());
//! let quote = quoter.quote_order(&[QuoteLine::new(4, 100.0, 2, "KA")]).await?;
//! println!("{}", quote.summary.total_price);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod config;
pub mod editor;
pub mod error;
pub mod logging;
pub mod quote;
pub mod rates;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{InMemoryBackend, PermissionBackend};
pub use config::{MandiConfig, PermissionSettings, TaxSettings};
pub use editor::PermissionEditor;
pub use error::{SessionError, SessionResult};
pub use logging::init_tracing;
pub use quote::{LineQuote, OrderQuote, QuoteLine, Quoter, UnresolvedLine};
pub use rates::{FixtureRateProvider, TaxRateProvider};
pub use session::PermissionSession;
