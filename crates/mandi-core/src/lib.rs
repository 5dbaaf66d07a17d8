//! # mandi-core: Pure Business Rules for the Mandi Marketplace
//!
//! This crate holds the marketplace rules that the admin dashboards and the
//! buyer/seller order pages depend on, as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mandi Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web front end                                │   │
//! │  │    Admin nav ──► Permission editor ──► Order page ──► Invoice   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ generated TS types (ts-rs)             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               mandi-session                                     │   │
//! │  │    config, logging, permission session, rate providers, quotes  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ mandi-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ permission │  │    tax    │  │   wire    │  │ validation│  │   │
//! │  │   │ decode     │  │ resolve   │  │ rows      │  │  guards   │  │   │
//! │  │   │ predicates │  │ split     │  │ update    │  │           │  │   │
//! │  │   └────────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO LOGGING • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Permission, UserPermissions, TaxRate, ...)
//! - [`permission`] - Permission decode/encode, predicates, editing
//! - [`tax`] - GST rate lookup and CGST/SGST/IGST split
//! - [`wire`] - Backend payload shapes
//! - [`validation`] - Optional caller-side input guards
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output; edits return new lists
//! 2. **Fail Closed**: missing permission data never grants access
//! 3. **Explicit State**: predicates take the snapshot as an argument
//! 4. **Wire Compatible**: `"<action>_<module>"` strings round-trip exactly
//!
//! ## Example Usage
//!
//! ```rust
//! use mandi_core::permission::{decode, has_permission};
//! use mandi_core::tax::compute_split;
//! use mandi_core::{ActionId, ModuleId};
//!
//! let me = decode(42, false, ["manage_orders"]);
//! assert!(has_permission(Some(&me), &ModuleId::ORDERS, &ActionId::VIEW));
//!
//! let split = compute_split(100.0, 1, 18.0, "KA", "MH");
//! assert_eq!(split.igst, 18.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod permission;
pub mod tax;
pub mod types;
pub mod validation;
pub mod wire;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use tax::TaxSummary;
pub use types::*;
pub use wire::{PermissionRow, PermissionUpdate};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Region code of the catch-all row in a rate table.
pub const FALLBACK_REGION: &str = "ALL";

/// Upper bound accepted by [`validation::validate_tax_percentage`].
pub const MAX_TAX_PERCENTAGE: f64 = 100.0;

/// Longest region code accepted by [`validation::validate_region_code`].
pub const MAX_REGION_CODE_LEN: usize = 8;
