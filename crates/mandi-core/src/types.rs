//! # Domain Types
//!
//! Core domain types shared by the permission engine and the tax calculator.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ UserPermissions │   │   Permission    │   │ ModuleId        │       │
//! │  │  ─────────────  │   │  ─────────────  │   │ ActionId        │       │
//! │  │  user_id        │──►│  module         │   │  ─────────────  │       │
//! │  │  is_super_admin │   │  actions (set)  │   │  "tax_rates"    │       │
//! │  │  permissions?   │   └─────────────────┘   │  "manage"       │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    TaxRate      │   │ TaxSplitResult  │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  category_id    │   │  base_price     │                             │
//! │  │  hsn_code       │   │  tax_amount     │                             │
//! │  │  region_code    │   │  cgst/sgst/igst │                             │
//! │  │  tax_percentage │   │  total_price    │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Open Vocabularies
//! Module and action names are strings on the wire. The known names are
//! exposed as constants, but any other name round-trips unchanged so that a
//! backend adding `"export_reports"` does not break older front ends.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::permission::normalize;

// =============================================================================
// Module Identifier
// =============================================================================

/// Name of a permission module (`"orders"`, `"tax_rates"`, ...).
///
/// Equality, ordering and hashing compare the name only, so a constant and a
/// name decoded from the wire are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct ModuleId(#[ts(type = "string")] Cow<'static, str>);

impl ModuleId {
    pub const BLOGS: ModuleId = ModuleId(Cow::Borrowed("blogs"));
    pub const ORDERS: ModuleId = ModuleId(Cow::Borrowed("orders"));
    pub const INVENTORY: ModuleId = ModuleId(Cow::Borrowed("inventory"));
    pub const TAX_RATES: ModuleId = ModuleId(Cow::Borrowed("tax_rates"));
    pub const PRODUCTS: ModuleId = ModuleId(Cow::Borrowed("products"));
    pub const CATEGORIES: ModuleId = ModuleId(Cow::Borrowed("categories"));
    pub const USERS: ModuleId = ModuleId(Cow::Borrowed("users"));
    pub const COMPANIES: ModuleId = ModuleId(Cow::Borrowed("companies"));
    pub const SELLERS: ModuleId = ModuleId(Cow::Borrowed("sellers"));

    /// Every module the admin dashboards know how to render.
    pub const KNOWN: [ModuleId; 9] = [
        ModuleId::BLOGS,
        ModuleId::ORDERS,
        ModuleId::INVENTORY,
        ModuleId::TAX_RATES,
        ModuleId::PRODUCTS,
        ModuleId::CATEGORIES,
        ModuleId::USERS,
        ModuleId::COMPANIES,
        ModuleId::SELLERS,
    ];

    /// Creates a module id from any name.
    pub fn new(name: impl Into<String>) -> Self {
        ModuleId(Cow::Owned(name.into()))
    }

    /// Returns the module name.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks if this is one of the [`ModuleId::KNOWN`] modules.
    pub fn is_known(&self) -> bool {
        ModuleId::KNOWN.contains(self)
    }
}

impl From<&str> for ModuleId {
    fn from(name: &str) -> Self {
        ModuleId::new(name)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Action Identifier
// =============================================================================

/// Name of an action on a module (`"view"`, `"manage"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct ActionId(#[ts(type = "string")] Cow<'static, str>);

impl ActionId {
    pub const VIEW: ActionId = ActionId(Cow::Borrowed("view"));

    /// Module-level admin action. Implies [`ActionId::VIEW`] and every other
    /// action on the same module.
    pub const MANAGE: ActionId = ActionId(Cow::Borrowed("manage"));

    /// Creates an action id from any name.
    pub fn new(name: impl Into<String>) -> Self {
        ActionId(Cow::Owned(name.into()))
    }

    /// Returns the action name.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks if this is the `manage` action.
    #[inline]
    pub fn is_manage(&self) -> bool {
        *self == ActionId::MANAGE
    }
}

impl From<&str> for ActionId {
    fn from(name: &str) -> Self {
        ActionId::new(name)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Permission
// =============================================================================

/// The set of actions granted on one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Permission {
    pub module: ModuleId,
    pub actions: BTreeSet<ActionId>,
}

impl Permission {
    /// Creates a permission entry from a module and its actions.
    pub fn new<I>(module: ModuleId, actions: I) -> Self
    where
        I: IntoIterator<Item = ActionId>,
    {
        Permission {
            module,
            actions: actions.into_iter().collect(),
        }
    }

    /// Checks if the entry grants `action`, either directly or through
    /// `manage`.
    pub fn grants(&self, action: &ActionId) -> bool {
        self.actions.contains(action) || self.actions.contains(&ActionId::MANAGE)
    }

    /// Checks if the entry has no actions left.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

// =============================================================================
// User Permissions
// =============================================================================

/// A principal's permission snapshot.
///
/// ## Lifecycle
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  login / refresh / permission page load                                 │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  GET permissions ──► decode ──► UserPermissions (immutable snapshot)    │
/// │                                       │                                 │
/// │                     edit (toggle) ────┘ produces a NEW list             │
/// │                          │                                              │
/// │                          ▼                                              │
/// │  PUT encode(list) ──► re-fetch ──► fresh UserPermissions                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// `permissions` is `None` when the backend omitted the field or sent
/// something that is not a list of permission entries. Every predicate
/// treats that as "no permission", including for super admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserPermissions {
    #[serde(default)]
    pub user_id: i64,

    #[serde(default)]
    pub is_super_admin: bool,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_permission_list"
    )]
    #[ts(optional)]
    pub permissions: Option<Vec<Permission>>,
}

impl UserPermissions {
    /// Creates a snapshot with the given entries.
    pub fn new(user_id: i64, is_super_admin: bool, permissions: Vec<Permission>) -> Self {
        UserPermissions {
            user_id,
            is_super_admin,
            permissions: Some(permissions),
        }
    }

    /// A regular user with no grants.
    pub fn empty(user_id: i64) -> Self {
        UserPermissions::new(user_id, false, Vec::new())
    }

    /// A super admin. The entry list is empty because the flag overrides it.
    pub fn super_admin(user_id: i64) -> Self {
        UserPermissions::new(user_id, true, Vec::new())
    }

    /// Returns the entries, or an empty slice when the list is absent.
    pub fn entries(&self) -> &[Permission] {
        self.permissions.as_deref().unwrap_or(&[])
    }

    /// Looks up the entry for `module`.
    pub fn permission_for(&self, module: &ModuleId) -> Option<&Permission> {
        self.entries().iter().find(|p| &p.module == module)
    }

    /// Iterates over the modules that have an entry.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleId> {
        self.entries().iter().map(|p| &p.module)
    }
}

/// Accepts any JSON value for `permissions`; only a well-formed list
/// survives, everything else becomes `None`. The surviving list is
/// normalized so each module has at most one entry.
fn lenient_permission_list<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<Permission>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if !value.is_array() {
        return Ok(None);
    }
    Ok(serde_json::from_value::<Vec<Permission>>(value)
        .ok()
        .map(|list| normalize(&list)))
}

// =============================================================================
// Tax Rate
// =============================================================================

/// A GST rate row for a product category in a region.
///
/// `region_code` is a state code (`"MH"`, `"KA"`) or the wildcard `"ALL"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate {
    pub category_id: i64,

    /// Harmonized System of Nomenclature code printed on invoices.
    #[serde(default)]
    pub hsn_code: String,

    pub region_code: String,

    /// Percentage, e.g. `18.0` for 18% GST.
    pub tax_percentage: f64,

    #[serde(default)]
    pub is_default: bool,
}

// =============================================================================
// Tax Split Result
// =============================================================================

/// Result of splitting GST for one priced line.
///
/// ## Invariants
/// - `cgst + sgst + igst == tax_amount`
/// - either `cgst`/`sgst` or `igst` carries the tax, never both
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxSplitResult {
    pub base_price: f64,
    pub tax_amount: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    pub total_price: f64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_constant_equals_decoded_name() {
        assert_eq!(ModuleId::TAX_RATES, ModuleId::new("tax_rates"));
        assert!(ModuleId::new("orders").is_known());
        assert!(!ModuleId::new("reports").is_known());
    }

    #[test]
    fn test_manage_grants_every_action() {
        let entry = Permission::new(ModuleId::ORDERS, [ActionId::MANAGE]);
        assert!(entry.grants(&ActionId::VIEW));
        assert!(entry.grants(&ActionId::new("export")));

        let entry = Permission::new(ModuleId::ORDERS, [ActionId::VIEW]);
        assert!(entry.grants(&ActionId::VIEW));
        assert!(!entry.grants(&ActionId::MANAGE));
    }

    #[test]
    fn test_missing_permissions_field_is_none() {
        let state: UserPermissions =
            serde_json::from_str(r#"{"user_id": 4, "is_super_admin": true}"#).unwrap();
        assert_eq!(state.user_id, 4);
        assert!(state.permissions.is_none());
        assert!(state.entries().is_empty());
    }

    #[test]
    fn test_non_list_permissions_field_is_none() {
        let state: UserPermissions =
            serde_json::from_str(r#"{"user_id": 4, "permissions": "manage_orders"}"#).unwrap();
        assert!(state.permissions.is_none());

        let state: UserPermissions =
            serde_json::from_str(r#"{"user_id": 4, "permissions": null}"#).unwrap();
        assert!(state.permissions.is_none());
    }

    #[test]
    fn test_structured_permissions_deserialize() {
        let json = r#"{
            "user_id": 9,
            "is_super_admin": false,
            "permissions": [{"module": "orders", "actions": ["view", "manage", "view"]}]
        }"#;
        let state: UserPermissions = serde_json::from_str(json).unwrap();
        let orders = state.permission_for(&ModuleId::ORDERS).unwrap();
        assert_eq!(orders.actions.len(), 2);
        assert!(orders.actions.contains(&ActionId::MANAGE));
    }

    #[test]
    fn test_duplicate_module_entries_are_merged() {
        let json = r#"{
            "user_id": 9,
            "permissions": [
                {"module": "orders", "actions": ["view"]},
                {"module": "blogs", "actions": []},
                {"module": "orders", "actions": ["manage"]}
            ]
        }"#;
        let state: UserPermissions = serde_json::from_str(json).unwrap();

        assert_eq!(state.entries().len(), 1);
        assert!(crate::permission::has_permission(
            Some(&state),
            &ModuleId::ORDERS,
            &ActionId::MANAGE
        ));

        let edited = crate::permission::toggle_action(
            state.entries(),
            &ModuleId::ORDERS,
            &ActionId::MANAGE,
        );
        assert_eq!(edited.len(), 1);
        assert_eq!(edited[0].actions.len(), 1);
        assert!(edited[0].actions.contains(&ActionId::VIEW));
    }

    #[test]
    fn test_tax_rate_defaults() {
        let rate: TaxRate = serde_json::from_str(
            r#"{"category_id": 1, "region_code": "ALL", "tax_percentage": 18}"#,
        )
        .unwrap();
        assert_eq!(rate.hsn_code, "");
        assert!(!rate.is_default);
        assert!((rate.tax_percentage - 18.0).abs() < f64::EPSILON);
    }
}
