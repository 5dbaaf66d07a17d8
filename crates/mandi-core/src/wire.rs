//! # Wire Payloads
//!
//! Shapes exchanged with the authorization backend.
//!
//! ## Payloads
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET  /permissions/{user_id}                                            │
//! │  ◄─── [ { "permission": "manage_blogs", "user_id": 7,                  │
//! │           "is_super_admin": false },                                    │
//! │         { "permission": "view_orders",  "user_id": 7, ... } ]          │
//! │                                                                         │
//! │       user_id / is_super_admin are repeated on every element;           │
//! │       only the first element is read.                                   │
//! │                                                                         │
//! │  PUT  /permissions                                                      │
//! │  ───► { "user_id": 7, "permissions": ["manage_blogs", "view_orders"] }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::permission::{decode, encode};
use crate::types::{Permission, UserPermissions};

// =============================================================================
// Inbound
// =============================================================================

/// One element of the permission list returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PermissionRow {
    /// Raw `"<action>_<module>"` string.
    #[serde(alias = "permission_name")]
    pub permission: String,

    #[serde(default)]
    pub user_id: i64,

    /// Some backends send `0`/`1` here.
    #[serde(default, deserialize_with = "flag")]
    pub is_super_admin: bool,
}

impl PermissionRow {
    pub fn new(user_id: i64, is_super_admin: bool, permission: impl Into<String>) -> Self {
        PermissionRow {
            permission: permission.into(),
            user_id,
            is_super_admin,
        }
    }
}

/// Decodes a backend permission list.
///
/// `user_id` and `is_super_admin` come from the first row; an empty list
/// yields user `0`, not a super admin, no entries.
pub fn decode_rows(rows: &[PermissionRow]) -> UserPermissions {
    let (user_id, is_super_admin) = rows
        .first()
        .map(|row| (row.user_id, row.is_super_admin))
        .unwrap_or((0, false));

    decode(
        user_id,
        is_super_admin,
        rows.iter().map(|row| row.permission.as_str()),
    )
}

/// Accepts `true`/`false`, `0`/`1`, and `"true"`/`"1"`. Anything else is
/// `false`.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_i64() == Some(1),
        serde_json::Value::String(s) => s == "true" || s == "1",
        _ => false,
    })
}

// =============================================================================
// Outbound
// =============================================================================

/// Body of the save request for an edited permission list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PermissionUpdate {
    pub user_id: i64,
    pub permissions: Vec<String>,
}

impl PermissionUpdate {
    /// Encodes `permissions` for `user_id`.
    pub fn new(user_id: i64, permissions: &[Permission]) -> Self {
        PermissionUpdate {
            user_id,
            permissions: encode(permissions),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::has_permission;
    use crate::types::{ActionId, ModuleId};

    #[test]
    fn test_decode_backend_payload() {
        let json = r#"[
            {"permission": "manage_tax_rates", "user_id": 12, "is_super_admin": false},
            {"permission": "view_blogs", "user_id": 12, "is_super_admin": false},
            {"permission": "broken", "user_id": 12, "is_super_admin": false}
        ]"#;
        let rows: Vec<PermissionRow> = serde_json::from_str(json).unwrap();
        let state = decode_rows(&rows);

        assert_eq!(state.user_id, 12);
        assert!(!state.is_super_admin);
        assert_eq!(state.entries().len(), 2);
        assert!(has_permission(Some(&state), &ModuleId::TAX_RATES, &ActionId::VIEW));
    }

    #[test]
    fn test_first_row_carries_principal() {
        let rows = vec![
            PermissionRow::new(5, true, "view_orders"),
            PermissionRow::new(6, false, "view_users"),
        ];
        let state = decode_rows(&rows);
        assert_eq!(state.user_id, 5);
        assert!(state.is_super_admin);
    }

    #[test]
    fn test_empty_payload_defaults() {
        let state = decode_rows(&[]);
        assert_eq!(state.user_id, 0);
        assert!(!state.is_super_admin);
        assert_eq!(state.permissions, Some(Vec::new()));
    }

    #[test]
    fn test_numeric_super_admin_flag_and_alias() {
        let json = r#"[{"permission_name": "view_orders", "user_id": 2, "is_super_admin": 1}]"#;
        let rows: Vec<PermissionRow> = serde_json::from_str(json).unwrap();
        assert!(rows[0].is_super_admin);
        assert_eq!(rows[0].permission, "view_orders");

        let json = r#"[{"permission": "view_orders", "is_super_admin": "no"}]"#;
        let rows: Vec<PermissionRow> = serde_json::from_str(json).unwrap();
        assert!(!rows[0].is_super_admin);
        assert_eq!(rows[0].user_id, 0);
    }

    #[test]
    fn test_update_body() {
        let permissions = vec![Permission::new(
            ModuleId::ORDERS,
            [ActionId::MANAGE, ActionId::VIEW],
        )];
        let body = PermissionUpdate::new(7, &permissions);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "user_id": 7,
                "permissions": ["manage_orders", "view_orders"]
            })
        );
    }
}
