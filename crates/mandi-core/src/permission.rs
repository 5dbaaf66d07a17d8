//! # Permission Engine
//!
//! Decodes flat permission strings into module → actions entries, answers
//! authorization queries, and edits/re-encodes permission lists.
//!
//! ## Wire Encoding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "manage_tax_rates"                                                     │
//! │   ──────┬─────────                                                      │
//! │         │ split at the FIRST '_'                                        │
//! │         ▼                                                               │
//! │   action = "manage"      module = "tax_rates"  (inner '_' preserved)    │
//! │                                                                         │
//! │  "garbage"  → no '_'  → dropped                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Authorization Order
//! ```text
//! has_permission(state, module, action)
//!      │
//!      ├── state missing?              → false
//!      ├── permissions list missing?   → false
//!      ├── super admin?                → true
//!      ├── no entry for module?        → false
//!      └── entry has action or manage? → true / false
//! ```
//!
//! Every function here is total and side-effect free. Edits return a new
//! list; the caller decides when to persist it.
//!
//! ## Usage
//! ```rust
//! use mandi_core::permission::{decode, has_permission};
//! use mandi_core::{ActionId, ModuleId};
//!
//! let state = decode(7, false, ["manage_orders", "view_blogs"]);
//! assert!(has_permission(Some(&state), &ModuleId::ORDERS, &ActionId::VIEW));
//! assert!(!has_permission(Some(&state), &ModuleId::BLOGS, &ActionId::MANAGE));
//! ```

use crate::types::{ActionId, ModuleId, Permission, UserPermissions};

/// Separator between action and module in a permission string.
pub const TOKEN_SEPARATOR: char = '_';

// =============================================================================
// Decode / Encode
// =============================================================================

/// Splits a raw permission string into its action and module.
///
/// Only the first separator splits, so `manage_tax_rates` is
/// `(manage, tax_rates)`.
///
/// Returns `None` for tokens without a separator. This is stricter than a
/// bare separator check: `"_orders"` and `"view_"`, with an empty action or
/// module, are rejected too.
pub fn parse_token(token: &str) -> Option<(ActionId, ModuleId)> {
    let (action, module) = token.split_once(TOKEN_SEPARATOR)?;
    if action.is_empty() || module.is_empty() {
        return None;
    }
    Some((ActionId::new(action), ModuleId::new(module)))
}

/// Formats one `(module, action)` pair as a raw permission string.
pub fn format_token(module: &ModuleId, action: &ActionId) -> String {
    format!("{}{}{}", action, TOKEN_SEPARATOR, module)
}

/// Decodes raw permission strings into a snapshot.
///
/// Entries keep the order in which their module first appeared; actions are
/// deduplicated. Malformed tokens are skipped.
pub fn decode<I, S>(user_id: i64, is_super_admin: bool, tokens: I) -> UserPermissions
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut entries: Vec<Permission> = Vec::new();

    for token in tokens {
        let Some((action, module)) = parse_token(token.as_ref()) else {
            continue;
        };
        match entries.iter_mut().find(|p| p.module == module) {
            Some(entry) => {
                entry.actions.insert(action);
            }
            None => entries.push(Permission::new(module, [action])),
        }
    }

    UserPermissions::new(user_id, is_super_admin, entries)
}

/// Encodes entries back into raw permission strings.
///
/// This is the body sent to the backend when an edit is saved.
pub fn encode(permissions: &[Permission]) -> Vec<String> {
    permissions
        .iter()
        .flat_map(|entry| {
            entry
                .actions
                .iter()
                .map(move |action| format_token(&entry.module, action))
        })
        .collect()
}

/// Merges duplicate module entries and drops empty ones.
///
/// Structured lists coming from JSON are not guaranteed to respect the
/// one-entry-per-module rule; decode output always does.
pub fn normalize(permissions: &[Permission]) -> Vec<Permission> {
    let mut merged: Vec<Permission> = Vec::with_capacity(permissions.len());

    for entry in permissions.iter().filter(|p| !p.is_empty()) {
        match merged.iter_mut().find(|p| p.module == entry.module) {
            Some(existing) => existing.actions.extend(entry.actions.iter().cloned()),
            None => merged.push(entry.clone()),
        }
    }

    merged
}

// =============================================================================
// Authorization Predicates
// =============================================================================

/// Checks whether the principal may perform `action` on `module`.
pub fn has_permission(
    state: Option<&UserPermissions>,
    module: &ModuleId,
    action: &ActionId,
) -> bool {
    let Some(state) = state else {
        return false;
    };
    let Some(entries) = state.permissions.as_deref() else {
        return false;
    };
    if state.is_super_admin {
        return true;
    }

    entries
        .iter()
        .find(|p| &p.module == module)
        .is_some_and(|entry| entry.grants(action))
}

/// Checks whether the principal has any grant at all on `module`.
///
/// Used to decide whether a navigation entry is shown.
pub fn has_module_access(state: Option<&UserPermissions>, module: &ModuleId) -> bool {
    let Some(state) = state else {
        return false;
    };
    let Some(entries) = state.permissions.as_deref() else {
        return false;
    };

    state.is_super_admin || entries.iter().any(|p| &p.module == module)
}

/// Checks whether any of the `(module, action)` pairs is granted.
///
/// An empty slice grants nothing.
pub fn has_any_permission(
    state: Option<&UserPermissions>,
    required: &[(ModuleId, ActionId)],
) -> bool {
    required
        .iter()
        .any(|(module, action)| has_permission(state, module, action))
}

// =============================================================================
// Editing
// =============================================================================

/// Flips one action on one module and returns the edited list.
///
/// ## Behavior
/// ```text
/// no entry for module        → append { module, [action] }
/// entry without action       → add action
/// entry with action          → remove action
///   └── entry now empty      → remove entry
/// ```
pub fn toggle_action(
    current: &[Permission],
    module: &ModuleId,
    action: &ActionId,
) -> Vec<Permission> {
    let mut next = current.to_vec();

    match next.iter().position(|p| &p.module == module) {
        None => next.push(Permission::new(module.clone(), [action.clone()])),
        Some(index) => {
            let entry = &mut next[index];
            if !entry.actions.remove(action) {
                entry.actions.insert(action.clone());
            } else if entry.is_empty() {
                next.remove(index);
            }
        }
    }

    next
}

/// Replaces the actions of one module and returns the edited list.
///
/// An empty `actions` removes the module entry; a module without an entry is
/// appended.
pub fn set_module_actions<I>(
    current: &[Permission],
    module: &ModuleId,
    actions: I,
) -> Vec<Permission>
where
    I: IntoIterator<Item = ActionId>,
{
    let replacement = Permission::new(module.clone(), actions);
    let mut next = current.to_vec();

    match next.iter().position(|p| &p.module == module) {
        Some(index) if replacement.is_empty() => {
            next.remove(index);
        }
        Some(index) => next[index] = replacement,
        None if replacement.is_empty() => {}
        None => next.push(replacement),
    }

    next
}

// =============================================================================
// Unit Tests
// =============================================================================
