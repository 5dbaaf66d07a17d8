//! # Permission Editor
//!
//! Backs the admin page that edits another user's permissions.
//!
//! ## Edit Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load(user) ──► baseline = draft = decode(GET)                          │
//! │                                                                         │
//! │  checkbox click ──► toggle(module, action)                              │
//! │                       draft = toggle_action(&draft, ...)  (new list)    │
//! │                                                                         │
//! │  Save ──► actor may manage users? ── no ──► Unauthorized                │
//! │             │ yes                                                       │
//! │             ▼                                                           │
//! │           PUT { user_id, encode(draft) }                                │
//! │             │                                                           │
//! │             ▼                                                           │
//! │           baseline = draft, then re-fetch if refresh_on_edit            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use mandi_core::permission::{has_permission, set_module_actions, toggle_action};
use mandi_core::wire::decode_rows;
use mandi_core::{ActionId, ModuleId, Permission, PermissionUpdate, UserPermissions};

use crate::backend::PermissionBackend;
use crate::config::PermissionSettings;
use crate::error::{SessionError, SessionResult};

/// Draft permission list for one target user.
pub struct PermissionEditor {
    backend: Arc<dyn PermissionBackend>,
    user_id: i64,
    refresh_on_edit: bool,
    baseline: Vec<Permission>,
    draft: Vec<Permission>,
}

impl PermissionEditor {
    /// Loads the current permissions of `user_id`.
    pub async fn load(
        backend: Arc<dyn PermissionBackend>,
        user_id: i64,
        settings: &PermissionSettings,
    ) -> SessionResult<Self> {
        let baseline = fetch_entries(backend.as_ref(), user_id).await?;
        debug!(user_id, modules = baseline.len(), "Loaded permissions for editing");

        Ok(PermissionEditor {
            backend,
            user_id,
            refresh_on_edit: settings.refresh_on_edit,
            draft: baseline.clone(),
            baseline,
        })
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// The list as currently edited.
    pub fn draft(&self) -> &[Permission] {
        &self.draft
    }

    /// The list as last loaded or saved.
    pub fn baseline(&self) -> &[Permission] {
        &self.baseline
    }

    /// Checks if the draft grants something different from the baseline,
    /// ignoring entry and action order.
    pub fn is_dirty(&self) -> bool {
        as_grants(&self.draft) != as_grants(&self.baseline)
    }

    /// Flips one checkbox.
    pub fn toggle(&mut self, module: &ModuleId, action: &ActionId) {
        self.draft = toggle_action(&self.draft, module, action);
    }

    /// Replaces all actions of a module ("grant all" / "revoke all").
    pub fn set_module<I>(&mut self, module: &ModuleId, actions: I)
    where
        I: IntoIterator<Item = ActionId>,
    {
        self.draft = set_module_actions(&self.draft, module, actions);
    }

    /// Discards unsaved edits.
    pub fn reset(&mut self) {
        self.draft = self.baseline.clone();
    }

    /// Persists the draft on behalf of `actor`.
    ///
    /// `actor` must be allowed to manage users. Once the backend accepts the
    /// update the draft becomes the baseline. With `refresh_on_edit` the list
    /// is then re-fetched; a failed re-fetch is logged and the saved draft is
    /// kept, since the update itself already went through.
    pub async fn save(
        &mut self,
        actor: Option<&UserPermissions>,
    ) -> SessionResult<&[Permission]> {
        if !has_permission(actor, &ModuleId::USERS, &ActionId::MANAGE) {
            return Err(SessionError::Unauthorized(format!(
                "editing permissions of user {} requires manage_users",
                self.user_id
            )));
        }

        let update = PermissionUpdate::new(self.user_id, &self.draft);
        self.backend.save_permissions(&update).await?;
        info!(
            user_id = self.user_id,
            actor = actor.map(|a| a.user_id),
            count = update.permissions.len(),
            "Permissions saved"
        );

        self.baseline = self.draft.clone();

        if self.refresh_on_edit {
            match fetch_entries(self.backend.as_ref(), self.user_id).await {
                Ok(stored) => {
                    self.baseline = stored;
                    self.draft = self.baseline.clone();
                }
                Err(e) => {
                    warn!(
                        user_id = self.user_id,
                        error = %e,
                        "Re-fetch after save failed, keeping saved draft"
                    );
                }
            }
        }

        Ok(&self.baseline)
    }
}

async fn fetch_entries(
    backend: &dyn PermissionBackend,
    user_id: i64,
) -> SessionResult<Vec<Permission>> {
    let rows = backend.fetch_permissions(user_id).await?;
    Ok(decode_rows(&rows).entries().to_vec())
}

fn as_grants(entries: &[Permission]) -> BTreeMap<&ModuleId, &BTreeSet<ActionId>> {
    entries
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| (&p.module, &p.actions))
        .collect()
}
