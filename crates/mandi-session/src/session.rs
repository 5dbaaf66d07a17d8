//! # Permission Session
//!
//! Holds the signed-in principal's latest permission snapshot.
//!
//! ## Snapshot Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login / explicit refresh / permission page load                        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  refresh(user_id) ──► backend.fetch_permissions ──► decode_rows         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  RwLock<Option<Snapshot>>  ← replaced wholesale, never edited           │
//! │        │                                                                │
//! │        ├──► snapshot() → Arc<UserPermissions> → has_permission(...)    │
//! │        └──► can(module, action) (reads the snapshot once)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session is an owned value handed to whoever needs it, not a global.
//! Predicates stay in mandi-core and receive the snapshot explicitly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use mandi_core::permission::{has_module_access, has_permission, parse_token};
use mandi_core::wire::decode_rows;
use mandi_core::{ActionId, ModuleId, UserPermissions};

use crate::backend::PermissionBackend;
use crate::error::SessionResult;

#[derive(Debug, Clone)]
struct Snapshot {
    permissions: Arc<UserPermissions>,
    fetched_at: DateTime<Utc>,
}

/// The signed-in principal's permission state.
pub struct PermissionSession {
    backend: Arc<dyn PermissionBackend>,
    current: RwLock<Option<Snapshot>>,
}

impl PermissionSession {
    /// Creates a session with no snapshot. Every query answers `false`
    /// until [`PermissionSession::refresh`] succeeds.
    pub fn new(backend: Arc<dyn PermissionBackend>) -> Self {
        PermissionSession {
            backend,
            current: RwLock::new(None),
        }
    }

    /// Fetches and decodes a fresh snapshot for `user_id`, replacing the
    /// current one.
    ///
    /// On failure the previous snapshot is kept.
    pub async fn refresh(&self, user_id: i64) -> SessionResult<Arc<UserPermissions>> {
        let rows = match self.backend.fetch_permissions(user_id).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(user_id, error = %e, "Permission refresh failed, keeping previous snapshot");
                return Err(e);
            }
        };

        let malformed = rows
            .iter()
            .filter(|row| parse_token(&row.permission).is_none())
            .count();
        if malformed > 0 {
            debug!(user_id, malformed, "Dropped malformed permission tokens");
        }

        let mut decoded = decode_rows(&rows);
        if rows.is_empty() {
            // no row to read the principal from
            decoded.user_id = user_id;
        }

        let permissions = Arc::new(decoded);
        info!(
            user_id,
            modules = permissions.entries().len(),
            super_admin = permissions.is_super_admin,
            "Permission snapshot refreshed"
        );

        *self.current.write().await = Some(Snapshot {
            permissions: Arc::clone(&permissions),
            fetched_at: Utc::now(),
        });

        Ok(permissions)
    }

    /// Returns the current snapshot, if any.
    pub async fn snapshot(&self) -> Option<Arc<UserPermissions>> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|s| Arc::clone(&s.permissions))
    }

    /// When the current snapshot was fetched.
    pub async fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.current.read().await.as_ref().map(|s| s.fetched_at)
    }

    /// Checks `action` on `module` against the current snapshot.
    pub async fn can(&self, module: &ModuleId, action: &ActionId) -> bool {
        let snapshot = self.snapshot().await;
        has_permission(snapshot.as_deref(), module, action)
    }

    /// Checks whether `module` should appear in navigation.
    pub async fn can_access(&self, module: &ModuleId) -> bool {
        let snapshot = self.snapshot().await;
        has_module_access(snapshot.as_deref(), module)
    }

    /// Drops the snapshot (logout).
    pub async fn clear(&self) {
        if self.current.write().await.take().is_some() {
            info!("Permission snapshot cleared");
        }
    }
}
