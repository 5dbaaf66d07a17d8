//! # Permission Backend
//!
//! The seam between the session layer and whatever transport reaches the
//! authorization service.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PermissionSession / PermissionEditor                                   │
//! │        │                                                                │
//! │        │  fetch_permissions(user_id)   → Vec<PermissionRow>             │
//! │        │  save_permissions(update)     → ()                             │
//! │        ▼                                                                │
//! │  PermissionBackend (trait)                                              │
//! │        ├── HTTP client in the web app                                   │
//! │        └── InMemoryBackend (dev fixtures, tests)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use mandi_core::{PermissionRow, PermissionUpdate};

use crate::error::{SessionError, SessionResult};

/// Access to the authorization backend.
#[async_trait]
pub trait PermissionBackend: Send + Sync {
    /// Fetches the raw permission list for `user_id`.
    async fn fetch_permissions(&self, user_id: i64) -> SessionResult<Vec<PermissionRow>>;

    /// Replaces the stored permission strings of `update.user_id`.
    async fn save_permissions(&self, update: &PermissionUpdate) -> SessionResult<()>;
}

#[derive(Debug, Clone, Default)]
struct StoredUser {
    is_super_admin: bool,
    permissions: Vec<String>,
}

/// Backend that keeps permission strings in memory.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    users: Mutex<HashMap<i64, StoredUser>>,
    offline: Mutex<bool>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a user with raw permission strings.
    pub async fn insert_user<I, S>(&self, user_id: i64, is_super_admin: bool, permissions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stored = StoredUser {
            is_super_admin,
            permissions: permissions.into_iter().map(Into::into).collect(),
        };
        self.users.lock().await.insert(user_id, stored);
    }

    /// Returns the raw strings currently stored for `user_id`.
    pub async fn stored_permissions(&self, user_id: i64) -> Option<Vec<String>> {
        self.users
            .lock()
            .await
            .get(&user_id)
            .map(|u| u.permissions.clone())
    }

    /// Makes every call fail with [`SessionError::Unavailable`].
    pub async fn set_offline(&self, offline: bool) {
        *self.offline.lock().await = offline;
    }

    async fn ensure_online(&self) -> SessionResult<()> {
        if *self.offline.lock().await {
            return Err(SessionError::Unavailable("in-memory backend is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PermissionBackend for InMemoryBackend {
    async fn fetch_permissions(&self, user_id: i64) -> SessionResult<Vec<PermissionRow>> {
        self.ensure_online().await?;

        let users = self.users.lock().await;
        let rows = users
            .get(&user_id)
            .map(|user| {
                user.permissions
                    .iter()
                    .map(|p| PermissionRow::new(user_id, user.is_super_admin, p.clone()))
                    .collect()
            })
            .unwrap_or_default();

        debug!(user_id, "Served permission rows from memory");
        Ok(rows)
    }

    async fn save_permissions(&self, update: &PermissionUpdate) -> SessionResult<()> {
        self.ensure_online().await?;

        let mut users = self.users.lock().await;
        let user = users.entry(update.user_id).or_default();
        user.permissions = update.permissions.clone();

        debug!(
            user_id = update.user_id,
            count = update.permissions.len(),
            "Stored permission strings in memory"
        );
        Ok(())
    }
}
