//! # Session Repository
//!
//! The logged-in user under `syspharma_current_user`: a single object, not an
//! array, and never carrying a password.

use syspharma_core::SessionUser;
use tracing::debug;

use crate::error::StoreResult;
use crate::keys;
use crate::storage::LocalStorage;

#[derive(Debug, Clone)]
pub struct SessionRepository {
    storage: LocalStorage,
}

impl SessionRepository {
    pub fn new(storage: LocalStorage) -> Self {
        SessionRepository { storage }
    }

    pub async fn current(&self) -> StoreResult<Option<SessionUser>> {
        self.storage.read_json(keys::CURRENT_USER).await
    }

    pub async fn set(&self, user: &SessionUser) -> StoreResult<()> {
        debug!(user_id = %user.id, role = %user.role, "Session started");
        self.storage.write_json(keys::CURRENT_USER, user).await
    }

    pub async fn clear(&self) -> StoreResult<()> {
        debug!("Session cleared");
        self.storage.remove_item(keys::CURRENT_USER).await
    }
}
