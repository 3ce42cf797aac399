//! # State Module
//!
//! Per-tab application state handed to every view operation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                        App (lib.rs)                             │   │
//! │  │  Database (pool + StorageHub)      Arc<AppConfig>               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │ open_tab()                               │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐                  │
//! │  │   AppState   │  │   AppState   │  │   AppState   │   one per tab    │
//! │  │              │  │              │  │              │                  │
//! │  │ LocalStorage │  │ LocalStorage │  │ LocalStorage │                  │
//! │  │ Toaster      │  │ Toaster      │  │ Toaster      │                  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘                  │
//! │                                                                         │
//! │  Tabs share the storage table and the cross-tab channel. Each tab has  │
//! │  its own same-tab channel and toast queue.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod navigation;

pub use cart::{Cart, CartTotals};
pub use navigation::{menu_for, Dashboard, MenuEntry, Tab};

use std::sync::Arc;
use syspharma_core::{Role, SessionUser};
use syspharma_store::{LocalStorage, Subscription};
use tracing::debug;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::toast::Toaster;

#[derive(Debug, Clone)]
pub struct AppState {
    storage: LocalStorage,
    config: Arc<AppConfig>,
    toaster: Toaster,
}

impl AppState {
    pub fn new(storage: LocalStorage, config: Arc<AppConfig>) -> Self {
        AppState {
            storage,
            config,
            toaster: Toaster::new(),
        }
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn toaster(&self) -> &Toaster {
        &self.toaster
    }

    /// Notifications for this tab: its own custom events plus storage
    /// events from every other tab.
    pub fn subscribe(&self) -> Subscription {
        self.storage.bus().subscribe()
    }

    /// Tells every view mounted in this tab to reload.
    pub fn changed(&self) {
        self.storage.bus().trigger_update();
    }

    /// Waits the configured load delay before a view lists its records.
    pub async fn simulate_latency(&self) {
        let delay = self.config.load_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Toasts the outcome of a view operation and passes it through.
    pub fn notify<T>(&self, result: AppResult<T>, success: &str) -> AppResult<T> {
        match &result {
            Ok(_) => self.toaster.success(success),
            Err(err) => self.toaster.report(err),
        }
        result
    }

    /// The logged-in user, or `FORBIDDEN` when nobody is.
    pub async fn session(&self) -> AppResult<SessionUser> {
        self.storage
            .session()
            .current()
            .await?
            .ok_or_else(AppError::unauthenticated)
    }

    /// The logged-in user, provided their role is one of `allowed`.
    pub async fn require_role(&self, allowed: &[Role]) -> AppResult<SessionUser> {
        let user = self.session().await?;
        if !allowed.contains(&user.role) {
            debug!(user = %user.id, role = %user.role, "Role not allowed");
            return Err(AppError::forbidden());
        }
        Ok(user)
    }

    pub async fn require_admin(&self) -> AppResult<SessionUser> {
        self.require_role(&[Role::Admin]).await
    }

    pub async fn require_staff(&self) -> AppResult<SessionUser> {
        self.require_role(&[Role::Admin, Role::Empleado]).await
    }
}
