//! # SysPharma Application
//!
//! The view operations behind the admin, empleado and cliente dashboards.
//!
//! ## Module Organization
//! ```text
//! syspharma/
//! ├── lib.rs          ◄─── You are here (App, logging)
//! ├── config.rs       ◄─── AppConfig (defaults, TOML, env)
//! ├── error.rs        ◄─── AppError / ErrorCode
//! ├── toast.rs        ◄─── Toaster queue
//! ├── auth.rs         ◄─── argon2 hashing
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState (per tab), session and role checks
//! │   ├── cart.rs     ◄─── Cart rules
//! │   └── navigation.rs ◄─ Sidebar menus, Dashboard tab
//! └── commands/       ◄─── One module per view
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()            RUST_LOG or info,syspharma=debug          │
//! │  2. AppConfig::load()         defaults ◄ syspharma.toml ◄ SYSPHARMA_*   │
//! │  3. App::new(config)          SQLite pool, migrations, StorageHub       │
//! │  4. ensure_default_admin()    first boot only                           │
//! │  5. app.open_tab()            one AppState per dashboard tab            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod state;
pub mod toast;

use std::sync::Arc;
use syspharma_core::{Role, User};
use syspharma_store::{generate_id, Database};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub use commands::dashboard::DashboardStats;
pub use config::AppConfig;
pub use error::{AppError, AppResult, ErrorCode};
pub use state::AppState;
pub use toast::{Toast, ToastKind, Toaster};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=syspharma_store=trace` - Trace the storage layer only
/// - Default: info, debug for syspharma crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,syspharma=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// The running application: shared storage plus configuration.
#[derive(Debug, Clone)]
pub struct App {
    db: Database,
    config: Arc<AppConfig>,
}

impl App {
    /// Opens storage and runs migrations.
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        let store_config = config.store_config();

        if !store_config.is_in_memory() {
            if let Some(parent) = store_config.database_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    warn!(?parent, "Could not create data directory: {}", e);
                    AppError::internal("No se pudo crear el directorio de datos")
                })?;
            }
        }

        info!(path = ?store_config.database_path, "Opening local storage");
        let db = Database::new(store_config).await?;

        Ok(App {
            db,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// A new browsing context: its own same-tab events and toasts, shared
    /// storage with every other tab.
    pub fn open_tab(&self) -> AppState {
        AppState::new(self.db.open_tab(), Arc::clone(&self.config))
    }

    /// Creates the configured admin account when no admin exists.
    ///
    /// Returns true if an account was created.
    pub async fn ensure_default_admin(&self) -> AppResult<bool> {
        let users = self.db.open_tab().users();
        if users.list().await?.iter().any(|u| u.role == Role::Admin) {
            return Ok(false);
        }

        let settings = &self.config.admin;
        let admin = User {
            id: generate_id(),
            name: settings.name.clone(),
            email: settings.email.clone(),
            phone: None,
            role: Role::Admin,
            active: true,
            password: auth::hash_password(&settings.password)?,
        };
        users.insert(admin).await?;

        info!(email = %settings.email, "Default admin created");
        Ok(true)
    }

    pub async fn close(&self) {
        self.db.close().await;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::commands::auth;
    use syspharma_core::RegisterForm;

    pub const CLIENTE_PASSWORD: &str = "Cliente#2024";

    /// Fresh in-memory app with the default admin logged in.
    pub async fn admin_tab() -> (App, AppState) {
        let app = App::new(AppConfig::in_memory()).await.unwrap();
        app.ensure_default_admin().await.unwrap();

        let state = app.open_tab();
        login_admin(&state).await;
        (app, state)
    }

    pub async fn login_admin(state: &AppState) {
        let admin = state.config().admin.clone();
        auth::login(state, &admin.email, &admin.password).await.unwrap();
    }

    /// Opens a tab and logs in as a cliente, registering it first if needed.
    ///
    /// The session key is shared, so this logs every other tab in as well.
    pub async fn cliente_tab(app: &App, email: &str) -> AppState {
        let state = app.open_tab();

        let exists = state.storage().users().find_by_email(email).await.unwrap();
        if exists.is_none() {
            auth::register(
                &state,
                RegisterForm {
                    name: format!("Cliente {}", email),
                    email: email.to_string(),
                    phone: None,
                    password: CLIENTE_PASSWORD.to_string(),
                    confirm_password: CLIENTE_PASSWORD.to_string(),
                },
            )
            .await
            .unwrap();
        }

        auth::login(&state, email, CLIENTE_PASSWORD).await.unwrap();
        state
    }
}
