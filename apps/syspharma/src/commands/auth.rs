//! # Auth Operations
//!
//! ## Login Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login(email, password)                                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  find_by_email ──── none ─────────────┐                                │
//! │         │                             │                                 │
//! │         ▼                             ▼                                 │
//! │  verify_password ── mismatch ──► "Credenciales inválidas"              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  active? ── no ──► "Usuario inactivo"                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  syspharma_current_user = SessionUser (no password)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use syspharma_core::{RegisterForm, Role, SessionUser, User};
use syspharma_store::generate_id;
use tracing::{debug, info, warn};

use crate::auth::{check_password, hash_password, PasswordMatch};
use crate::error::{AppError, AppResult, ErrorCode};
use crate::state::AppState;

/// Self sign-up. New accounts are active clientes.
///
/// Does not log the user in.
pub async fn register(state: &AppState, form: RegisterForm) -> AppResult<SessionUser> {
    debug!(email = %form.email, "register command");
    let result = create_account(state, form).await;
    state.notify(result, "Registro exitoso. Ya puede iniciar sesión")
}

async fn create_account(state: &AppState, form: RegisterForm) -> AppResult<SessionUser> {
    form.validate()?;

    let user = User {
        id: generate_id(),
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone(),
        role: Role::Cliente,
        active: true,
        password: hash_password(&form.password)?,
    };

    let user = state.storage().users().insert(user).await?;
    state.changed();

    info!(user = %user.id, "User registered");
    Ok(SessionUser::from(&user))
}

pub async fn login(state: &AppState, email: &str, password: &str) -> AppResult<SessionUser> {
    debug!(email = %email, "login command");

    let result = authenticate(state, email, password).await;
    let message = match &result {
        Ok(user) => format!("Bienvenido, {}", user.name),
        Err(_) => String::new(),
    };
    state.notify(result, &message)
}

async fn authenticate(state: &AppState, email: &str, password: &str) -> AppResult<SessionUser> {
    let mut user = state
        .storage()
        .users()
        .find_by_email(email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    let matched = check_password(password, &user.password);
    if matched == PasswordMatch::Mismatch {
        warn!(email = %email, "Login rejected");
        return Err(AppError::invalid_credentials());
    }

    if !user.active {
        warn!(user = %user.id, "Inactive user tried to log in");
        return Err(AppError::new(ErrorCode::AuthFailed, "Usuario inactivo"));
    }

    if matched == PasswordMatch::Plaintext {
        user.password = hash_password(password)?;
        state.storage().users().update(&user).await?;
        info!(user = %user.id, "Clear-text password rehashed");
    }

    let session = SessionUser::from(&user);
    state.storage().session().set(&session).await?;
    state.changed();

    info!(user = %session.id, role = %session.role, "Logged in");
    Ok(session)
}

pub async fn logout(state: &AppState) -> AppResult<()> {
    debug!("logout command");

    state.storage().session().clear().await?;
    state.changed();

    info!("Logged out");
    state.toaster().info("Sesión cerrada");
    Ok(())
}

pub async fn current_user(state: &AppState) -> AppResult<Option<SessionUser>> {
    Ok(state.storage().session().current().await?)
}
