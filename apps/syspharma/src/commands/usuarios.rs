//! # UsuariosView Operations
//!
//! Admin-only account management. Listings never carry password hashes.

use syspharma_core::{SessionUser, User, UsuarioForm};
use syspharma_store::generate_id;
use tracing::{debug, info};

use crate::auth::hash_password;
use crate::commands::Confirmation;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub async fn list(state: &AppState) -> AppResult<Vec<SessionUser>> {
    debug!("usuarios::list command");
    state.require_admin().await?;
    state.simulate_latency().await;

    let users = state.storage().users().list().await?;
    Ok(users.iter().map(SessionUser::from).collect())
}

pub async fn crear(state: &AppState, form: UsuarioForm) -> AppResult<SessionUser> {
    debug!(email = %form.email, role = %form.role, "usuarios::crear command");
    let result = create(state, form).await;
    state.notify(result, "Usuario creado")
}

async fn create(state: &AppState, form: UsuarioForm) -> AppResult<SessionUser> {
    state.require_admin().await?;
    form.validate(true)?;

    let password = form
        .new_password()
        .ok_or_else(|| AppError::validation("La contraseña es obligatoria"))?;

    let user = User {
        id: generate_id(),
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone(),
        role: form.role,
        active: form.active,
        password: hash_password(password)?,
    };

    let user = state.storage().users().insert(user).await?;
    state.changed();

    info!(user = %user.id, role = %user.role, "User created");
    Ok(SessionUser::from(&user))
}

/// Edits a user. A blank password keeps the stored hash.
pub async fn actualizar(state: &AppState, id: &str, form: UsuarioForm) -> AppResult<SessionUser> {
    debug!(id = %id, "usuarios::actualizar command");
    let result = update(state, id, form).await;
    state.notify(result, "Usuario actualizado")
}

async fn update(state: &AppState, id: &str, form: UsuarioForm) -> AppResult<SessionUser> {
    let admin = state.require_admin().await?;
    form.validate(false)?;

    let users = state.storage().users();
    let mut user = users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Usuario", id))?;

    user.name = form.name.trim().to_string();
    user.email = form.email.trim().to_string();
    user.phone = form.phone();
    user.role = form.role;
    user.active = form.active;
    if let Some(password) = form.new_password() {
        user.password = hash_password(password)?;
    }

    users.update(&user).await?;

    // Editing yourself refreshes the session so the navbar follows.
    let session = SessionUser::from(&user);
    if admin.id == user.id {
        state.storage().session().set(&session).await?;
    }
    state.changed();

    info!(user = %user.id, "User updated");
    Ok(session)
}

pub async fn eliminar(state: &AppState, id: &str, confirmation: Confirmation) -> AppResult<()> {
    debug!(id = %id, ?confirmation, "usuarios::eliminar command");
    if !confirmation.is_accepted() {
        debug!(id = %id, "Delete cancelled");
        return Ok(());
    }

    let result = delete(state, id).await;
    state.notify(result, "Usuario eliminado")
}

async fn delete(state: &AppState, id: &str) -> AppResult<()> {
    let admin = state.require_admin().await?;
    if admin.id == id {
        return Err(AppError::validation("No puede eliminar su propia cuenta"));
    }

    state.storage().users().delete(id).await?;
    state.changed();

    info!(user = %id, "User deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::admin_tab;
    use syspharma_core::Role;

    fn form(email: &str, role: Role) -> UsuarioForm {
        UsuarioForm {
            name: "Carlos Ruiz".to_string(),
            email: email.to_string(),
            phone: None,
            role,
            active: true,
            password: Some("Empleado#1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_crear_and_list_without_passwords() {
        let (_app, state) = admin_tab().await;
        crear(&state, form("carlos@syspharma.com", Role::Empleado)).await.unwrap();

        let users = list(&state).await.unwrap();
        assert_eq!(users.len(), 2);
        let json = serde_json::to_string(&users).unwrap();
        assert!(!json.contains("password"));
    }

    #[tokio::test]
    async fn test_update_email_clash_with_other_user() {
        let (_app, state) = admin_tab().await;
        let carlos = crear(&state, form("carlos@syspharma.com", Role::Empleado)).await.unwrap();

        let err = actualizar(&state, &carlos.id, form("ADMIN@syspharma.com", Role::Empleado))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Duplicate);

        // Same email on the same user is fine.
        let mut same = form("carlos@syspharma.com", Role::Admin);
        same.password = None;
        let updated = actualizar(&state, &carlos.id, same).await.unwrap();
        assert_eq!(updated.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_rejected_confirmation_is_noop() {
        let (_app, state) = admin_tab().await;
        let carlos = crear(&state, form("carlos@syspharma.com", Role::Empleado)).await.unwrap();

        let before = state.storage().get_item(syspharma_store::keys::USERS).await.unwrap();
        state.toaster().drain();
        let mut view = state.subscribe();

        eliminar(&state, &carlos.id, Confirmation::Rejected).await.unwrap();
        assert_eq!(state.storage().get_item(syspharma_store::keys::USERS).await.unwrap(), before);
        assert!(state.toaster().is_empty());
        assert_eq!(view.try_next(), None);

        eliminar(&state, &carlos.id, Confirmation::Accepted).await.unwrap();
        assert_eq!(state.storage().users().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_self() {
        let (_app, state) = admin_tab().await;
        let me = state.session().await.unwrap();
        assert!(eliminar(&state, &me.id, Confirmation::Accepted).await.is_err());
    }
}
