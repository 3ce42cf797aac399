//! # ProveedoresView Operations
//!
//! Supplier CRUD, admin only. NIT is unique on create and edit.

use syspharma_core::{Proveedor, ProveedorForm};
use syspharma_store::generate_id;
use tracing::{debug, info};

use crate::commands::Confirmation;
use crate::error::AppResult;
use crate::state::AppState;

pub async fn list(state: &AppState) -> AppResult<Vec<Proveedor>> {
    debug!("proveedores::list command");
    state.require_admin().await?;
    state.simulate_latency().await;

    Ok(state.storage().proveedores().list().await?)
}

fn from_form(id: String, form: &ProveedorForm) -> Proveedor {
    Proveedor {
        id,
        nombre: form.nombre.trim().to_string(),
        nit: form.nit.trim().to_string(),
        email: form.email.trim().to_string(),
        telefono: form.telefono.trim().to_string(),
        direccion: form.direccion(),
    }
}

pub async fn crear(state: &AppState, form: ProveedorForm) -> AppResult<Proveedor> {
    debug!(nit = %form.nit, "proveedores::crear command");
    let result = create(state, form).await;
    state.notify(result, "Proveedor creado")
}

async fn create(state: &AppState, form: ProveedorForm) -> AppResult<Proveedor> {
    state.require_admin().await?;
    form.validate()?;

    let proveedor = state
        .storage()
        .proveedores()
        .insert(from_form(generate_id(), &form))
        .await?;
    state.changed();

    info!(id = %proveedor.id, nit = %proveedor.nit, "Proveedor created");
    Ok(proveedor)
}

pub async fn actualizar(state: &AppState, id: &str, form: ProveedorForm) -> AppResult<Proveedor> {
    debug!(id = %id, "proveedores::actualizar command");
    let result = update(state, id, form).await;
    state.notify(result, "Proveedor actualizado")
}

async fn update(state: &AppState, id: &str, form: ProveedorForm) -> AppResult<Proveedor> {
    state.require_admin().await?;
    form.validate()?;

    let proveedor = from_form(id.to_string(), &form);
    state.storage().proveedores().update(&proveedor).await?;
    state.changed();

    info!(id = %id, "Proveedor updated");
    Ok(proveedor)
}

pub async fn eliminar(state: &AppState, id: &str, confirmation: Confirmation) -> AppResult<()> {
    debug!(id = %id, ?confirmation, "proveedores::eliminar command");
    if !confirmation.is_accepted() {
        debug!(id = %id, "Delete cancelled");
        return Ok(());
    }

    let result = delete(state, id).await;
    state.notify(result, "Proveedor eliminado")
}

async fn delete(state: &AppState, id: &str) -> AppResult<()> {
    state.require_admin().await?;
    state.storage().proveedores().delete(id).await?;
    state.changed();

    info!(id = %id, "Proveedor deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::admin_tab;

    fn form(nit: &str) -> ProveedorForm {
        ProveedorForm {
            nombre: "Droguería Central".to_string(),
            nit: nit.to_string(),
            email: "ventas@central.co".to_string(),
            telefono: "6014567890".to_string(),
            direccion: Some("Calle 10 # 5-20".to_string()),
        }
    }

    #[tokio::test]
    async fn test_duplicate_nit_rejected_without_write() {
        let (_app, state) = admin_tab().await;
        crear(&state, form("900123456")).await.unwrap();

        let err = crear(&state, form(" 900123456 ")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Duplicate);
        assert_eq!(state.storage().proveedores().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bad_nit_is_a_field_error() {
        let (_app, state) = admin_tab().await;
        let err = crear(&state, form("12-34")).await.unwrap_err();
        assert!(err.fields.unwrap().get("nit").is_some());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (_app, state) = admin_tab().await;
        let p = crear(&state, form("900123456")).await.unwrap();

        let mut edited = form("900123456");
        edited.nombre = "Droguería Norte".to_string();
        actualizar(&state, &p.id, edited).await.unwrap();
        assert_eq!(list(&state).await.unwrap()[0].nombre, "Droguería Norte");

        eliminar(&state, &p.id, Confirmation::Accepted).await.unwrap();
        assert!(list(&state).await.unwrap().is_empty());
    }
}
