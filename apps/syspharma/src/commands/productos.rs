//! # ProductosView Operations
//!
//! Inventory CRUD for admin and empleado.

use syspharma_core::{Producto, ProductoForm};
use syspharma_store::generate_id;
use tracing::{debug, info};

use crate::commands::Confirmation;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub async fn list(state: &AppState) -> AppResult<Vec<Producto>> {
    debug!("productos::list command");
    state.require_staff().await?;
    state.simulate_latency().await;

    Ok(state.storage().productos().list().await?)
}

pub async fn get(state: &AppState, id: &str) -> AppResult<Producto> {
    state
        .storage()
        .productos()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Producto", id))
}

/// Products at or below the configured low-stock threshold.
pub async fn bajo_stock(state: &AppState) -> AppResult<Vec<Producto>> {
    state.require_staff().await?;
    let threshold = state.config().inventory.low_stock_threshold;
    Ok(state.storage().productos().low_stock(threshold).await?)
}

fn from_form(id: String, form: &ProductoForm) -> Producto {
    Producto {
        id,
        codigo: form.codigo.trim().to_string(),
        nombre: form.nombre.trim().to_string(),
        descripcion: form.descripcion(),
        precio: form.precio,
        stock: form.stock,
        categoria: form.categoria.trim().to_string(),
        imagen: form.imagen(),
        mostrar_en_catalogo: Some(form.mostrar_en_catalogo),
    }
}

pub async fn crear(state: &AppState, form: ProductoForm) -> AppResult<Producto> {
    debug!(codigo = %form.codigo, "productos::crear command");
    let result = create(state, form).await;
    state.notify(result, "Producto creado")
}

async fn create(state: &AppState, form: ProductoForm) -> AppResult<Producto> {
    state.require_staff().await?;
    form.validate()?;

    let producto = state
        .storage()
        .productos()
        .insert(from_form(generate_id(), &form))
        .await?;
    state.changed();

    info!(id = %producto.id, codigo = %producto.codigo, "Producto created");
    Ok(producto)
}

/// Edits a product. `codigo` uniqueness is not re-checked.
pub async fn actualizar(state: &AppState, id: &str, form: ProductoForm) -> AppResult<Producto> {
    debug!(id = %id, "productos::actualizar command");
    let result = update(state, id, form).await;
    state.notify(result, "Producto actualizado")
}

async fn update(state: &AppState, id: &str, form: ProductoForm) -> AppResult<Producto> {
    state.require_staff().await?;
    form.validate()?;

    let producto = from_form(id.to_string(), &form);
    state.storage().productos().update(&producto).await?;
    state.changed();

    info!(id = %id, "Producto updated");
    Ok(producto)
}

pub async fn eliminar(state: &AppState, id: &str, confirmation: Confirmation) -> AppResult<()> {
    debug!(id = %id, ?confirmation, "productos::eliminar command");
    if !confirmation.is_accepted() {
        debug!(id = %id, "Delete cancelled");
        return Ok(());
    }

    let result = delete(state, id).await;
    state.notify(result, "Producto eliminado")
}

async fn delete(state: &AppState, id: &str) -> AppResult<()> {
    state.require_staff().await?;
    state.storage().productos().delete(id).await?;
    state.changed();

    info!(id = %id, "Producto deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::admin_tab;
    use syspharma_core::Money;
    use syspharma_store::SyncCounter;

    fn form(codigo: &str, stock: i64) -> ProductoForm {
        ProductoForm {
            codigo: codigo.to_string(),
            nombre: format!("Producto {}", codigo),
            descripcion: None,
            precio: Money::from_pesos(4_500),
            stock,
            categoria: "Analgésicos".to_string(),
            imagen: None,
            mostrar_en_catalogo: true,
        }
    }

    #[tokio::test]
    async fn test_duplicate_codigo_leaves_storage_untouched() {
        let (_app, state) = admin_tab().await;
        crear(&state, form("ACE-500", 10)).await.unwrap();
        let before = state.storage().get_item(syspharma_store::keys::PRODUCTOS).await.unwrap();

        let err = crear(&state, form("ace-500", 3)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Duplicate);

        let after = state.storage().get_item(syspharma_store::keys::PRODUCTOS).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_invalid_form_reports_fields() {
        let (_app, state) = admin_tab().await;
        let mut bad = form("", 1);
        bad.precio = Money::zero();

        let err = crear(&state, bad).await.unwrap_err();
        let fields = err.fields.unwrap();
        assert!(fields.get("codigo").is_some());
        assert!(fields.get("precio").is_some());
    }

    #[tokio::test]
    async fn test_update_keeps_codigo_unchecked() {
        let (_app, state) = admin_tab().await;
        crear(&state, form("ACE-500", 10)).await.unwrap();
        let ibu = crear(&state, form("IBU-400", 10)).await.unwrap();

        // Create-only check: editing onto an existing codigo is allowed.
        let updated = actualizar(&state, &ibu.id, form("ACE-500", 7)).await.unwrap();
        assert_eq!(updated.stock, 7);
        assert_eq!(get(&state, &ibu.id).await.unwrap().codigo, "ACE-500");
    }

    #[tokio::test]
    async fn test_every_write_triggers_update() {
        let (_app, state) = admin_tab().await;
        let mut counter = SyncCounter::new(state.subscribe());

        let p = crear(&state, form("ACE-500", 10)).await.unwrap();
        actualizar(&state, &p.id, form("ACE-500", 9)).await.unwrap();
        eliminar(&state, &p.id, Confirmation::Accepted).await.unwrap();

        assert_eq!(counter.poll(), 3);
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let (_app, state) = admin_tab().await;
        let err = eliminar(&state, "nope", Confirmation::Accepted).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_rejected_delete_changes_nothing() {
        let (_app, state) = admin_tab().await;
        let p = crear(&state, form("ACE-500", 10)).await.unwrap();
        state.toaster().drain();
        let mut counter = SyncCounter::new(state.subscribe());

        eliminar(&state, &p.id, Confirmation::Rejected).await.unwrap();

        assert_eq!(get(&state, &p.id).await.unwrap(), p);
        assert_eq!(counter.poll(), 0);
        assert!(state.toaster().is_empty());
    }

    #[tokio::test]
    async fn test_form_caps_huge_stock_and_precio() {
        let (_app, state) = admin_tab().await;
        let huge = ProductoForm {
            precio: Money::from_centavos(i64::MAX / 2),
            stock: i64::MAX,
            ..form("ACE-500", 0)
        };

        let err = crear(&state, huge).await.unwrap_err();
        let fields = err.fields.unwrap();
        assert!(fields.get("precio").is_some());
        assert!(fields.get("stock").is_some());
        assert_eq!(state.storage().productos().count().await.unwrap(), 0);
    }
}
