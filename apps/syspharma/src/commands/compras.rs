//! # Compras Operations
//!
//! Purchases from suppliers. Registering one raises stock.
//!
//! ```text
//! registrar(proveedor, lineas)
//!     │
//!     ├── validate lineas
//!     ├── proveedor must exist ──► snapshot its nombre
//!     ├── each linea: producto gone? ──► skipped, warning toast
//!     ├── append Compra
//!     └── stock += cantidad for each remaining producto
//! ```

use chrono::Utc;
use serde::Deserialize;
use syspharma_core::{order_total, validate_lineas, Compra, CoreError, LineaForm, LineaOrden};
use syspharma_store::generate_id;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrarCompra {
    pub proveedor_id: String,
    pub productos: Vec<LineaForm>,
}

pub async fn list(state: &AppState) -> AppResult<Vec<Compra>> {
    debug!("compras::list command");
    state.require_admin().await?;
    state.simulate_latency().await;

    Ok(state.storage().compras().list().await?)
}

pub async fn registrar(state: &AppState, form: RegistrarCompra) -> AppResult<Compra> {
    debug!(proveedor = %form.proveedor_id, lineas = form.productos.len(), "compras::registrar command");
    let result = register(state, form).await;
    state.notify(result, "Compra registrada")
}

async fn register(state: &AppState, form: RegistrarCompra) -> AppResult<Compra> {
    state.require_admin().await?;
    validate_lineas(&form.productos)?;

    let storage = state.storage();
    let proveedor = storage
        .proveedores()
        .get_by_id(&form.proveedor_id)
        .await?
        .ok_or_else(|| AppError::not_found("Proveedor", &form.proveedor_id))?;

    let productos = storage.productos().list().await?;
    let mut lineas = Vec::with_capacity(form.productos.len());
    for linea in &form.productos {
        match productos.iter().find(|p| p.id == linea.producto_id) {
            Some(producto) => {
                let mut orden = LineaOrden::from_producto(producto, linea.cantidad);
                if let Some(costo) = linea.precio {
                    orden.precio = costo;
                }
                lineas.push(orden);
            }
            None => {
                warn!(producto = %linea.producto_id, "Skipping line for missing producto");
                state.toaster().warning(format!(
                    "Producto {} ya no existe, se omitió",
                    linea.producto_id
                ));
            }
        }
    }

    if lineas.is_empty() {
        return Err(CoreError::EmptyOrder.into());
    }

    let compra = Compra {
        id: generate_id(),
        fecha: Utc::now(),
        proveedor: proveedor.nombre.clone(),
        total: order_total(&lineas)?,
        productos: lineas,
    };

    let changes: Vec<(String, i64)> = compra
        .productos
        .iter()
        .map(|l| (l.id.clone(), l.cantidad))
        .collect();
    let missing = storage.productos().adjust_stock(&changes).await?;
    for id in &missing {
        warn!(producto = %id, "Producto removed before stock update");
    }

    let compra = storage.compras().insert(compra).await?;
    state.changed();

    info!(id = %compra.id, proveedor = %compra.proveedor, total = %compra.total, "Compra registered");
    Ok(compra)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{productos, proveedores};
    use crate::error::ErrorCode;
    use crate::test_support::admin_tab;
    use crate::toast::ToastKind;
    use syspharma_core::{Money, ProductoForm, ProveedorForm};

    async fn setup(state: &AppState) -> (String, String) {
        let proveedor = proveedores::crear(
            state,
            ProveedorForm {
                nombre: "Laboratorios Andinos".to_string(),
                nit: "800765432".to_string(),
                email: "pedidos@andinos.co".to_string(),
                telefono: "6017654321".to_string(),
                direccion: None,
            },
        )
        .await
        .unwrap();

        let producto = productos::crear(
            state,
            ProductoForm {
                codigo: "AMX-500".to_string(),
                nombre: "Amoxicilina 500mg".to_string(),
                descripcion: None,
                precio: Money::from_pesos(15_000),
                stock: 4,
                categoria: "Antibióticos".to_string(),
                imagen: None,
                mostrar_en_catalogo: false,
            },
        )
        .await
        .unwrap();

        (proveedor.id, producto.id)
    }

    fn linea(producto_id: &str, cantidad: i64) -> LineaForm {
        LineaForm {
            producto_id: producto_id.to_string(),
            cantidad,
            precio: Some(Money::from_pesos(9_000)),
        }
    }

    #[tokio::test]
    async fn test_registrar_increments_stock() {
        let (_app, state) = admin_tab().await;
        let (proveedor_id, producto_id) = setup(&state).await;

        let compra = registrar(
            &state,
            RegistrarCompra {
                proveedor_id,
                productos: vec![linea(&producto_id, 10)],
            },
        )
        .await
        .unwrap();

        assert_eq!(compra.proveedor, "Laboratorios Andinos");
        assert_eq!(compra.total, Money::from_pesos(90_000));
        assert_eq!(productos::get(&state, &producto_id).await.unwrap().stock, 14);
        assert_eq!(list(&state).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_producto_is_skipped_with_warning() {
        let (_app, state) = admin_tab().await;
        let (proveedor_id, producto_id) = setup(&state).await;
        state.toaster().drain();

        let compra = registrar(
            &state,
            RegistrarCompra {
                proveedor_id,
                productos: vec![linea(&producto_id, 1), linea("borrado", 5)],
            },
        )
        .await
        .unwrap();

        assert_eq!(compra.productos.len(), 1);
        let kinds: Vec<ToastKind> = state.toaster().drain().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![ToastKind::Warning, ToastKind::Success]);
    }

    #[tokio::test]
    async fn test_unknown_proveedor() {
        let (_app, state) = admin_tab().await;
        let (_, producto_id) = setup(&state).await;

        let err = registrar(
            &state,
            RegistrarCompra {
                proveedor_id: "nadie".to_string(),
                productos: vec![linea(&producto_id, 1)],
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(productos::get(&state, &producto_id).await.unwrap().stock, 4);
    }

    #[tokio::test]
    async fn test_stock_overflow_rejected_before_any_write() {
        let (_app, state) = admin_tab().await;
        let (proveedor_id, producto_id) = setup(&state).await;

        let repo = state.storage().productos();
        let mut producto = repo.get_by_id(&producto_id).await.unwrap().unwrap();
        producto.stock = i64::MAX;
        repo.update(&producto).await.unwrap();

        let err = registrar(
            &state,
            RegistrarCompra {
                proveedor_id,
                productos: vec![linea(&producto_id, 1)],
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(productos::get(&state, &producto_id).await.unwrap().stock, i64::MAX);
        assert!(list(&state).await.unwrap().is_empty());
    }
}
