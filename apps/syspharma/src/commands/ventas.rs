//! # Ventas Operations
//!
//! Counter sales registered by staff. Catalog checkouts also end here.
//!
//! Stock is checked against the freshly loaded inventory and then
//! decremented in one write; a line that would take stock below zero
//! fails the whole sale before anything is written.

use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use syspharma_core::{
    order_total, validate_lineas, validate_quantity, CoreError, LineaForm, LineaOrden, Producto,
    Venta,
};
use syspharma_store::generate_id;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrarVenta {
    /// Client user id, when the sale is tied to an account.
    #[serde(default)]
    pub cliente: Option<String>,
    pub productos: Vec<LineaForm>,
}

pub async fn list(state: &AppState) -> AppResult<Vec<Venta>> {
    debug!("ventas::list command");
    state.require_staff().await?;
    state.simulate_latency().await;

    Ok(state.storage().ventas().list().await?)
}

/// Purchases of the logged-in client.
pub async fn mis_compras(state: &AppState) -> AppResult<Vec<Venta>> {
    let user = state.session().await?;
    state.simulate_latency().await;

    Ok(state.storage().ventas().list_for_cliente(&user.id).await?)
}

pub async fn registrar(state: &AppState, form: RegistrarVenta) -> AppResult<Venta> {
    debug!(lineas = form.productos.len(), "ventas::registrar command");
    let result = register(state, form).await;
    state.notify(result, "Venta registrada")
}

async fn register(state: &AppState, form: RegistrarVenta) -> AppResult<Venta> {
    let vendedor = state.require_staff().await?;
    validate_lineas(&form.productos)?;

    let requested: Vec<(String, i64)> = form
        .productos
        .iter()
        .map(|l| (l.producto_id.clone(), l.cantidad))
        .collect();

    record_sale(state, form.cliente, &vendedor.id, &requested).await
}

/// Checks stock, decrements it and appends the Venta.
///
/// Lines repeating a product are checked against their combined quantity.
pub(crate) async fn record_sale(
    state: &AppState,
    cliente: Option<String>,
    vendedor: &str,
    requested: &[(String, i64)],
) -> AppResult<Venta> {
    if requested.is_empty() {
        return Err(CoreError::EmptyOrder.into());
    }

    let storage = state.storage();
    let productos = storage.productos().list().await?;
    let by_id: HashMap<&str, &Producto> = productos.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut totals: HashMap<&str, i64> = HashMap::new();
    let mut lineas = Vec::with_capacity(requested.len());
    for (id, cantidad) in requested {
        validate_quantity(*cantidad)?;
        let producto = by_id
            .get(id.as_str())
            .ok_or_else(|| AppError::not_found("Producto", id))?;

        let total = totals.entry(id.as_str()).or_insert(0);
        *total = total.saturating_add(*cantidad);
        if !producto.can_sell(*total) {
            return Err(CoreError::InsufficientStock {
                producto: producto.nombre.clone(),
                available: producto.stock,
                requested: *total,
            }
            .into());
        }

        lineas.push(LineaOrden::from_producto(producto, *cantidad));
    }

    let total = order_total(&lineas)?;

    let changes: Vec<(String, i64)> = requested
        .iter()
        .map(|(id, cantidad)| (id.clone(), -cantidad))
        .collect();
    storage.productos().adjust_stock(&changes).await?;

    let venta = Venta {
        id: generate_id(),
        fecha: Utc::now(),
        cliente,
        vendedor: vendedor.to_string(),
        total,
        productos: lineas,
    };
    let venta = storage.ventas().insert(venta).await?;
    state.changed();

    info!(id = %venta.id, total = %venta.total, lineas = venta.productos.len(), "Venta registered");
    Ok(venta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::productos;
    use crate::error::ErrorCode;
    use crate::test_support::admin_tab;
    use syspharma_core::{Money, ProductoForm};

    async fn producto(state: &AppState, codigo: &str, stock: i64) -> Producto {
        productos::crear(
            state,
            ProductoForm {
                codigo: codigo.to_string(),
                nombre: format!("Producto {}", codigo),
                descripcion: None,
                precio: Money::from_pesos(3_000),
                stock,
                categoria: "Vitaminas".to_string(),
                imagen: None,
                mostrar_en_catalogo: true,
            },
        )
        .await
        .unwrap()
    }

    fn linea(producto_id: &str, cantidad: i64) -> LineaForm {
        LineaForm {
            producto_id: producto_id.to_string(),
            cantidad,
            precio: None,
        }
    }

    #[tokio::test]
    async fn test_registrar_decrements_stock() {
        let (_app, state) = admin_tab().await;
        let p = producto(&state, "VIT-C", 10).await;

        let venta = registrar(
            &state,
            RegistrarVenta {
                cliente: None,
                productos: vec![linea(&p.id, 3)],
            },
        )
        .await
        .unwrap();

        assert_eq!(venta.total, Money::from_pesos(9_000));
        assert_eq!(productos::get(&state, &p.id).await.unwrap().stock, 7);
    }

    #[tokio::test]
    async fn test_insufficient_stock_writes_nothing() {
        let (_app, state) = admin_tab().await;
        let a = producto(&state, "A", 10).await;
        let b = producto(&state, "B", 1).await;

        let err = registrar(
            &state,
            RegistrarVenta {
                cliente: None,
                productos: vec![linea(&a.id, 2), linea(&b.id, 2)],
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(productos::get(&state, &a.id).await.unwrap().stock, 10);
        assert_eq!(state.storage().ventas().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_repeated_lines_checked_together() {
        let (_app, state) = admin_tab().await;
        let p = producto(&state, "A", 3).await;

        let err = registrar(
            &state,
            RegistrarVenta {
                cliente: None,
                productos: vec![linea(&p.id, 2), linea(&p.id, 2)],
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }

    #[tokio::test]
    async fn test_empty_sale_rejected() {
        let (_app, state) = admin_tab().await;
        let err = registrar(
            &state,
            RegistrarVenta {
                cliente: None,
                productos: vec![],
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_total_overflow_rejected_before_any_write() {
        let (_app, state) = admin_tab().await;
        let p = producto(&state, "A", 10).await;

        let repo = state.storage().productos();
        let mut stored = repo.get_by_id(&p.id).await.unwrap().unwrap();
        stored.precio = Money::from_pesos(i64::MAX / 200);
        repo.update(&stored).await.unwrap();

        let err = registrar(
            &state,
            RegistrarVenta {
                cliente: None,
                productos: vec![linea(&p.id, 3)],
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(productos::get(&state, &p.id).await.unwrap().stock, 10);
        assert_eq!(state.storage().ventas().count().await.unwrap(), 0);
    }
}
