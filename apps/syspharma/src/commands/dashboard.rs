//! # Dashboard Stats
//!
//! Numbers for the Inicio tab of admin and empleado.

use chrono::{Duration, Utc};
use serde::Serialize;
use syspharma_core::{EstadoCita, Money, Producto};
use tracing::debug;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub usuarios: usize,
    pub productos: usize,
    pub proveedores: usize,
    pub compras: usize,
    pub ventas: usize,
    pub citas_pendientes: usize,
    /// Products at or below the configured threshold.
    pub bajo_stock: Vec<Producto>,
    pub total_ventas: Money,
    /// Sales of the last 30 days.
    pub ventas_mes: Money,
    pub total_compras: Money,
}

pub async fn stats(state: &AppState) -> AppResult<DashboardStats> {
    debug!("dashboard::stats command");
    state.require_staff().await?;
    state.simulate_latency().await;

    collect(state).await
}

/// Gathers stats without a session. Used at boot.
pub async fn collect(state: &AppState) -> AppResult<DashboardStats> {
    let storage = state.storage();
    let threshold = state.config().inventory.low_stock_threshold;
    let month_ago = Utc::now() - Duration::days(30);

    Ok(DashboardStats {
        usuarios: storage.users().count().await?,
        productos: storage.productos().count().await?,
        proveedores: storage.proveedores().count().await?,
        compras: storage.compras().count().await?,
        ventas: storage.ventas().count().await?,
        citas_pendientes: storage
            .citas()
            .list_by_estado(EstadoCita::Pendiente)
            .await?
            .len(),
        bajo_stock: storage.productos().low_stock(threshold).await?,
        total_ventas: storage.ventas().total_since(None).await?,
        ventas_mes: storage.ventas().total_since(Some(month_ago)).await?,
        total_compras: storage.compras().total_since(None).await?,
    })
}
