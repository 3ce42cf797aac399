//! # Venta Repository
//!
//! Sales under `syspharma_ventas`. Append-only, like compras.

use chrono::{DateTime, Utc};
use syspharma_core::{Money, Venta};
use tracing::debug;

use crate::error::StoreResult;
use crate::repository::Collection;
use crate::storage::LocalStorage;

#[derive(Debug, Clone)]
pub struct VentaRepository {
    ventas: Collection<Venta>,
}

impl VentaRepository {
    pub fn new(storage: LocalStorage) -> Self {
        VentaRepository {
            ventas: Collection::new(storage),
        }
    }

    /// All sales, newest first.
    pub async fn list(&self) -> StoreResult<Vec<Venta>> {
        let mut ventas = self.ventas.load().await?;
        ventas.sort_by(|a, b| b.fecha.cmp(&a.fecha));
        Ok(ventas)
    }

    /// Sales tied to one client account, newest first.
    pub async fn list_for_cliente(&self, cliente_id: &str) -> StoreResult<Vec<Venta>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|v| v.cliente.as_deref() == Some(cliente_id))
            .collect())
    }

    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Venta>> {
        self.ventas.get_by_id(id).await
    }

    pub async fn insert(&self, venta: Venta) -> StoreResult<Venta> {
        debug!(vendedor = %venta.vendedor, total = %venta.total, "Inserting venta");
        self.ventas.append(venta).await
    }

    pub async fn count(&self) -> StoreResult<usize> {
        self.ventas.count().await
    }

    /// Sum of sale totals since `since` (all time when `None`).
    pub async fn total_since(&self, since: Option<DateTime<Utc>>) -> StoreResult<Money> {
        Ok(self
            .ventas
            .load()
            .await?
            .iter()
            .filter(|v| since.map(|s| v.fecha >= s).unwrap_or(true))
            .map(|v| v.total)
            .sum())
    }
}
