//! # Compra Repository
//!
//! Purchases under `syspharma_compras`. Append-only: there is no edit or
//! delete for a registered purchase.

use chrono::{DateTime, Utc};
use syspharma_core::{Compra, Money};
use tracing::debug;

use crate::error::StoreResult;
use crate::repository::Collection;
use crate::storage::LocalStorage;

#[derive(Debug, Clone)]
pub struct CompraRepository {
    compras: Collection<Compra>,
}

impl CompraRepository {
    pub fn new(storage: LocalStorage) -> Self {
        CompraRepository {
            compras: Collection::new(storage),
        }
    }

    /// All purchases, newest first.
    pub async fn list(&self) -> StoreResult<Vec<Compra>> {
        let mut compras = self.compras.load().await?;
        compras.sort_by(|a, b| b.fecha.cmp(&a.fecha));
        Ok(compras)
    }

    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Compra>> {
        self.compras.get_by_id(id).await
    }

    pub async fn insert(&self, compra: Compra) -> StoreResult<Compra> {
        debug!(proveedor = %compra.proveedor, total = %compra.total, "Inserting compra");
        self.compras.append(compra).await
    }

    pub async fn count(&self) -> StoreResult<usize> {
        self.compras.count().await
    }

    /// Sum of purchase totals since `since` (all time when `None`).
    pub async fn total_since(&self, since: Option<DateTime<Utc>>) -> StoreResult<Money> {
        Ok(self
            .compras
            .load()
            .await?
            .iter()
            .filter(|c| since.map(|s| c.fecha >= s).unwrap_or(true))
            .map(|c| c.total)
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, StoreConfig};
    use chrono::Duration;
    use syspharma_core::LineaOrden;

    fn compra(id: &str, fecha: DateTime<Utc>, pesos: i64) -> Compra {
        let productos = vec![LineaOrden {
            id: "p1".to_string(),
            nombre: "Gasa estéril".to_string(),
            cantidad: 1,
            precio: Money::from_pesos(pesos),
        }];
        Compra {
            id: id.to_string(),
            fecha,
            proveedor: "Droguería Central".to_string(),
            total: syspharma_core::order_total(&productos).unwrap(),
            productos,
        }
    }

    #[tokio::test]
    async fn test_list_newest_first_and_totals() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let repo = db.open_tab().compras();
        let now = Utc::now();

        repo.insert(compra("old", now - Duration::days(10), 100)).await.unwrap();
        repo.insert(compra("new", now, 250)).await.unwrap();

        let ids: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["new".to_string(), "old".to_string()]);

        assert_eq!(repo.total_since(None).await.unwrap(), Money::from_pesos(350));
        assert_eq!(
            repo.total_since(Some(now - Duration::days(1))).await.unwrap(),
            Money::from_pesos(250)
        );
    }
}
