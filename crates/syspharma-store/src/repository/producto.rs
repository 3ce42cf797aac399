//! # Producto Repository
//!
//! Inventory under `syspharma_productos`.
//!
//! ## Key Operations
//! - CRUD with a create-time `codigo` uniqueness scan
//! - Catalog listing (flagged and in stock)
//! - Batched stock adjustments for ventas, compras and checkout
//!
//! ## Stock Adjustments
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  adjust_stock([(p1, -2), (p2, -1), (gone, +5)])                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load array once                                                       │
//! │       │                                                                 │
//! │       ├── p1: 10 → 8                                                   │
//! │       ├── p2:  1 → 0                                                   │
//! │       └── gone: not in array → reported back, skipped                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  any result < 0 ? ──yes──► NegativeStock, nothing written              │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  write array once                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;
use syspharma_core::Producto;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::repository::Collection;
use crate::storage::LocalStorage;

#[derive(Debug, Clone)]
pub struct ProductoRepository {
    productos: Collection<Producto>,
}

fn same_codigo(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl ProductoRepository {
    pub fn new(storage: LocalStorage) -> Self {
        ProductoRepository {
            productos: Collection::new(storage),
        }
    }

    pub async fn list(&self) -> StoreResult<Vec<Producto>> {
        self.productos.load().await
    }

    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Producto>> {
        self.productos.get_by_id(id).await
    }

    pub async fn find_by_codigo(&self, codigo: &str) -> StoreResult<Option<Producto>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|p| same_codigo(&p.codigo, codigo)))
    }

    /// Catalog view: flagged for the catalog, in stock, matching `query`.
    pub async fn catalogo(&self, query: &str) -> StoreResult<Vec<Producto>> {
        let productos: Vec<Producto> = self
            .list()
            .await?
            .into_iter()
            .filter(|p| p.en_catalogo() && p.matches(query))
            .collect();

        debug!(query = %query, count = productos.len(), "Catalog listing");
        Ok(productos)
    }

    /// Distinct categories of catalog products, sorted.
    pub async fn categorias(&self) -> StoreResult<Vec<String>> {
        let categorias: BTreeSet<String> = self
            .list()
            .await?
            .into_iter()
            .filter(Producto::en_catalogo)
            .map(|p| p.categoria.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        Ok(categorias.into_iter().collect())
    }

    /// Products at or below `threshold` units.
    pub async fn low_stock(&self, threshold: i64) -> StoreResult<Vec<Producto>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|p| p.stock <= threshold)
            .collect())
    }

    /// Appends a new product.
    ///
    /// ## Errors
    /// * `StoreError::UniqueViolation` - `codigo` already present; nothing written
    pub async fn insert(&self, producto: Producto) -> StoreResult<Producto> {
        debug!(codigo = %producto.codigo, "Inserting producto");

        let productos = self.list().await?;
        if productos
            .iter()
            .any(|p| same_codigo(&p.codigo, &producto.codigo))
        {
            warn!(codigo = %producto.codigo, "Rejected duplicate codigo");
            return Err(StoreError::duplicate("codigo", producto.codigo.trim()));
        }

        self.productos.append(producto).await
    }

    /// Replaces a product by id. `codigo` is not re-checked on edit.
    pub async fn update(&self, producto: &Producto) -> StoreResult<()> {
        debug!(id = %producto.id, "Updating producto");
        self.productos.replace(producto).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Deleting producto");
        self.productos.remove(id).await
    }

    pub async fn count(&self) -> StoreResult<usize> {
        self.productos.count().await
    }

    /// Applies stock deltas in one load and one write.
    ///
    /// ## Returns
    /// Ids that were not found and therefore skipped.
    ///
    /// ## Errors
    /// * `StoreError::NegativeStock` - A product would end below zero; nothing written
    /// * `StoreError::StockOverflow` - A product would leave the `i64` range; nothing written
    pub async fn adjust_stock(&self, changes: &[(String, i64)]) -> StoreResult<Vec<String>> {
        let mut productos = self.list().await?;
        let mut missing = Vec::new();

        for (id, delta) in changes {
            match productos.iter_mut().find(|p| &p.id == id) {
                Some(p) => {
                    let next = p.stock.checked_add(*delta).ok_or_else(|| {
                        warn!(id = %id, stock = p.stock, delta = %delta, "Rejected stock overflow");
                        StoreError::StockOverflow {
                            id: id.clone(),
                            stock: p.stock,
                            delta: *delta,
                        }
                    })?;
                    if next < 0 {
                        warn!(id = %id, stock = p.stock, delta = %delta, "Rejected negative stock");
                        return Err(StoreError::NegativeStock {
                            id: id.clone(),
                            stock: p.stock,
                            delta: *delta,
                        });
                    }
                    p.stock = next;
                }
                None => missing.push(id.clone()),
            }
        }

        self.productos.save(&productos).await?;
        debug!(
            changed = changes.len() - missing.len(),
            skipped = missing.len(),
            "Stock adjusted"
        );
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;
    use crate::pool::{Database, StoreConfig};
    use syspharma_core::Money;

    fn producto(id: &str, codigo: &str, stock: i64, visible: bool) -> Producto {
        Producto {
            id: id.to_string(),
            codigo: codigo.to_string(),
            nombre: format!("Producto {}", codigo),
            descripcion: None,
            precio: Money::from_pesos(5_000),
            stock,
            categoria: if visible { "Vitaminas" } else { "Interno" }.to_string(),
            imagen: None,
            mostrar_en_catalogo: Some(visible),
        }
    }

    #[tokio::test]
    async fn test_duplicate_codigo_rejected_without_write() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let storage = db.open_tab();
        let repo = storage.productos();

        repo.insert(producto("p1", "VIT-C", 5, true)).await.unwrap();
        let before = storage.get_item(keys::PRODUCTOS).await.unwrap();

        let err = repo
            .insert(producto("p2", "VIT-C", 9, true))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { ref field, .. } if field == "codigo"));
        assert_eq!(storage.get_item(keys::PRODUCTOS).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_does_not_recheck_codigo() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let repo = db.open_tab().productos();

        repo.insert(producto("p1", "A", 5, true)).await.unwrap();
        repo.insert(producto("p2", "B", 5, true)).await.unwrap();

        let mut p2 = repo.get_by_id("p2").await.unwrap().unwrap();
        p2.codigo = "A".to_string();
        repo.update(&p2).await.unwrap();
    }

    #[tokio::test]
    async fn test_catalogo_and_categorias() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let repo = db.open_tab().productos();

        repo.insert(producto("p1", "A", 5, true)).await.unwrap();
        repo.insert(producto("p2", "B", 0, true)).await.unwrap();
        repo.insert(producto("p3", "C", 5, false)).await.unwrap();

        let catalogo = repo.catalogo("").await.unwrap();
        assert_eq!(catalogo.len(), 1);
        assert_eq!(catalogo[0].id, "p1");
        assert_eq!(repo.categorias().await.unwrap(), vec!["Vitaminas".to_string()]);
        assert!(repo.catalogo("jarabe").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_adjust_stock() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let repo = db.open_tab().productos();

        repo.insert(producto("p1", "A", 10, true)).await.unwrap();
        repo.insert(producto("p2", "B", 1, true)).await.unwrap();

        let missing = repo
            .adjust_stock(&[
                ("p1".to_string(), -2),
                ("p2".to_string(), -1),
                ("gone".to_string(), 5),
            ])
            .await
            .unwrap();
        assert_eq!(missing, vec!["gone".to_string()]);
        assert_eq!(repo.get_by_id("p1").await.unwrap().unwrap().stock, 8);
        assert_eq!(repo.get_by_id("p2").await.unwrap().unwrap().stock, 0);

        let err = repo
            .adjust_stock(&[("p1".to_string(), -1), ("p2".to_string(), -1)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NegativeStock { .. }));
        // The first change was not persisted either.
        assert_eq!(repo.get_by_id("p1").await.unwrap().unwrap().stock, 8);
    }

    #[tokio::test]
    async fn test_adjust_stock_overflow_writes_nothing() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let storage = db.open_tab();
        let repo = storage.productos();

        repo.insert(producto("p1", "A", 4, true)).await.unwrap();
        repo.insert(producto("p2", "B", i64::MAX, true)).await.unwrap();
        let before = storage.get_item(keys::PRODUCTOS).await.unwrap();

        let err = repo
            .adjust_stock(&[("p1".to_string(), 1), ("p2".to_string(), 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::StockOverflow { ref id, .. } if id == "p2"));
        assert_eq!(storage.get_item(keys::PRODUCTOS).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_low_stock() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let repo = db.open_tab().productos();

        repo.insert(producto("p1", "A", 10, true)).await.unwrap();
        repo.insert(producto("p2", "B", 2, true)).await.unwrap();

        let low = repo.low_stock(5).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, "p2");
    }
}
