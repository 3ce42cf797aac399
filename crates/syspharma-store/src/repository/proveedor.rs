//! # Proveedor Repository
//!
//! Suppliers under `syspharma_proveedores`. NIT is unique on create and edit.
//! Deleting a supplier leaves compras that name it untouched.

use syspharma_core::Proveedor;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::repository::Collection;
use crate::storage::LocalStorage;

#[derive(Debug, Clone)]
pub struct ProveedorRepository {
    proveedores: Collection<Proveedor>,
}

fn same_nit(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

impl ProveedorRepository {
    pub fn new(storage: LocalStorage) -> Self {
        ProveedorRepository {
            proveedores: Collection::new(storage),
        }
    }

    pub async fn list(&self) -> StoreResult<Vec<Proveedor>> {
        self.proveedores.load().await
    }

    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Proveedor>> {
        self.proveedores.get_by_id(id).await
    }

    pub async fn find_by_nit(&self, nit: &str) -> StoreResult<Option<Proveedor>> {
        Ok(self.list().await?.into_iter().find(|p| same_nit(&p.nit, nit)))
    }

    pub async fn insert(&self, proveedor: Proveedor) -> StoreResult<Proveedor> {
        debug!(nit = %proveedor.nit, "Inserting proveedor");

        if self.find_by_nit(&proveedor.nit).await?.is_some() {
            warn!(nit = %proveedor.nit, "Rejected duplicate NIT");
            return Err(StoreError::duplicate("nit", proveedor.nit.trim()));
        }

        self.proveedores.append(proveedor).await
    }

    pub async fn update(&self, proveedor: &Proveedor) -> StoreResult<()> {
        debug!(id = %proveedor.id, "Updating proveedor");

        let proveedores = self.list().await?;
        if proveedores
            .iter()
            .any(|p| p.id != proveedor.id && same_nit(&p.nit, &proveedor.nit))
        {
            warn!(nit = %proveedor.nit, "Rejected duplicate NIT on edit");
            return Err(StoreError::duplicate("nit", proveedor.nit.trim()));
        }

        self.proveedores.replace(proveedor).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Deleting proveedor");
        self.proveedores.remove(id).await
    }

    pub async fn count(&self) -> StoreResult<usize> {
        self.proveedores.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;
    use crate::pool::{Database, StoreConfig};

    fn proveedor(id: &str, nit: &str) -> Proveedor {
        Proveedor {
            id: id.to_string(),
            nombre: format!("Proveedor {}", id),
            nit: nit.to_string(),
            email: format!("{}@proveedor.co", id),
            telefono: "6015551234".to_string(),
            direccion: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_nit_rejected_without_write() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let storage = db.open_tab();
        let repo = storage.proveedores();

        repo.insert(proveedor("a", "900123456")).await.unwrap();
        let before = storage.get_item(keys::PROVEEDORES).await.unwrap();

        let err = repo.insert(proveedor("b", " 900123456")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));
        assert_eq!(storage.get_item(keys::PROVEEDORES).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_keeps_own_nit() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let repo = db.open_tab().proveedores();

        repo.insert(proveedor("a", "900123456")).await.unwrap();
        repo.insert(proveedor("b", "800765432")).await.unwrap();

        let mut a = repo.get_by_id("a").await.unwrap().unwrap();
        a.direccion = Some("Cra 7 # 12-34".to_string());
        repo.update(&a).await.unwrap();

        a.nit = "800765432".to_string();
        assert!(repo.update(&a).await.is_err());
    }
}
