//! # Repository Module
//!
//! Per-entity repositories over local storage.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Over One Key                              │
//! │                                                                         │
//! │  View operation                                                        │
//! │       │  storage.productos().insert(producto)                          │
//! │       ▼                                                                 │
//! │  ProductoRepository                                                    │
//! │  ├── uniqueness scan over the loaded array (advisory, unlocked)        │
//! │  └── Collection<Producto>                                              │
//! │       ├── load()     ── read_array("syspharma_productos")              │
//! │       ├── append()   ── load + push + write whole array                │
//! │       ├── replace()  ── load + swap by id + write whole array          │
//! │       └── remove()   ── filter raw JSON by id + write                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LocalStorage (one tab) ──► local_storage table + StorageHub           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories never fire `localStorageUpdated`. The operation that owns the
//! write does, once it is complete.
//!
//! ## Available Repositories
//!
//! - [`UserRepository`] - Accounts, email lookups
//! - [`ProductoRepository`] - Inventory, stock adjustments
//! - [`ProveedorRepository`] - Suppliers, NIT lookups
//! - [`CompraRepository`] - Purchases
//! - [`VentaRepository`] - Sales
//! - [`CitaRepository`] - Appointments
//! - [`CartRepository`] - The client's cart
//! - [`SessionRepository`] - The logged-in user

pub mod cart;
pub mod cita;
pub mod compra;
pub mod producto;
pub mod proveedor;
pub mod session;
pub mod user;
pub mod venta;

pub use cart::CartRepository;
pub use cita::CitaRepository;
pub use compra::CompraRepository;
pub use producto::ProductoRepository;
pub use proveedor::ProveedorRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
pub use venta::VentaRepository;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::marker::PhantomData;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::storage::LocalStorage;

// =============================================================================
// Ids
// =============================================================================

const ID_LENGTH: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a random 9-character base-36 id.
///
/// Drawn from v4 UUID entropy. Not checked against existing ids.
pub fn generate_id() -> String {
    let mut n = Uuid::new_v4().as_u128();
    let mut id = String::with_capacity(ID_LENGTH);
    for _ in 0..ID_LENGTH {
        id.push(BASE36[(n % 36) as usize] as char);
        n /= 36;
    }
    id
}

// =============================================================================
// Record
// =============================================================================

/// A record stored in a JSON array under a fixed key.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Storage key holding the array.
    const KEY: &'static str;

    /// Entity name used in NotFound errors and logs.
    const ENTITY: &'static str;

    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($ty:ty, $key:expr, $entity:literal) => {
        impl $crate::repository::Record for $ty {
            const KEY: &'static str = $key;
            const ENTITY: &'static str = $entity;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

impl_record!(syspharma_core::User, crate::keys::USERS, "Usuario");
impl_record!(syspharma_core::Producto, crate::keys::PRODUCTOS, "Producto");
impl_record!(syspharma_core::Proveedor, crate::keys::PROVEEDORES, "Proveedor");
impl_record!(syspharma_core::Compra, crate::keys::COMPRAS, "Compra");
impl_record!(syspharma_core::Venta, crate::keys::VENTAS, "Venta");
impl_record!(syspharma_core::Cita, crate::keys::CITAS, "Cita");

// =============================================================================
// Collection
// =============================================================================

#[derive(Deserialize)]
struct IdOnly {
    id: String,
}

/// The array of `T` under `T::KEY`.
///
/// Every mutation is load, change, rewrite. Nothing is locked between the
/// load and the rewrite.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    storage: LocalStorage,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Collection<T> {
    pub fn new(storage: LocalStorage) -> Self {
        Collection {
            storage,
            _record: PhantomData,
        }
    }

    pub async fn load(&self) -> StoreResult<Vec<T>> {
        self.storage.read_array(T::KEY).await
    }

    pub async fn save(&self, items: &[T]) -> StoreResult<()> {
        self.storage.write_array(T::KEY, items).await
    }

    pub async fn count(&self) -> StoreResult<usize> {
        Ok(self.load().await?.len())
    }

    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<T>> {
        Ok(self.load().await?.into_iter().find(|r| r.id() == id))
    }

    /// Appends `item` to the end of the array.
    pub async fn append(&self, item: T) -> StoreResult<T> {
        let mut items = self.load().await?;
        items.push(item.clone());
        self.save(&items).await?;

        debug!(entity = T::ENTITY, id = %item.id(), total = items.len(), "Appended record");
        Ok(item)
    }

    /// Replaces the record with the same id, keeping its position.
    pub async fn replace(&self, item: &T) -> StoreResult<()> {
        let mut items = self.load().await?;
        let slot = items
            .iter_mut()
            .find(|r| r.id() == item.id())
            .ok_or_else(|| StoreError::not_found(T::ENTITY, item.id()))?;
        *slot = item.clone();
        self.save(&items).await?;

        debug!(entity = T::ENTITY, id = %item.id(), "Replaced record");
        Ok(())
    }

    /// Removes the record with `id`.
    ///
    /// Works on the raw JSON so every other record is written back exactly
    /// as it was stored, including fields this build does not know about.
    pub async fn remove(&self, id: &str) -> StoreResult<()> {
        let raw = match self.storage.get_item(T::KEY).await? {
            Some(raw) => raw,
            None => return Err(StoreError::not_found(T::ENTITY, id)),
        };

        let items: Vec<Box<RawValue>> =
            serde_json::from_str(&raw).map_err(|e| StoreError::malformed(T::KEY, e))?;
        let before = items.len();

        let mut kept = Vec::with_capacity(before);
        for item in items {
            let record: IdOnly =
                serde_json::from_str(item.get()).map_err(|e| StoreError::malformed(T::KEY, e))?;
            if record.id != id {
                kept.push(item);
            }
        }

        if kept.len() == before {
            return Err(StoreError::not_found(T::ENTITY, id));
        }

        self.storage
            .set_item(T::KEY, &serde_json::to_string(&kept)?)
            .await?;

        debug!(entity = T::ENTITY, id = %id, remaining = kept.len(), "Removed record");
        Ok(())
    }
}

// =============================================================================
// Repository Accessors
// =============================================================================

impl LocalStorage {
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.clone())
    }

    pub fn productos(&self) -> ProductoRepository {
        ProductoRepository::new(self.clone())
    }

    pub fn proveedores(&self) -> ProveedorRepository {
        ProveedorRepository::new(self.clone())
    }

    pub fn compras(&self) -> CompraRepository {
        CompraRepository::new(self.clone())
    }

    pub fn ventas(&self) -> VentaRepository {
        VentaRepository::new(self.clone())
    }

    pub fn citas(&self) -> CitaRepository {
        CitaRepository::new(self.clone())
    }

    pub fn cart(&self) -> CartRepository {
        CartRepository::new(self.clone())
    }

    pub fn session(&self) -> SessionRepository {
        SessionRepository::new(self.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;
    use crate::pool::{Database, StoreConfig};
    use syspharma_core::{Money, Producto};

    fn producto(id: &str, codigo: &str) -> Producto {
        Producto {
            id: id.to_string(),
            codigo: codigo.to_string(),
            nombre: format!("Producto {}", codigo),
            descripcion: None,
            precio: Money::from_pesos(1_000),
            stock: 3,
            categoria: "General".to_string(),
            imagen: None,
            mostrar_en_catalogo: Some(true),
        }
    }

    #[test]
    fn test_generate_id_shape() {
        let a = generate_id();
        let b = generate_id();
        assert_eq!(a.len(), ID_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_append_replace_remove() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let productos: Collection<Producto> = Collection::new(db.open_tab());

        productos.append(producto("a", "A-1")).await.unwrap();
        productos.append(producto("b", "B-1")).await.unwrap();
        assert_eq!(productos.count().await.unwrap(), 2);

        let mut b = productos.get_by_id("b").await.unwrap().unwrap();
        b.stock = 10;
        productos.replace(&b).await.unwrap();

        let loaded = productos.load().await.unwrap();
        assert_eq!(loaded[1].stock, 10);
        assert_eq!(loaded[0].id, "a");

        productos.remove("a").await.unwrap();
        assert_eq!(productos.load().await.unwrap(), vec![b]);
    }

    #[tokio::test]
    async fn test_replace_and_remove_unknown_id() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let productos: Collection<Producto> = Collection::new(db.open_tab());

        let err = productos.replace(&producto("x", "X")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        productos.append(producto("a", "A-1")).await.unwrap();
        let err = productos.remove("zzz").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(productos.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove_keeps_other_records_verbatim() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let storage = db.open_tab();

        // Unknown field and odd spacing must survive untouched.
        let raw = r#"[{"id":"a", "codigo":"A","extra":{"k":1}},{"id":"b","codigo":"B"},{"id":"c","codigo":"C"}]"#;
        storage.set_item(keys::PRODUCTOS, raw).await.unwrap();

        let productos: Collection<Producto> = Collection::new(storage.clone());
        productos.remove("b").await.unwrap();

        assert_eq!(
            storage.get_item(keys::PRODUCTOS).await.unwrap().unwrap(),
            r#"[{"id":"a", "codigo":"A","extra":{"k":1}},{"id":"c","codigo":"C"}]"#
        );
    }
}
