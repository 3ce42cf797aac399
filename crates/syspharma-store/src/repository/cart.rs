//! # Cart Repository
//!
//! The client cart under `syspharma_cart`: a plain array of [`CartItem`]
//! with no ids of its own. Stock and quantity rules live in the app layer.

use syspharma_core::CartItem;
use tracing::debug;

use crate::error::StoreResult;
use crate::keys;
use crate::storage::LocalStorage;

#[derive(Debug, Clone)]
pub struct CartRepository {
    storage: LocalStorage,
}

impl CartRepository {
    pub fn new(storage: LocalStorage) -> Self {
        CartRepository { storage }
    }

    pub async fn items(&self) -> StoreResult<Vec<CartItem>> {
        self.storage.read_array(keys::CART).await
    }

    pub async fn save(&self, items: &[CartItem]) -> StoreResult<()> {
        debug!(items = items.len(), "Saving cart");
        self.storage.write_array(keys::CART, items).await
    }

    /// Empties the cart by removing its key.
    pub async fn clear(&self) -> StoreResult<()> {
        debug!("Clearing cart");
        self.storage.remove_item(keys::CART).await
    }
}
