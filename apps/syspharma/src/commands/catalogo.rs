//! # Catálogo Operations
//!
//! Client-facing catalog and cart.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│  Cart    │────►│  Venta   │       │
//! │  │  Cart    │     │          │     │  Modal   │     │          │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   agregar           checkout                           │
//! │                   set_cantidad      (stock -= qty, cart removed)       │
//! │                   quitar                                                │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   vaciar ───────────────────────────►                  │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The navbar opens the cart modal through the `openCart` event.

use serde::Serialize;
use syspharma_core::{CartItem, Producto, Venta};
use tracing::{debug, info};

use crate::commands::ventas::record_sale;
use crate::error::{AppError, AppResult};
use crate::state::{AppState, Cart, CartTotals};

/// Cart contents with totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        let totals = cart.totals();
        CartResponse {
            items: cart.into_items(),
            totals,
        }
    }
}

/// Catalog listing: flagged, in stock, matching `query`.
pub async fn catalogo(state: &AppState, query: &str) -> AppResult<Vec<Producto>> {
    debug!(query = %query, "catalogo command");
    state.simulate_latency().await;

    Ok(state.storage().productos().catalogo(query).await?)
}

pub async fn categorias(state: &AppState) -> AppResult<Vec<String>> {
    Ok(state.storage().productos().categorias().await?)
}

/// The cart belongs to whoever is logged in; anonymous visitors have none.
async fn load_cart(state: &AppState) -> AppResult<Cart> {
    state.session().await?;
    Ok(Cart::from_items(state.storage().cart().items().await?))
}

async fn save_cart(state: &AppState, cart: Cart) -> AppResult<CartResponse> {
    if cart.is_empty() {
        state.storage().cart().clear().await?;
    } else {
        state.storage().cart().save(&cart.items).await?;
    }
    state.changed();
    Ok(CartResponse::from(cart))
}

async fn producto(state: &AppState, id: &str) -> AppResult<Producto> {
    state
        .storage()
        .productos()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Producto", id))
}

pub async fn carrito(state: &AppState) -> AppResult<CartResponse> {
    Ok(CartResponse::from(load_cart(state).await?))
}

/// Asks the cart modal in this tab to open.
pub fn abrir_carrito(state: &AppState) {
    debug!("abrir_carrito command");
    state.storage().bus().open_cart();
}

/// Adds units of a product. Adding one already in the cart increases it.
pub async fn agregar(state: &AppState, producto_id: &str, cantidad: i64) -> AppResult<CartResponse> {
    debug!(producto = %producto_id, cantidad = %cantidad, "agregar command");
    let result = add(state, producto_id, cantidad).await;
    state.notify(result, "Producto agregado al carrito")
}

async fn add(state: &AppState, producto_id: &str, cantidad: i64) -> AppResult<CartResponse> {
    let producto = producto(state, producto_id).await?;
    let mut cart = load_cart(state).await?;
    cart.add_item(&producto, cantidad)?;
    save_cart(state, cart).await
}

/// Sets a line's quantity. Zero removes the line.
pub async fn set_cantidad(
    state: &AppState,
    producto_id: &str,
    cantidad: i64,
) -> AppResult<CartResponse> {
    debug!(producto = %producto_id, cantidad = %cantidad, "set_cantidad command");
    let result = change_quantity(state, producto_id, cantidad).await;
    if let Err(err) = &result {
        state.toaster().report(err);
    }
    result
}

async fn change_quantity(
    state: &AppState,
    producto_id: &str,
    cantidad: i64,
) -> AppResult<CartResponse> {
    let mut cart = load_cart(state).await?;
    if cantidad == 0 {
        cart.remove_item(producto_id)?;
    } else {
        let producto = producto(state, producto_id).await?;
        cart.set_quantity(&producto, cantidad)?;
    }
    save_cart(state, cart).await
}

pub async fn quitar(state: &AppState, producto_id: &str) -> AppResult<CartResponse> {
    debug!(producto = %producto_id, "quitar command");
    let mut cart = load_cart(state).await?;
    cart.remove_item(producto_id)?;

    let response = save_cart(state, cart).await?;
    state.toaster().info("Producto eliminado del carrito");
    Ok(response)
}

pub async fn vaciar(state: &AppState) -> AppResult<CartResponse> {
    debug!("vaciar command");
    state.session().await?;
    save_cart(state, Cart::new()).await
}

/// Turns the cart into a Venta for the logged-in client.
///
/// Stock is re-checked against current inventory; a product that sold out
/// since it was added fails the checkout and the cart is kept.
pub async fn checkout(state: &AppState) -> AppResult<Venta> {
    debug!("checkout command");
    let result = place_order(state).await;
    state.notify(result, "Compra realizada con éxito")
}

async fn place_order(state: &AppState) -> AppResult<Venta> {
    let cliente = state.session().await?;
    let cart = load_cart(state).await?;
    if cart.is_empty() {
        return Err(AppError::validation("El carrito está vacío"));
    }

    let requested: Vec<(String, i64)> = cart
        .items
        .iter()
        .map(|i| (i.producto_id.clone(), i.cantidad))
        .collect();

    let venta = record_sale(state, Some(cliente.id.clone()), &cliente.id, &requested).await?;
    state.storage().cart().clear().await?;
    state.changed();

    info!(venta = %venta.id, cliente = %cliente.id, "Checkout completed");
    Ok(venta)
}
