//! # Cart
//!
//! Rules for the client cart stored under `syspharma_cart`.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  View Action            Operation                 Cart Change           │
//! │  ───────────            ─────────                 ───────────           │
//! │                                                                         │
//! │  "Agregar" ───────────► catalogo::agregar() ───► items.push / qty += n  │
//! │                                                                         │
//! │  Change quantity ─────► set_cantidad() ────────► items[i].qty = n       │
//! │                                                  (0 removes the item)   │
//! │                                                                         │
//! │  Click remove ────────► quitar() ──────────────► items.remove(i)        │
//! │                                                                         │
//! │  "Vaciar" ────────────► vaciar() ──────────────► key removed            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart is loaded, changed in memory, and written back whole.

use serde::Serialize;
use syspharma_core::{
    validate_quantity, CartItem, CoreError, Money, Producto, MAX_CART_ITEMS, MAX_ITEM_QUANTITY,
};

use crate::error::{AppError, AppResult};

/// The cart of one client.
///
/// ## Invariants
/// - Items are unique by `producto_id` (adding the same product increases quantity)
/// - Quantity is > 0 and never above the product's stock when set
/// - At most `MAX_CART_ITEMS` lines, `MAX_ITEM_QUANTITY` units per line
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<CartItem>) -> Self {
        Cart { items }
    }

    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, producto_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.producto_id == producto_id)
    }

    /// Adds a product, or increases its quantity if already present.
    ///
    /// The price is frozen when the line is first added.
    pub fn add_item(&mut self, producto: &Producto, cantidad: i64) -> AppResult<()> {
        validate_quantity(cantidad)?;
        if !producto.en_catalogo() {
            return Err(AppError::validation(format!(
                "{} no está disponible",
                producto.nombre
            )));
        }

        let current = self.get(&producto.id).map(|i| i.cantidad).unwrap_or(0);
        let next = current.saturating_add(cantidad);
        check_quantity(producto, next)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.producto_id == producto.id) {
            item.cantidad = next;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(AppError::validation(format!(
                "El carrito no puede tener más de {} productos",
                MAX_CART_ITEMS
            )));
        }

        self.items.push(CartItem::from_producto(producto, cantidad));
        Ok(())
    }

    /// Sets the quantity of a line. Zero removes it.
    pub fn set_quantity(&mut self, producto: &Producto, cantidad: i64) -> AppResult<()> {
        if cantidad == 0 {
            return self.remove_item(&producto.id);
        }
        if cantidad < 0 {
            return Err(AppError::validation("La cantidad no puede ser negativa"));
        }
        validate_quantity(cantidad)?;
        check_quantity(producto, cantidad)?;

        match self.items.iter_mut().find(|i| i.producto_id == producto.id) {
            Some(item) => {
                item.cantidad = cantidad;
                Ok(())
            }
            None => Err(AppError::not_found("Producto en el carrito", &producto.id)),
        }
    }

    pub fn remove_item(&mut self, producto_id: &str) -> AppResult<()> {
        let before = self.items.len();
        self.items.retain(|i| i.producto_id != producto_id);

        if self.items.len() == before {
            return Err(AppError::not_found("Producto en el carrito", producto_id));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }
}

fn check_quantity(producto: &Producto, cantidad: i64) -> AppResult<()> {
    if cantidad > MAX_ITEM_QUANTITY {
        return Err(AppError::validation(format!(
            "La cantidad no puede superar {}",
            MAX_ITEM_QUANTITY
        )));
    }
    if !producto.can_sell(cantidad) {
        return Err(CoreError::InsufficientStock {
            producto: producto.nombre.clone(),
            available: producto.stock,
            requested: cantidad,
        }
        .into());
    }
    Ok(())
}

/// Totals shown in the cart modal and the navbar badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Distinct products.
    pub lineas: usize,
    /// Units across all lines.
    pub unidades: i64,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            lineas: cart.items.len(),
            unidades: cart
                .items
                .iter()
                .fold(0i64, |acc, i| acc.saturating_add(i.cantidad)),
            total: cart.items.iter().map(CartItem::subtotal).sum(),
        }
    }
}
