//! Storage keys.
//!
//! Every key the dashboards read or write starts with [`PREFIX`]. Storage
//! events for any other key are ignored by subscribers.

pub const PREFIX: &str = "syspharma_";

pub const USERS: &str = "syspharma_users";
pub const PRODUCTOS: &str = "syspharma_productos";
pub const PROVEEDORES: &str = "syspharma_proveedores";
pub const COMPRAS: &str = "syspharma_compras";
pub const VENTAS: &str = "syspharma_ventas";
pub const CITAS: &str = "syspharma_citas";
pub const CART: &str = "syspharma_cart";
pub const CURRENT_USER: &str = "syspharma_current_user";

/// All keys owned by the application, in display order.
pub const ALL: [&str; 8] = [
    USERS,
    PRODUCTOS,
    PROVEEDORES,
    COMPRAS,
    VENTAS,
    CITAS,
    CART,
    CURRENT_USER,
];

/// Returns true if `key` belongs to the application namespace.
pub fn is_app_key(key: &str) -> bool {
    key.starts_with(PREFIX)
}
