//! # syspharma-core: Pure Business Logic for SysPharma
//!
//! Types, money, validation and form rules for the pharmacy dashboards.
//! Nothing in this crate touches storage, the clock or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SysPharma Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Front end (admin / empleado / cliente)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 apps/syspharma (view operations)                │   │
//! │  │     login, register, productos, proveedores, ventas, citas      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ syspharma-core (THIS CRATE) ★                     │   │
//! │  │   types • money • validation • forms • errors                   │   │
//! │  │   NO I/O • NO STORAGE • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           syspharma-store (local storage + sync bus)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Stored records (User, Producto, Proveedor, Compra, Venta, Cita)
//! - [`money`] - Integer money in centavos
//! - [`validation`] - Email, phone, NIT, password strength, numeric checks
//! - [`forms`] - Submitted form shapes and their error maps
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use syspharma_core::validation::{validate_nit, validate_password, PasswordStrength};
//!
//! assert!(validate_nit("900123456").is_ok());
//! assert_eq!(validate_password("abc").strength, PasswordStrength::Weak);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod forms;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use forms::*;
pub use money::Money;
pub use types::*;
pub use validation::{validate_quantity, FormErrors, PasswordStrength};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single product in one order or cart line.
///
/// Guards against typing 1000 instead of 10 at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum distinct products in the client cart.
pub const MAX_CART_ITEMS: usize = 50;

/// Maximum units a product form may declare on hand.
pub const MAX_STOCK: i64 = 1_000_000;

/// Maximum unit price a product form accepts: $100.000.000,00.
pub const MAX_PRECIO: Money = Money::from_pesos(100_000_000);
