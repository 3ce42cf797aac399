//! # View Operations
//!
//! Everything a dashboard view can ask of the back end.
//!
//! ## Organization
//! ```text
//! commands/
//! ├── mod.rs          ◄─── You are here (Confirmation, exports)
//! ├── auth.rs         ◄─── Login, Register, logout, session
//! ├── usuarios.rs     ◄─── UsuariosView (admin)
//! ├── productos.rs    ◄─── ProductosView (staff)
//! ├── proveedores.rs  ◄─── ProveedoresView (admin)
//! ├── compras.rs      ◄─── Compras (admin)
//! ├── ventas.rs       ◄─── Ventas (staff)
//! ├── citas.rs        ◄─── Citas and Mis citas
//! ├── catalogo.rs     ◄─── Catálogo and cart (cliente)
//! └── dashboard.rs    ◄─── Inicio stats
//! ```
//!
//! ## How Operations Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  productos::crear(&state, form)                                        │
//! │         │                                                               │
//! │         ├── state.require_staff()       ──► FORBIDDEN                  │
//! │         ├── form.validate()             ──► VALIDATION_ERROR + fields  │
//! │         ├── repository insert (scan)    ──► DUPLICATE                  │
//! │         ├── state.changed()             ──► localStorageUpdated        │
//! │         └── state.notify(..)            ──► toast                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Listing operations wait `storage.load_delay_ms` first, the way the views
//! show their loading spinner.

pub mod auth;
pub mod catalogo;
pub mod citas;
pub mod compras;
pub mod dashboard;
pub mod productos;
pub mod proveedores;
pub mod usuarios;
pub mod ventas;

use serde::Deserialize;

/// The answer to a delete confirmation dialog.
///
/// A rejected dialog leaves everything as it was: no write, no toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confirmation {
    Accepted,
    Rejected,
}

impl Confirmation {
    pub fn is_accepted(self) -> bool {
        self == Confirmation::Accepted
    }
}

impl From<bool> for Confirmation {
    fn from(accepted: bool) -> Self {
        if accepted {
            Confirmation::Accepted
        } else {
            Confirmation::Rejected
        }
    }
}
