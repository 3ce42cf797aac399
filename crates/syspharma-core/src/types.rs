//! # Domain Types
//!
//! Records stored in local storage and the small enums around them.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │    Producto     │   │    Proveedor    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (base-36)   │   │  id             │   │  id             │       │
//! │  │  email (unique) │   │  codigo(unique) │   │  nit (unique)   │       │
//! │  │  role           │   │  precio, stock  │   │  email,telefono │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Compra / Venta │   │      Cita       │   │    CartItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  fecha          │   │  fecha, hora    │   │  productoId     │       │
//! │  │  productos[]    │   │  estado         │   │  precio (frozen)│       │
//! │  │  total          │   │                 │   │  cantidad       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Shape
//! Field names are camelCase (`mostrarEnCatalogo`, `clienteId`) to match the
//! arrays the front end already reads. Optional fields carry `#[serde(default)]`
//! so records written before a field existed still load.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// The role of a user. Gates which dashboard entries are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Empleado,
    Cliente,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Empleado, Role::Cliente];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Empleado => "empleado",
            Role::Cliente => "cliente",
        }
    }

    /// Staff roles can manage inventory and register sales.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Empleado)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Cliente
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "empleado" => Ok(Role::Empleado),
            "cliente" => Ok(Role::Cliente),
            _ => Err(ValidationError::NotAllowed {
                field: "rol".to_string(),
                allowed: Role::ALL.iter().map(|r| r.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A user account.
///
/// `password` holds an argon2 PHC string. Records the dashboards wrote may
/// still carry clear text until that user's next login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    pub active: bool,
    pub password: String,
}

impl User {
    /// Case-insensitive email comparison, the way uniqueness is checked.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim())
    }
}

/// A user as the rest of the UI sees it: password stripped.
///
/// Stored under the current-session key and returned by every listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    pub active: bool,
}

impl From<&User> for SessionUser {
    fn from(u: &User) -> Self {
        SessionUser {
            id: u.id.clone(),
            name: u.name.clone(),
            email: u.email.clone(),
            phone: u.phone.clone(),
            role: u.role,
            active: u.active,
        }
    }
}

// =============================================================================
// Producto
// =============================================================================

/// A product in the pharmacy inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Producto {
    pub id: String,

    /// Business code, unique at creation time.
    pub codigo: String,

    pub nombre: String,

    #[serde(default)]
    pub descripcion: Option<String>,

    /// Unit price, always > 0.
    pub precio: Money,

    /// Units on hand, always >= 0.
    pub stock: i64,

    pub categoria: String,

    /// Image URL or data URI.
    #[serde(default)]
    pub imagen: Option<String>,

    /// Whether clients see it in the catalog. Absent means hidden.
    #[serde(default)]
    pub mostrar_en_catalogo: Option<bool>,
}

impl Producto {
    /// Visible in the client catalog: flagged and in stock.
    pub fn en_catalogo(&self) -> bool {
        self.mostrar_en_catalogo.unwrap_or(false) && self.stock > 0
    }

    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity > 0 && self.stock >= quantity
    }

    /// Case-insensitive match on nombre, categoría and descripción.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.nombre.to_lowercase().contains(&q)
            || self.categoria.to_lowercase().contains(&q)
            || self
                .descripcion
                .as_deref()
                .map(|d| d.to_lowercase().contains(&q))
                .unwrap_or(false)
    }
}

// =============================================================================
// Proveedor
// =============================================================================

/// A supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Proveedor {
    pub id: String,
    pub nombre: String,
    /// Tax identifier, 9-10 digits, unique.
    pub nit: String,
    pub email: String,
    pub telefono: String,
    #[serde(default)]
    pub direccion: Option<String>,
}

// =============================================================================
// Order Lines
// =============================================================================

/// A line on a compra or venta.
///
/// Snapshot of the product at the time of the order: later edits to the
/// product do not rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineaOrden {
    /// Producto id.
    pub id: String,
    pub nombre: String,
    pub cantidad: i64,
    /// Unit price at the time of the order.
    pub precio: Money,
}

impl LineaOrden {
    /// Creates a line from a product, freezing its current name and price.
    pub fn from_producto(producto: &Producto, cantidad: i64) -> Self {
        LineaOrden {
            id: producto.id.clone(),
            nombre: producto.nombre.clone(),
            cantidad,
            precio: producto.precio,
        }
    }

    pub fn subtotal(&self) -> Money {
        self.precio.multiply_quantity(self.cantidad)
    }
}

/// Sums line subtotals.
///
/// ## Errors
/// * `CoreError::Overflow` - A subtotal or the sum leaves the `i64` range
pub fn order_total(lineas: &[LineaOrden]) -> CoreResult<Money> {
    lineas.iter().try_fold(Money::zero(), |total, linea| {
        linea
            .precio
            .checked_mul(linea.cantidad)
            .and_then(|subtotal| total.checked_add(subtotal))
            .ok_or_else(|| CoreError::Overflow {
                what: "la orden".to_string(),
            })
    })
}

// =============================================================================
// Compra
// =============================================================================

/// A purchase from a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Compra {
    pub id: String,
    #[ts(as = "String")]
    pub fecha: DateTime<Utc>,
    /// Supplier name as shown in the purchases table.
    pub proveedor: String,
    pub productos: Vec<LineaOrden>,
    pub total: Money,
}

// =============================================================================
// Venta
// =============================================================================

/// A sale to a client (walk-in or catalog checkout).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Venta {
    pub id: String,
    #[ts(as = "String")]
    pub fecha: DateTime<Utc>,
    /// Client user id, if the sale is tied to an account.
    #[serde(default)]
    pub cliente: Option<String>,
    /// User id of whoever registered the sale.
    pub vendedor: String,
    pub productos: Vec<LineaOrden>,
    pub total: Money,
}

// =============================================================================
// Citas
// =============================================================================

/// Appointment status.
///
/// ## Transitions
/// ```text
///   pendiente ──► confirmada ──► completada
///       │              │
///       └──────┬───────┘
///              ▼
///          cancelada
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum EstadoCita {
    Pendiente,
    Confirmada,
    Completada,
    Cancelada,
}

impl EstadoCita {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoCita::Pendiente => "pendiente",
            EstadoCita::Confirmada => "confirmada",
            EstadoCita::Completada => "completada",
            EstadoCita::Cancelada => "cancelada",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EstadoCita::Completada | EstadoCita::Cancelada)
    }

    pub fn can_transition_to(&self, next: EstadoCita) -> bool {
        use EstadoCita::*;
        matches!(
            (self, next),
            (Pendiente, Confirmada)
                | (Pendiente, Cancelada)
                | (Confirmada, Completada)
                | (Confirmada, Cancelada)
        )
    }
}

impl Default for EstadoCita {
    fn default() -> Self {
        EstadoCita::Pendiente
    }
}

impl fmt::Display for EstadoCita {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pharmacy appointment (consultation, vaccination, etc.).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cita {
    pub id: String,
    pub cliente_id: String,
    pub cliente_nombre: String,
    #[ts(as = "String")]
    pub fecha: NaiveDate,
    #[ts(as = "String")]
    pub hora: NaiveTime,
    pub motivo: String,
    #[serde(default)]
    pub estado: EstadoCita,
    #[serde(default)]
    pub notas: Option<String>,
}

// =============================================================================
// Cart
// =============================================================================

/// An item in the client's cart.
///
/// Price is frozen when the item is added, like a sale line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub producto_id: String,
    pub nombre: String,
    pub precio: Money,
    pub cantidad: i64,
    #[serde(default)]
    pub imagen: Option<String>,
}

impl CartItem {
    pub fn from_producto(producto: &Producto, cantidad: i64) -> Self {
        CartItem {
            producto_id: producto.id.clone(),
            nombre: producto.nombre.clone(),
            precio: producto.precio,
            cantidad,
            imagen: producto.imagen.clone(),
        }
    }

    pub fn subtotal(&self) -> Money {
        self.precio.multiply_quantity(self.cantidad)
    }

    /// Converts the cart line into an order line.
    pub fn to_linea(&self) -> LineaOrden {
        LineaOrden {
            id: self.producto_id.clone(),
            nombre: self.nombre.clone(),
            cantidad: self.cantidad,
            precio: self.precio,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn producto(stock: i64, visible: Option<bool>) -> Producto {
        Producto {
            id: "p1".to_string(),
            codigo: "ACE-500".to_string(),
            nombre: "Acetaminofén 500mg".to_string(),
            descripcion: Some("Analgésico".to_string()),
            precio: Money::from_pesos(8_500),
            stock,
            categoria: "Analgésicos".to_string(),
            imagen: None,
            mostrar_en_catalogo: visible,
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Empleado".parse::<Role>().unwrap(), Role::Empleado);
        assert_eq!(" cliente ".parse::<Role>().unwrap(), Role::Cliente);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Empleado).unwrap(), "\"empleado\"");
    }

    #[test]
    fn test_catalog_visibility() {
        assert!(producto(5, Some(true)).en_catalogo());
        assert!(!producto(0, Some(true)).en_catalogo());
        assert!(!producto(5, None).en_catalogo());
        assert!(!producto(5, Some(false)).en_catalogo());
    }

    #[test]
    fn test_producto_matches() {
        let p = producto(5, Some(true));
        assert!(p.matches("aceta"));
        assert!(p.matches("ANALG"));
        assert!(p.matches(""));
        assert!(!p.matches("ibuprofeno"));
    }

    #[test]
    fn test_older_producto_without_optional_fields_loads() {
        let json = r#"{"id":"x","codigo":"C1","nombre":"Gasa","precio":100,"stock":2,"categoria":"Curación"}"#;
        let p: Producto = serde_json::from_str(json).unwrap();
        assert_eq!(p.descripcion, None);
        assert_eq!(p.mostrar_en_catalogo, None);
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let json = serde_json::to_value(producto(1, Some(true))).unwrap();
        assert!(json.get("mostrarEnCatalogo").is_some());
    }

    #[test]
    fn test_order_total() {
        let p = producto(10, None);
        let lineas = vec![LineaOrden::from_producto(&p, 2), LineaOrden::from_producto(&p, 1)];
        assert_eq!(order_total(&lineas).unwrap(), Money::from_pesos(25_500));
    }

    #[test]
    fn test_order_total_overflow_is_an_error() {
        let mut p = producto(10, None);
        p.precio = Money::from_centavos(i64::MAX / 2);
        let lineas = vec![LineaOrden::from_producto(&p, 3)];
        assert!(matches!(order_total(&lineas), Err(CoreError::Overflow { .. })));

        let lineas = vec![LineaOrden::from_producto(&p, 1); 3];
        assert!(matches!(order_total(&lineas), Err(CoreError::Overflow { .. })));
    }

    #[test]
    fn test_cita_transitions() {
        use EstadoCita::*;
        assert!(Pendiente.can_transition_to(Confirmada));
        assert!(Pendiente.can_transition_to(Cancelada));
        assert!(Confirmada.can_transition_to(Completada));
        assert!(!Pendiente.can_transition_to(Completada));
        assert!(!Completada.can_transition_to(Cancelada));
        assert!(!Cancelada.can_transition_to(Pendiente));
        assert!(Cancelada.is_terminal());
    }

    #[test]
    fn test_session_user_strips_password() {
        let user = User {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@farmacia.co".to_string(),
            phone: None,
            role: Role::Admin,
            active: true,
            password: "$argon2id$...".to_string(),
        };
        let session = SessionUser::from(&user);
        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("password").is_none());
        assert!(user.has_email("ANA@farmacia.co "));
    }
}
