//! # Forms
//!
//! Input shapes submitted by each view, and the error map each derives.
//!
//! Every form follows the same flow:
//! ```text
//! submit ──► form.validate() ──► Err(FormErrors) ──► field messages + toast
//!                  │
//!                  └──► Ok(()) ──► repository uniqueness scan ──► write
//! ```
//!
//! Uniqueness (email, codigo, NIT) is not a form concern: it needs the
//! stored array and lives in the repositories.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Role;
use crate::validation::{
    require_password, validate_email, validate_nit, validate_phone,
    validate_precio, validate_quantity, validate_required, validate_stock, FormErrors,
    PasswordStrength,
};

/// Minimum strength accepted for new passwords.
pub const MIN_PASSWORD_STRENGTH: PasswordStrength = PasswordStrength::Medium;

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// Producto
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductoForm {
    pub codigo: String,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub precio: Money,
    pub stock: i64,
    pub categoria: String,
    #[serde(default)]
    pub imagen: Option<String>,
    #[serde(default)]
    pub mostrar_en_catalogo: bool,
}

impl ProductoForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        errors
            .check("codigo", validate_required("código", &self.codigo))
            .check("nombre", validate_required("nombre", &self.nombre))
            .check("precio", validate_precio(self.precio))
            .check("stock", validate_stock(self.stock))
            .check("categoria", validate_required("categoría", &self.categoria));
        errors.into_result()
    }

    pub fn descripcion(&self) -> Option<String> {
        non_blank(&self.descripcion).map(str::to_string)
    }

    pub fn imagen(&self) -> Option<String> {
        non_blank(&self.imagen).map(str::to_string)
    }
}

// =============================================================================
// Proveedor
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProveedorForm {
    pub nombre: String,
    pub nit: String,
    pub email: String,
    pub telefono: String,
    #[serde(default)]
    pub direccion: Option<String>,
}

impl ProveedorForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        errors
            .check("nombre", validate_required("nombre", &self.nombre))
            .check("nit", validate_nit(&self.nit))
            .check("email", validate_email(&self.email))
            .check("telefono", validate_phone(self.telefono.trim()));
        errors.into_result()
    }

    pub fn direccion(&self) -> Option<String> {
        non_blank(&self.direccion).map(str::to_string)
    }
}

// =============================================================================
// Usuario (admin user management)
// =============================================================================

/// Admin-side user form.
///
/// `password` is required when creating. When editing, `None` or blank
/// keeps the stored hash.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_active() -> bool {
    true
}

impl UsuarioForm {
    pub fn validate(&self, creating: bool) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        errors
            .check("name", validate_required("nombre", &self.name))
            .check("email", validate_email(&self.email));

        if let Some(phone) = non_blank(&self.phone) {
            errors.check("phone", validate_phone(phone));
        }

        match non_blank(&self.password) {
            Some(pw) => {
                errors.check("password", require_password(pw, MIN_PASSWORD_STRENGTH));
            }
            None if creating => {
                errors.check("password", require_password("", MIN_PASSWORD_STRENGTH));
            }
            None => {}
        }

        errors.into_result()
    }

    pub fn phone(&self) -> Option<String> {
        non_blank(&self.phone).map(str::to_string)
    }

    pub fn new_password(&self) -> Option<&str> {
        non_blank(&self.password)
    }
}

// =============================================================================
// Register (self sign-up)
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        errors
            .check("name", validate_required("nombre", &self.name))
            .check("email", validate_email(&self.email))
            .check(
                "password",
                require_password(&self.password, MIN_PASSWORD_STRENGTH),
            );

        if let Some(phone) = non_blank(&self.phone) {
            errors.check("phone", validate_phone(phone));
        }

        if self.password != self.confirm_password {
            errors.insert("confirmPassword", "Las contraseñas no coinciden");
        }

        errors.into_result()
    }

    pub fn phone(&self) -> Option<String> {
        non_blank(&self.phone).map(str::to_string)
    }
}

// =============================================================================
// Orders
// =============================================================================

/// One requested line of a compra or venta.
///
/// `precio` is the purchase cost for compras. Ventas ignore it and use
/// the product's current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineaForm {
    pub producto_id: String,
    pub cantidad: i64,
    #[serde(default)]
    pub precio: Option<Money>,
}

/// Validates order lines. Keys are `productos[i]`.
pub fn validate_lineas(lineas: &[LineaForm]) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();

    if lineas.is_empty() {
        errors.insert("productos", "La orden debe tener al menos un producto");
    }

    for (i, linea) in lineas.iter().enumerate() {
        let key = format!("productos[{}]", i);
        errors.check(&key, validate_required("producto", &linea.producto_id));
        errors.check(&key, validate_quantity(linea.cantidad));
        if let Some(precio) = linea.precio {
            errors.check(&key, validate_precio(precio));
        }
    }

    errors.into_result()
}

// =============================================================================
// Cita
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CitaForm {
    #[ts(as = "String")]
    pub fecha: NaiveDate,
    #[ts(as = "String")]
    pub hora: NaiveTime,
    pub motivo: String,
    #[serde(default)]
    pub notas: Option<String>,
}

impl CitaForm {
    /// Validates against `today`; appointments cannot be booked in the past.
    pub fn validate(&self, today: NaiveDate) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        errors.check("motivo", validate_required("motivo", &self.motivo));
        if self.fecha < today {
            errors.insert("fecha", "La fecha de la cita no puede estar en el pasado");
        }
        errors.into_result()
    }

    pub fn notas(&self) -> Option<String> {
        non_blank(&self.notas).map(str::to_string)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn producto_form() -> ProductoForm {
        ProductoForm {
            codigo: "IBU-400".to_string(),
            nombre: "Ibuprofeno 400mg".to_string(),
            descripcion: Some("  ".to_string()),
            precio: Money::from_pesos(12_000),
            stock: 0,
            categoria: "Analgésicos".to_string(),
            imagen: None,
            mostrar_en_catalogo: true,
        }
    }

    #[test]
    fn test_producto_form() {
        let form = producto_form();
        assert!(form.validate().is_ok());
        assert_eq!(form.descripcion(), None);

        let bad = ProductoForm {
            codigo: " ".to_string(),
            precio: Money::zero(),
            stock: -1,
            ..producto_form()
        };
        let errors = bad.validate().unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["codigo", "precio", "stock"]);
    }

    #[test]
    fn test_producto_form_caps_precio_and_stock() {
        let huge = ProductoForm {
            precio: Money::from_centavos(i64::MAX / 2),
            stock: i64::MAX,
            ..producto_form()
        };
        let errors = huge.validate().unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["precio", "stock"]);
    }

    #[test]
    fn test_proveedor_form() {
        let form = ProveedorForm {
            nombre: "Droguería Central".to_string(),
            nit: "900123456".to_string(),
            email: "ventas@central.co".to_string(),
            telefono: "6011234567".to_string(),
            direccion: None,
        };
        assert!(form.validate().is_ok());

        let bad = ProveedorForm {
            nit: "12".to_string(),
            telefono: "601-123-4567".to_string(),
            ..form
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.get("nit").is_some());
        assert!(errors.get("telefono").is_some());
    }

    #[test]
    fn test_usuario_form_password_required_only_on_create() {
        let form = UsuarioForm {
            name: "Luis".to_string(),
            email: "luis@farmacia.co".to_string(),
            phone: None,
            role: Role::Empleado,
            active: true,
            password: None,
        };
        assert!(form.validate(true).is_err());
        assert!(form.validate(false).is_ok());

        let weak = UsuarioForm {
            password: Some("abc".to_string()),
            ..form
        };
        assert!(weak.validate(false).unwrap_err().get("password").is_some());
    }

    #[test]
    fn test_register_form_confirmation() {
        let form = RegisterForm {
            name: "Marta".to_string(),
            email: "marta@correo.com".to_string(),
            phone: Some("3109876543".to_string()),
            password: "Segura#2024".to_string(),
            confirm_password: "Segura#2025".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.get("confirmPassword").is_some());
    }

    #[test]
    fn test_validate_lineas() {
        assert!(validate_lineas(&[]).is_err());

        let ok = LineaForm {
            producto_id: "p1".to_string(),
            cantidad: 2,
            precio: Some(Money::from_pesos(100)),
        };
        assert!(validate_lineas(std::slice::from_ref(&ok)).is_ok());

        let bad = LineaForm {
            cantidad: 0,
            ..ok.clone()
        };
        let errors = validate_lineas(&[ok, bad]).unwrap_err();
        assert!(errors.get("productos[1]").is_some());
        assert!(errors.get("productos[0]").is_none());
    }

    #[test]
    fn test_cita_form_rejects_past_dates() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let form = CitaForm {
            fecha: NaiveDate::from_ymd_opt(2024, 5, 9).unwrap(),
            hora: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            motivo: "Toma de presión".to_string(),
            notas: None,
        };
        assert!(form.validate(today).unwrap_err().get("fecha").is_some());

        let future = CitaForm {
            fecha: today,
            ..form
        };
        assert!(future.validate(today).is_ok());
    }
}
