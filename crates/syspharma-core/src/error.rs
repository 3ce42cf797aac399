//! # Error Types
//!
//! Domain-specific error types for syspharma-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  syspharma-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Form field failures                            │
//! │                                                                         │
//! │  syspharma-store errors (separate crate)                               │
//! │  └── StoreError       - Local-storage failures                         │
//! │                                                                         │
//! │  Application errors (in app)                                           │
//! │  └── AppError         - What the toast shows                           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → AppError → Toast     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages are Spanish: they end up verbatim in toasts.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Selling or reserving more units than are in stock.
    ///
    /// ## When This Occurs
    /// - Adding to cart beyond the product's stock
    /// - Registering a venta whose line exceeds stock
    #[error("Stock insuficiente para {producto}: disponible {available}, solicitado {requested}")]
    InsufficientStock {
        producto: String,
        available: i64,
        requested: i64,
    },

    /// An appointment state change outside the allowed graph.
    #[error("No se puede pasar una cita de {from} a {to}")]
    InvalidTransition { from: String, to: String },

    /// An order (venta or compra) with no lines.
    #[error("La orden debe tener al menos un producto")]
    EmptyOrder,

    /// A total or stock count does not fit in the stored integer range.
    #[error("El valor de {what} excede el máximo permitido")]
    Overflow { what: String },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Form field validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("El campo {field} es obligatorio")]
    Required { field: String },

    #[error("El campo {field} debe tener al menos {min} caracteres")]
    TooShort { field: String, min: usize },

    #[error("El campo {field} debe tener máximo {max} caracteres")]
    TooLong { field: String, max: usize },

    /// Value must be strictly greater than zero.
    #[error("El campo {field} debe ser mayor que cero")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("El campo {field} no puede ser negativo")]
    MustBeNonNegative { field: String },

    /// Invalid format (email, phone, NIT).
    #[error("{field} no es válido: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two fields that must match do not (password confirmation).
    #[error("Los campos {field} no coinciden")]
    Mismatch { field: String },

    /// Password does not reach the required strength.
    #[error("La contraseña es demasiado débil")]
    WeakPassword,

    /// Value is not in the allowed set.
    #[error("{field} debe ser uno de: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate unique value (email, codigo, NIT).
    #[error("Ya existe un registro con {field} '{value}'")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::InvalidFormat`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            producto: "Acetaminofén 500mg".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Stock insuficiente para Acetaminofén 500mg: disponible 3, solicitado 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("nombre").to_string(),
            "El campo nombre es obligatorio"
        );

        let err = ValidationError::TooShort {
            field: "contraseña".to_string(),
            min: 8,
        };
        assert_eq!(
            err.to_string(),
            "El campo contraseña debe tener al menos 8 caracteres"
        );
    }

    #[test]
    fn test_overflow_message() {
        let err = CoreError::Overflow {
            what: "la orden".to_string(),
        };
        assert_eq!(err.to_string(), "El valor de la orden excede el máximo permitido");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("codigo").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "El campo codigo es obligatorio");
    }
}
