//! # App Error Type
//!
//! Unified error type for view operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in SysPharma                              │
//! │                                                                         │
//! │  View operation (productos::crear)                                     │
//! │         │                                                               │
//! │         ├── FormErrors        ──► VALIDATION_ERROR (+ per-field map)   │
//! │         ├── StoreError::UniqueViolation ──► DUPLICATE                  │
//! │         ├── StoreError::NotFound        ──► NOT_FOUND                  │
//! │         ├── CoreError::InsufficientStock ─► INSUFFICIENT_STOCK         │
//! │         ├── CoreError::InvalidTransition ─► INVALID_TRANSITION         │
//! │         ├── bad credentials   ──► AUTH_FAILED                          │
//! │         ├── wrong role        ──► FORBIDDEN                            │
//! │         └── anything else     ──► STORAGE_ERROR                        │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │               AppError { code, message, fields }                       │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │               Toast (error, Spanish message)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages are Spanish: the front end shows them verbatim.

use serde::Serialize;
use syspharma_core::{CoreError, FormErrors, ValidationError};
use syspharma_store::StoreError;

/// Error returned from every view operation.
///
/// ## Serialization
/// ```json
/// {
///   "code": "DUPLICATE",
///   "message": "Ya existe un producto con el código ACE-500",
///   "fields": null
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Spanish message for the toast
    pub message: String,

    /// Per-field messages when a form failed
    pub fields: Option<FormErrors>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A form field failed validation
    ValidationError,

    /// Email, codigo or NIT already present
    Duplicate,

    NotFound,

    /// Login mismatch or inactive account
    AuthFailed,

    /// No session, or the session's role may not do this
    Forbidden,

    /// Local storage failed or held malformed data
    StorageError,

    InsufficientStock,

    /// Cita estado change outside the allowed graph
    InvalidTransition,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
            fields: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        AppError::new(
            ErrorCode::NotFound,
            format!("{} no encontrado: {}", entity, id),
        )
    }

    /// The one message every login failure shows.
    pub fn invalid_credentials() -> Self {
        AppError::new(ErrorCode::AuthFailed, "Credenciales inválidas")
    }

    pub fn forbidden() -> Self {
        AppError::new(
            ErrorCode::Forbidden,
            "No tiene permisos para realizar esta acción",
        )
    }

    pub fn unauthenticated() -> Self {
        AppError::new(ErrorCode::Forbidden, "Debe iniciar sesión")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::StorageError, message)
    }
}

fn field_label(field: &str) -> &str {
    match field {
        "email" => "el correo",
        "codigo" => "el código",
        "nit" => "el NIT",
        other => other,
    }
}

fn entity_label(field: &str) -> &'static str {
    match field {
        "email" => "un usuario",
        "codigo" => "un producto",
        "nit" => "un proveedor",
        _ => "un registro",
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => AppError::not_found(&entity, &id),
            StoreError::UniqueViolation { field, value } => AppError::new(
                ErrorCode::Duplicate,
                format!(
                    "Ya existe {} con {} {}",
                    entity_label(&field),
                    field_label(&field),
                    value
                ),
            ),
            StoreError::NegativeStock { id, stock, delta } => AppError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Stock insuficiente para {}: disponible {}, solicitado {}",
                    id, stock, -delta
                ),
            ),
            StoreError::StockOverflow { id, .. } => AppError::validation(format!(
                "El stock de {} excede el máximo permitido",
                id
            )),
            StoreError::Malformed { key, message } => {
                tracing::error!(key = %key, "Malformed stored value: {}", message);
                AppError::internal("Los datos almacenados están dañados")
            }
            other => {
                tracing::error!("Storage operation failed: {}", other);
                AppError::internal("Error al acceder al almacenamiento local")
            }
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock { .. } => {
                AppError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::InvalidTransition { .. } => {
                AppError::new(ErrorCode::InvalidTransition, err.to_string())
            }
            CoreError::EmptyOrder | CoreError::Overflow { .. } => {
                AppError::validation(err.to_string())
            }
            CoreError::Validation(e) => AppError::from(e),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        let code = match err {
            ValidationError::Duplicate { .. } => ErrorCode::Duplicate,
            _ => ErrorCode::ValidationError,
        };
        AppError::new(code, err.to_string())
    }
}

/// Form failures keep the per-field map; the toast shows the summary.
impl From<FormErrors> for AppError {
    fn from(errors: FormErrors) -> Self {
        AppError {
            code: ErrorCode::ValidationError,
            message: errors.to_string(),
            fields: Some(errors),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message() {
        let err: AppError = StoreError::duplicate("codigo", "ACE-500").into();
        assert_eq!(err.code, ErrorCode::Duplicate);
        assert_eq!(err.message, "Ya existe un producto con el código ACE-500");
    }

    #[test]
    fn test_code_serializes_screaming() {
        let json = serde_json::to_value(AppError::invalid_credentials()).unwrap();
        assert_eq!(json["code"], "AUTH_FAILED");
    }

    #[test]
    fn test_form_errors_keep_fields() {
        let mut errors = FormErrors::new();
        errors.insert("nit", "NIT no es válido");
        let err = AppError::from(errors);
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.fields.as_ref().and_then(|f| f.get("nit")), Some("NIT no es válido"));
    }

    #[test]
    fn test_internal_details_are_not_shown() {
        let err: AppError = StoreError::QueryFailed("disk I/O error".into()).into();
        assert_eq!(err.code, ErrorCode::StorageError);
        assert!(!err.message.contains("disk"));
    }
}
