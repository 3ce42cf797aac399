//! # Store Error Types
//!
//! Error types for local-storage and repository operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / serde_json::Error                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds entity/field context                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppError (in app) ← Code + Spanish toast message                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Local-storage operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with that id under the entity's key.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A unique field (email, codigo, NIT) already exists in the loaded array.
    ///
    /// Checked against the array read just before the write; there is no
    /// lock between the check and the write.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A stock adjustment would leave a product below zero units.
    #[error("Stock for {id} cannot go below zero: {stock} on hand, change {delta}")]
    NegativeStock { id: String, stock: i64, delta: i64 },

    /// A stock adjustment would exceed the integer range.
    #[error("Stock for {id} out of range: {stock} on hand, change {delta}")]
    StockOverflow { id: String, stock: i64, delta: i64 },

    /// A stored value is not valid JSON for its record type.
    #[error("Malformed value under '{key}': {message}")]
    Malformed { key: String, message: String },

    /// Serializing a record failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Opening the SQLite file failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        StoreError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn malformed(key: impl Into<String>, err: serde_json::Error) -> Self {
        StoreError::Malformed {
            key: key.into(),
            message: err.to_string(),
        }
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → StoreError::NotFound
/// sqlx::Error::Database       → StoreError::QueryFailed
/// sqlx::Error::PoolTimedOut   → StoreError::PoolExhausted
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: "Key".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => StoreError::QueryFailed(db_err.message().to_string()),

            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,

            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),

            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
