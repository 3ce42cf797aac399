//! # syspharma-store: Local Storage for SysPharma
//!
//! The persistence layer the dashboards treat as browser local storage: a
//! flat namespace of `syspharma_*` keys, each holding a JSON array, backed by
//! one SQLite table through sqlx. On top of it sit the storage-sync bus and
//! one repository per entity.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SysPharma Data Flow                              │
//! │                                                                         │
//! │  View operation (productos::crear)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  syspharma-store (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌───────────────┐   │   │
//! │  │   │  Repositories │──►│ LocalStorage  │──►│  StorageHub   │   │   │
//! │  │   │ (repository/) │   │ (storage.rs)  │   │  (events.rs)  │   │   │
//! │  │   └───────────────┘   └───────┬───────┘   └───────────────┘   │   │
//! │  │                               │                                │   │
//! │  │                       ┌───────▼───────┐   ┌───────────────┐   │   │
//! │  │                       │   Database    │   │  Migrations   │   │   │
//! │  │                       │   (pool.rs)   │   │  (embedded)   │   │   │
//! │  │                       └───────────────┘   └───────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  local_storage(key, value, updated_at)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use syspharma_store::{Database, StoreConfig};
//!
//! let db = Database::new(StoreConfig::new("syspharma.db")).await?;
//! let storage = db.open_tab();
//!
//! let productos = storage.productos().list().await?;
//! storage.bus().trigger_update();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod events;
pub mod keys;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod storage;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use events::{
    CustomEvent, Notification, StorageEvent, StorageHub, Subscription, SyncCounter, TabBus, TabId,
};
pub use pool::{Database, StoreConfig};
pub use repository::{
    generate_id, CartRepository, CitaRepository, Collection, CompraRepository, ProductoRepository,
    ProveedorRepository, Record, SessionRepository, UserRepository, VentaRepository,
};
pub use storage::LocalStorage;
