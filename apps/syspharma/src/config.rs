//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SYSPHARMA_DB_PATH=/data/syspharma.db                               │
//! │     SYSPHARMA_LOAD_DELAY_MS=0                                          │
//! │     SYSPHARMA_LOW_STOCK_THRESHOLD=10                                   │
//! │     SYSPHARMA_ADMIN_EMAIL=admin@farmacia.co                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/syspharma/syspharma.toml (Linux)                         │
//! │     ~/Library/Application Support/co.syspharma.syspharma/ (macOS)      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [storage]
//! path = "/var/lib/syspharma/syspharma.db"
//! max_connections = 5
//! load_delay_ms = 500
//!
//! [bus]
//! capacity = 256
//!
//! [inventory]
//! low_stock_threshold = 5
//!
//! [admin]
//! name = "Administrador"
//! email = "admin@syspharma.com"
//! password = "Admin#2024"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use syspharma_core::forms::MIN_PASSWORD_STRENGTH;
use syspharma_core::validation::{validate_email, validate_password};
use syspharma_store::StoreConfig;
use thiserror::Error;
use tracing::{debug, info, warn};

const CONFIG_FILE: &str = "syspharma.toml";
const DB_FILE: &str = "syspharma.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file. Defaults to the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Simulated latency before a view lists its records.
    #[serde(default = "default_load_delay")]
    pub load_delay_ms: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_load_delay() -> u64 {
    500
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            path: None,
            max_connections: default_max_connections(),
            load_delay_ms: default_load_delay(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusSettings {
    /// Events buffered per subscriber.
    #[serde(default = "default_bus_capacity")]
    pub capacity: usize,
}

fn default_bus_capacity() -> usize {
    256
}

impl Default for BusSettings {
    fn default() -> Self {
        BusSettings {
            capacity: default_bus_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySettings {
    /// Products at or below this stock show up as low stock.
    #[serde(default = "default_low_stock")]
    pub low_stock_threshold: i64,
}

fn default_low_stock() -> i64 {
    5
}

impl Default for InventorySettings {
    fn default() -> Self {
        InventorySettings {
            low_stock_threshold: default_low_stock(),
        }
    }
}

/// The account created on first boot when no admin exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSettings {
    #[serde(default = "default_admin_name")]
    pub name: String,

    #[serde(default = "default_admin_email")]
    pub email: String,

    #[serde(default = "default_admin_password")]
    pub password: String,
}

fn default_admin_name() -> String {
    "Administrador".to_string()
}

fn default_admin_email() -> String {
    "admin@syspharma.com".to_string()
}

fn default_admin_password() -> String {
    "Admin#2024".to_string()
}

impl Default for AdminSettings {
    fn default() -> Self {
        AdminSettings {
            name: default_admin_name(),
            email: default_admin_email(),
            password: default_admin_password(),
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub bus: BusSettings,

    #[serde(default)]
    pub inventory: InventorySettings,

    #[serde(default)]
    pub admin: AdminSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (syspharma.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Configuration for tests: in-memory storage and no simulated latency.
    pub fn in_memory() -> Self {
        let mut config = Self::default();
        config.storage.path = Some(PathBuf::from(":memory:"));
        config.storage.load_delay_ms = 0;
        config
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::Invalid("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.storage.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "storage.max_connections must be greater than 0".into(),
            ));
        }

        if self.bus.capacity == 0 {
            return Err(ConfigError::Invalid(
                "bus.capacity must be greater than 0".into(),
            ));
        }

        if self.inventory.low_stock_threshold < 0 {
            return Err(ConfigError::Invalid(
                "inventory.low_stock_threshold cannot be negative".into(),
            ));
        }

        if self.admin.name.trim().is_empty() {
            return Err(ConfigError::Invalid("admin.name is required".into()));
        }

        validate_email(&self.admin.email)
            .map_err(|e| ConfigError::Invalid(format!("admin.email: {}", e)))?;

        if validate_password(&self.admin.password).strength < MIN_PASSWORD_STRENGTH {
            return Err(ConfigError::Invalid(
                "admin.password is too weak".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("SYSPHARMA_DB_PATH") {
            debug!(path = %path, "Overriding storage path from environment");
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Ok(delay) = std::env::var("SYSPHARMA_LOAD_DELAY_MS") {
            match delay.parse::<u64>() {
                Ok(ms) => self.storage.load_delay_ms = ms,
                Err(_) => warn!(value = %delay, "Ignoring invalid SYSPHARMA_LOAD_DELAY_MS"),
            }
        }

        if let Ok(threshold) = std::env::var("SYSPHARMA_LOW_STOCK_THRESHOLD") {
            match threshold.parse::<i64>() {
                Ok(t) => self.inventory.low_stock_threshold = t,
                Err(_) => {
                    warn!(value = %threshold, "Ignoring invalid SYSPHARMA_LOW_STOCK_THRESHOLD")
                }
            }
        }

        if let Ok(email) = std::env::var("SYSPHARMA_ADMIN_EMAIL") {
            self.admin.email = email;
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("co", "syspharma", "syspharma")
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Storage file: configured path, else the platform data dir.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.path {
            return path.clone();
        }
        match Self::project_dirs() {
            Some(dirs) => dirs.data_dir().join(DB_FILE),
            None => PathBuf::from(DB_FILE),
        }
    }

    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.storage.load_delay_ms)
    }

    pub fn store_config(&self) -> StoreConfig {
        let path = self.database_path();
        let base = if path.as_os_str() == ":memory:" {
            StoreConfig::in_memory()
        } else {
            StoreConfig::new(path).max_connections(self.storage.max_connections)
        };
        base.bus_capacity(self.bus.capacity)
    }
}
