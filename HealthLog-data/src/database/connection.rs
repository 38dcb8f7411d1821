//! Storage configuration and connection module for HealthLog
//!
//! Records are kept as one serialized blob. Three backends are supported:
//! - SQLite key/value table (default)
//! - JSON file
//! - In-memory (nothing survives the process)

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[cfg(feature = "sqlite")]
use std::sync::Arc;
#[cfg(feature = "sqlite")]
use tracing::error;

/// Pooled SQLite connections
#[cfg(feature = "sqlite")]
pub type SqlitePool = Arc<r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>>;

/// Supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// SQLite database file
    #[cfg(feature = "sqlite")]
    Sqlite,
    /// Plain JSON file
    JsonFile,
    /// Process memory only
    Memory,
}

impl FromStr for StorageType {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            #[cfg(feature = "sqlite")]
            "sqlite" => Ok(StorageType::Sqlite),
            "json" | "json-file" | "file" => Ok(StorageType::JsonFile),
            "memory" | "in-memory" => Ok(StorageType::Memory),
            _ => Err(DatabaseError::UnsupportedStorageType(s.to_string())),
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "sqlite")]
            StorageType::Sqlite => write!(f, "sqlite"),
            StorageType::JsonFile => write!(f, "json"),
            StorageType::Memory => write!(f, "memory"),
        }
    }
}

/// Storage and connection errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// SQLite connection pool error
    #[cfg(feature = "sqlite")]
    #[error("SQLite connection pool error: {0}")]
    SqlitePoolError(#[from] r2d2::Error),

    /// Filesystem error while preparing the storage location
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unsupported storage type
    #[error("Unsupported storage type: {0}")]
    UnsupportedStorageType(String),

    /// Migration error
    #[error("Database migration error: {0}")]
    MigrationError(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Backend holding the records blob
    pub storage_type: StorageType,
    /// Path to SQLite database file
    pub sqlite_path: PathBuf,
    /// Path to the JSON records file
    pub json_path: PathBuf,
    /// Maximum number of pooled SQLite connections
    pub pool_size: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: default_storage_type(),
            sqlite_path: PathBuf::from("./data/healthlog.db"),
            json_path: PathBuf::from("./data/records.json"),
            pool_size: 4,
            timeout_seconds: 30,
        }
    }
}

#[cfg(feature = "sqlite")]
fn default_storage_type() -> StorageType {
    StorageType::Sqlite
}

#[cfg(not(feature = "sqlite"))]
fn default_storage_type() -> StorageType {
    StorageType::JsonFile
}

impl StorageConfig {
    /// Create a storage configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let defaults = Self::default();

        let storage_type = match env::var("HEALTHLOG_STORAGE") {
            Ok(value) => value.parse::<StorageType>()?,
            Err(_) => defaults.storage_type,
        };

        let sqlite_path = env::var("HEALTHLOG_SQLITE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.sqlite_path);

        let json_path = env::var("HEALTHLOG_JSON_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.json_path);

        let pool_size = env::var("HEALTHLOG_POOL_SIZE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(defaults.pool_size);

        let timeout_seconds = env::var("HEALTHLOG_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_seconds);

        info!(
            "Storage configuration: type={}, pool_size={}, timeout={}s",
            storage_type, pool_size, timeout_seconds
        );

        Ok(StorageConfig {
            storage_type,
            sqlite_path,
            json_path,
            pool_size,
            timeout_seconds,
        })
    }

    /// Human-readable location of the configured backend
    pub fn location(&self) -> String {
        match self.storage_type {
            #[cfg(feature = "sqlite")]
            StorageType::Sqlite => format!("SQLite database at {}", self.sqlite_path.display()),
            StorageType::JsonFile => format!("JSON file at {}", self.json_path.display()),
            StorageType::Memory => "in-memory storage".to_string(),
        }
    }
}

/// Open a SQLite pool on the configured file.
///
/// A file that cannot be created or opened is an error; records are never
/// silently kept in memory instead.
#[cfg(feature = "sqlite")]
pub fn open_sqlite_pool(config: &StorageConfig) -> Result<SqlitePool, DatabaseError> {
    use rusqlite::OpenFlags;
    use std::fs;

    let path = &config.sqlite_path;
    info!("Initializing SQLite database at: {}", path.display());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create directory {:?}: {}", parent, e);
                return Err(DatabaseError::Io(e));
            }
        }
    }

    let manager = r2d2_sqlite::SqliteConnectionManager::file(path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

    let pool = match r2d2::Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .build(manager)
    {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open SQLite database at {}: {}", path.display(), e);
            return Err(DatabaseError::SqlitePoolError(e));
        }
    };

    let conn = pool.get()?;
    super::migrations::run_sqlite_migrations(&conn)?;

    info!("SQLite connection pool created successfully");
    Ok(Arc::new(pool))
}

/// Open an in-memory SQLite database.
///
/// Every in-memory connection is a separate database, so the pool holds a
/// single connection.
#[cfg(feature = "sqlite")]
pub fn open_in_memory_sqlite_pool(config: &StorageConfig) -> Result<SqlitePool, DatabaseError> {
    info!("Initializing in-memory SQLite database");

    let manager = r2d2_sqlite::SqliteConnectionManager::memory();
    let pool = r2d2::Pool::builder()
        .max_size(1)
        .connection_timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .build(manager)?;

    let conn = pool.get()?;
    super::migrations::run_sqlite_migrations(&conn)?;

    info!("In-memory SQLite database initialized successfully");
    Ok(Arc::new(pool))
}
