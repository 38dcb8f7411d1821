use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

#[cfg(feature = "sqlite")]
use crate::database::SqlitePool;
use super::errors::RepositoryError;

/// Key/value blob storage backed by the `local_storage` SQLite table
#[cfg(feature = "sqlite")]
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

#[cfg(feature = "sqlite")]
impl SqliteStorage {
    /// Wrap an initialized (migrated) pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the blob stored under `key`
    pub fn get_item(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        debug!("Reading blob from SQLite: key={}", key);

        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT value FROM local_storage WHERE key = ?1")?;

        match stmt.query_row([key], |row| row.get::<_, String>(0)) {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(RepositoryError::Sqlite(e)),
        }
    }

    /// Store `value` under `key`, replacing any previous blob
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        debug!("Writing blob to SQLite: key={}, bytes={}", key, value.len());

        let conn = self.pool.get()?;
        conn.execute(
            "INSERT OR REPLACE INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)",
            (key, value, chrono::Utc::now().to_rfc3339()),
        )?;

        Ok(())
    }

    /// Remove the blob stored under `key`
    pub fn remove_item(&self, key: &str) -> Result<(), RepositoryError> {
        debug!("Removing blob from SQLite: key={}", key);

        let conn = self.pool.get()?;
        conn.execute("DELETE FROM local_storage WHERE key = ?1", [key])?;

        Ok(())
    }
}

/// Blob storage in a single JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Use the file at `path`; it is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file, `None` when it does not exist yet
    pub fn read(&self) -> Result<Option<String>, RepositoryError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RepositoryError::Io(e)),
        }
    }

    /// Overwrite the whole file.
    ///
    /// The blob is written to a sibling temporary file and renamed over the
    /// target, so readers never observe a half-written file.
    pub fn write(&self, contents: &str) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, contents)?;
        fs::rename(&tmp_path, &self.path)?;

        debug!("Wrote {} bytes to {}", contents.len(), self.path.display());
        Ok(())
    }

    /// Delete the file if present
    pub fn remove(&self) -> Result<(), RepositoryError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RepositoryError::Io(e)),
        }
    }
}
