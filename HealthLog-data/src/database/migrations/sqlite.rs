use rusqlite::Connection;
use tracing::{debug, info};

use crate::database::DatabaseError;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    debug!("Running SQLite migrations");

    create_local_storage_table(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the key/value table that holds serialized blobs
fn create_local_storage_table(conn: &Connection) -> Result<(), DatabaseError> {
    debug!("Creating local_storage table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS local_storage (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| DatabaseError::MigrationError(format!("Failed to create local_storage: {}", e)))?;

    Ok(())
}
