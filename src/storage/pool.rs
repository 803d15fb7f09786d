//! Database connection pool management.
//!
//! This module initializes and configures the SQLite connection pool with:
//! - WAL mode enabled for concurrent access
//! - A busy timeout so concurrent writers queue instead of failing
//! - Foreign key enforcement
//! - Automatic database file creation

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{Pool, Sqlite, SqlitePool};

use crate::config::DB_BUSY_TIMEOUT_SECS;
use crate::error_handling::DatabaseError;

/// Initializes and returns a database connection pool for `db_path`.
///
/// Creates the database file if it doesn't exist.
pub async fn init_db_pool_with_path(
    db_path: &std::path::Path,
) -> Result<Arc<Pool<Sqlite>>, DatabaseError> {
    let db_path_str = db_path.to_string_lossy().to_string();
    match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(&db_path_str)
    {
        Ok(_) => info!("Database file created successfully."),
        Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
            info!("Database file already exists.")
        }
        Err(e) => {
            error!("Failed to create database file: {e}");
            return Err(DatabaseError::FileCreationError(e.to_string()));
        }
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path_str))
        .map_err(DatabaseError::SqlError)?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(DB_BUSY_TIMEOUT_SECS))
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(options).await.map_err(|e| {
        error!("Failed to connect to database: {e}");
        DatabaseError::SqlError(e)
    })?;

    Ok(Arc::new(pool))
}
