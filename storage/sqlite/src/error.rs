//! Error types for the SQLite storage engine

use inventory_core::InventoryError;
use thiserror::Error;

use crate::sql_builder::SqlGenerationError;

#[derive(Debug, Error)]
pub enum SqliteError {
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("SQL generation error: {0}")]
    SqlGeneration(#[from] SqlGenerationError),

    #[error("Task join error: {0}")]
    TaskJoin(String),
}

impl From<bb8::RunError<SqliteError>> for SqliteError {
    fn from(err: bb8::RunError<SqliteError>) -> Self {
        match err {
            bb8::RunError::User(e) => e,
            bb8::RunError::TimedOut => SqliteError::Pool("timed out waiting for a connection".to_string()),
        }
    }
}

impl From<SqliteError> for InventoryError {
    fn from(err: SqliteError) -> Self { InventoryError::StorageFailure(Box::new(err)) }
}
