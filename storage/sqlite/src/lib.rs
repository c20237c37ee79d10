//! SQLite storage engine for the product catalog
//!
//! One file per store, one writer connection, and a bb8 pool of readers for
//! file-backed databases (WAL mode lets them run alongside the writer).
//!
//! # SQLite Version Requirements
//!
//! Quantity adjustment uses `UPDATE ... RETURNING`, which needs SQLite 3.35.0
//! or later. The `rusqlite` "bundled" feature ships a newer version.
//!
//! # Example
//!
//! ```rust,ignore
//! use inventory_core::Inventory;
//! use inventory_storage_sqlite::SqliteStorageEngine;
//! use std::sync::Arc;
//!
//! // Open a file-based database
//! let storage = SqliteStorageEngine::open("inventory.db").await?;
//!
//! // Or use an in-memory database for testing
//! let storage = SqliteStorageEngine::open_in_memory().await?;
//!
//! let inventory = Inventory::new(Arc::new(storage));
//! ```

mod connection;
mod engine;
mod error;
pub mod sql_builder;
mod value;

pub use connection::{SharedConnection, SqliteConfig, SqliteConnectionManager};
pub use engine::{SqliteStorageEngine, DEFAULT_POOL_SIZE};
pub use error::SqliteError;
