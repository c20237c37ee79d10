//! rusqlite connections, shared behind a mutex and pooled with bb8

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::SqliteError;

/// Where the product table lives
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SqliteConfig {
    /// File-backed database
    File(PathBuf),
    /// In-memory database (for testing). Lives as long as its single connection.
    Memory,
}

impl SqliteConfig {
    pub fn is_memory(&self) -> bool { matches!(self, SqliteConfig::Memory) }
}

/// Opens rusqlite connections for one [`SqliteConfig`]; also the bb8 manager for reader pools.
pub struct SqliteConnectionManager {
    config: SqliteConfig,
}

impl SqliteConnectionManager {
    pub fn new(config: SqliteConfig) -> Self { Self { config } }

    pub(crate) fn create_connection(&self) -> Result<Connection, SqliteError> {
        let conn = match &self.config {
            SqliteConfig::File(path) => {
                debug!("Opening SQLite database at {}", path.display());
                let conn = Connection::open(path)?;
                // WAL lets readers run alongside the single writer
                conn.execute_batch(
                    "PRAGMA journal_mode=WAL;
                     PRAGMA synchronous=NORMAL;",
                )?;
                conn
            }
            SqliteConfig::Memory => Connection::open_in_memory()?,
        };
        conn.execute_batch("PRAGMA temp_store=MEMORY;")?;
        Ok(conn)
    }

    /// Opens a connection off the async runtime
    pub(crate) async fn connect_blocking(config: SqliteConfig) -> Result<SharedConnection, SqliteError> {
        tokio::task::spawn_blocking(move || SqliteConnectionManager::new(config).create_connection().map(SharedConnection::new))
            .await
            .map_err(|e| SqliteError::TaskJoin(e.to_string()))?
    }
}

/// A rusqlite connection usable from async code
///
/// rusqlite::Connection is not Sync, so it sits behind a mutex and every call
/// runs on the blocking thread pool.
pub struct SharedConnection {
    inner: Arc<Mutex<Connection>>,
}

impl SharedConnection {
    pub fn new(conn: Connection) -> Self { Self { inner: Arc::new(Mutex::new(conn)) } }

    /// Runs `f` with exclusive access to the connection on a blocking thread.
    ///
    /// The closure runs to completion even if the returned future is dropped.
    pub async fn with_connection<F, T>(&self, f: F) -> Result<T, SqliteError>
    where
        F: FnOnce(&mut Connection) -> Result<T, SqliteError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.blocking_lock();
            f(&mut guard)
        })
        .await
        .map_err(|e| SqliteError::TaskJoin(e.to_string()))?
    }
}

impl Clone for SharedConnection {
    fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl bb8::ManageConnection for SqliteConnectionManager {
    type Connection = SharedConnection;
    type Error = SqliteError;

    fn connect(&self) -> impl std::future::Future<Output = Result<Self::Connection, Self::Error>> + Send {
        SqliteConnectionManager::connect_blocking(self.config.clone())
    }

    #[allow(refining_impl_trait)]
    fn is_valid<'a, 'b>(&'a self, conn: &'b mut Self::Connection) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send {
        let conn = conn.clone();
        async move { conn.with_connection(|c| c.execute_batch("SELECT 1").map_err(SqliteError::from)).await }
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool { false }
}
