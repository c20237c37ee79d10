//! SQLite storage engine implementation

use std::path::Path;

use async_trait::async_trait;
use inventory_core::schema::{create_table_sql, SCHEMA_VERSION, TABLE_NAME};
use inventory_core::{InventoryError, Predicate, Product, ProductStorage, ProductValues, Selection};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::connection::{SharedConnection, SqliteConfig, SqliteConnectionManager};
use crate::error::SqliteError;
use crate::sql_builder::SqlBuilder;
use crate::value::product_from_row;

/// Default size of the reader pool for file-backed databases
pub const DEFAULT_POOL_SIZE: u32 = 4;

/// SQLite storage engine
///
/// All writes go through one connection. File-backed databases also get a
/// pool of reader connections so reads can run alongside the writer.
pub struct SqliteStorageEngine {
    config: SqliteConfig,
    writer: SharedConnection,
    readers: Option<bb8::Pool<SqliteConnectionManager>>,
}

impl SqliteStorageEngine {
    /// Open a file-based SQLite database, creating the product table if needed
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SqliteError> {
        Self::open_with(SqliteConfig::File(path.as_ref().to_path_buf()), DEFAULT_POOL_SIZE).await
    }

    /// Open an in-memory SQLite database (for testing)
    pub async fn open_in_memory() -> Result<Self, SqliteError> { Self::open_with(SqliteConfig::Memory, 1).await }

    /// Open with an explicit config and reader pool size.
    ///
    /// In-memory databases ignore `pool_size` and read through the writer,
    /// since each in-memory connection is its own database.
    pub async fn open_with(config: SqliteConfig, pool_size: u32) -> Result<Self, SqliteError> {
        let writer = SqliteConnectionManager::connect_blocking(config.clone()).await?;
        let stored = writer.with_connection(|c| schema_version(c)).await?;

        let engine = Self { config: config.clone(), writer, readers: None };
        if stored == 0 {
            info!("Creating {} table (schema version {})", TABLE_NAME, SCHEMA_VERSION);
            engine.writer.with_connection(|c| create_table(c, SCHEMA_VERSION)).await?;
        } else if stored > SCHEMA_VERSION {
            return Err(SqliteError::Schema(format!(
                "database schema version {} is newer than supported version {}",
                stored, SCHEMA_VERSION
            )));
        } else if stored != SCHEMA_VERSION {
            engine.migrate(stored, SCHEMA_VERSION).await?;
        }

        let readers = match config {
            SqliteConfig::Memory => None,
            SqliteConfig::File(_) => {
                let manager = SqliteConnectionManager::new(config);
                Some(bb8::Pool::builder().max_size(pool_size.max(1)).build(manager).await?)
            }
        };

        Ok(Self { readers, ..engine })
    }

    /// Moves the store from `old_version` to `new_version`.
    ///
    /// There is a single schema version, so the only upgrade path is to drop
    /// the table and recreate it. Existing rows are lost.
    pub async fn migrate(&self, old_version: u32, new_version: u32) -> Result<(), SqliteError> {
        if new_version != SCHEMA_VERSION {
            return Err(SqliteError::Schema(format!("cannot migrate to unknown schema version {}", new_version)));
        }
        if old_version == new_version {
            return Ok(());
        }
        warn!("Migrating {} table from version {} to {}: dropping existing rows", TABLE_NAME, old_version, new_version);
        self.writer
            .with_connection(move |c| {
                let tx = c.transaction()?;
                tx.execute(&format!(r#"DROP TABLE IF EXISTS "{}""#, TABLE_NAME), [])?;
                create_table(&tx, new_version)?;
                tx.commit()?;
                Ok(())
            })
            .await
    }

    /// Schema version stamped on the open database
    pub async fn schema_version(&self) -> Result<u32, SqliteError> { self.writer.with_connection(|c| schema_version(c)).await }

    pub fn config(&self) -> &SqliteConfig { &self.config }

    /// Runs a read on a pooled reader, or on the writer for in-memory databases
    async fn read<F, T>(&self, f: F) -> Result<T, SqliteError>
    where
        F: FnOnce(&mut Connection) -> Result<T, SqliteError> + Send + 'static,
        T: Send + 'static,
    {
        match &self.readers {
            Some(pool) => {
                let conn = pool.get().await?;
                conn.with_connection(f).await
            }
            None => self.writer.with_connection(f).await,
        }
    }
}

fn schema_version(conn: &Connection) -> Result<u32, SqliteError> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

fn create_table(conn: &Connection, version: u32) -> Result<(), SqliteError> {
    let query = create_table_sql();
    debug!("Creating product table: {}", query);
    conn.execute(&query, [])?;
    conn.execute_batch(&format!("PRAGMA user_version = {}", version))?;
    Ok(())
}

#[async_trait]
impl ProductStorage for SqliteStorageEngine {
    async fn query(&self, selection: &Selection) -> Result<Vec<Product>, InventoryError> {
        let (sql, params) = SqlBuilder::new().select(selection);
        debug!("query SQL: {} with {} params", sql, params.len());

        let products = self
            .read(move |c| {
                let mut stmt = c.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(params.iter()), product_from_row)?;
                let products = rows.collect::<Result<Vec<_>, _>>()?;
                Ok(products)
            })
            .await?;
        Ok(products)
    }

    async fn insert(&self, values: &ProductValues) -> Result<i64, InventoryError> {
        let (sql, params) = SqlBuilder::new().insert(values);
        debug!("insert SQL: {}", sql);

        let id = self
            .writer
            .with_connection(move |c| {
                c.execute(&sql, params_from_iter(params.iter()))?;
                Ok(c.last_insert_rowid())
            })
            .await
            .inspect_err(|e| warn!("Failed to insert row into {}: {}", TABLE_NAME, e))?;
        Ok(id)
    }

    async fn update(&self, predicate: &Predicate, values: &ProductValues) -> Result<usize, InventoryError> {
        let (sql, params) = SqlBuilder::new().update(predicate, values).map_err(SqliteError::from)?;
        debug!("update SQL: {} with {} params", sql, params.len());

        let rows = self.writer.with_connection(move |c| Ok(c.execute(&sql, params_from_iter(params.iter()))?)).await?;
        Ok(rows)
    }

    async fn delete(&self, predicate: &Predicate) -> Result<usize, InventoryError> {
        let (sql, params) = SqlBuilder::new().delete(predicate);
        debug!("delete SQL: {} with {} params", sql, params.len());

        let rows = self.writer.with_connection(move |c| Ok(c.execute(&sql, params_from_iter(params.iter()))?)).await?;
        Ok(rows)
    }

    async fn adjust_quantity(&self, id: i64, delta: i64) -> Result<Option<i64>, InventoryError> {
        let (sql, params) = SqlBuilder::new().adjust_quantity(id, delta);
        debug!("adjust_quantity SQL: {}", sql);

        let quantity = self
            .writer
            .with_connection(move |c| Ok(c.query_row(&sql, params_from_iter(params.iter()), |row| row.get::<_, i64>(0)).optional()?))
            .await?;
        Ok(quantity)
    }

    async fn count(&self, predicate: &Predicate) -> Result<usize, InventoryError> {
        let mut builder = SqlBuilder::new();
        builder.predicate(predicate);
        let (clause, params) = builder.build_where_clause();
        let sql = format!(r#"SELECT COUNT(*) FROM "{}" WHERE {}"#, TABLE_NAME, clause);

        let count: i64 = self.read(move |c| Ok(c.query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?)).await?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventory_core::{Column, NewProduct};

    fn widget() -> NewProduct {
        NewProduct {
            name: "Widget".into(),
            brand: "Acme".into(),
            price: 500,
            quantity: 10,
            image: "img://1".into(),
            supplier_name: "Acme Co".into(),
            supplier_phone: "555-0100".into(),
            supplier_email: "a@acme.test".into(),
        }
    }

    #[tokio::test]
    async fn test_open_in_memory() -> anyhow::Result<()> {
        let engine = SqliteStorageEngine::open_in_memory().await?;
        assert_eq!(engine.schema_version().await?, SCHEMA_VERSION);
        assert!(engine.query(&Selection::all()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_not_null_constraint_is_a_storage_failure() -> anyhow::Result<()> {
        let engine = SqliteStorageEngine::open_in_memory().await?;
        // Bypasses validation: the table itself rejects the missing columns
        let values = ProductValues::new().with(Column::Name, "Widget");
        let err = engine.insert(&values).await.unwrap_err();
        assert!(matches!(err, InventoryError::StorageFailure(_)), "{err:?}");
        assert_eq!(engine.count(&Predicate::True).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_quantity_defaults_to_zero() -> anyhow::Result<()> {
        let engine = SqliteStorageEngine::open_in_memory().await?;
        let mut values: ProductValues = widget().into();
        values.remove(Column::Quantity);
        let id = engine.insert(&values).await?;

        let rows = engine.query(&Selection::filter(Predicate::id(id))).await?;
        assert_eq!(rows[0].quantity, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_adjust_quantity_guard() -> anyhow::Result<()> {
        let engine = SqliteStorageEngine::open_in_memory().await?;
        let id = engine.insert(&widget().into()).await?;

        assert_eq!(engine.adjust_quantity(id, 1).await?, Some(11));
        assert_eq!(engine.adjust_quantity(id, -11).await?, Some(0));
        assert_eq!(engine.adjust_quantity(id, -1).await?, None);
        assert_eq!(engine.adjust_quantity(id + 100, 1).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_adjust_quantity_never_overflows() -> anyhow::Result<()> {
        let engine = SqliteStorageEngine::open_in_memory().await?;
        let id = engine.insert(&widget().into()).await?;

        assert_eq!(engine.adjust_quantity(id, i64::MAX).await?, None);
        assert_eq!(engine.adjust_quantity(id, i64::MIN).await?, None);
        assert_eq!(engine.adjust_quantity(id, i64::MAX - 10).await?, Some(i64::MAX));
        assert_eq!(engine.adjust_quantity(id, 1).await?, None);

        let rows = engine.query(&Selection::all()).await?;
        assert_eq!(rows[0].quantity, i64::MAX);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_update_is_a_generation_error() -> anyhow::Result<()> {
        let engine = SqliteStorageEngine::open_in_memory().await?;
        let err = engine.update(&Predicate::True, &ProductValues::new()).await.unwrap_err();
        match err {
            InventoryError::StorageFailure(source) => {
                assert!(matches!(source.downcast_ref::<SqliteError>(), Some(SqliteError::SqlGeneration(_))), "{source}")
            }
            other => panic!("expected StorageFailure, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_migrate_recreates_table() -> anyhow::Result<()> {
        let engine = SqliteStorageEngine::open_in_memory().await?;
        engine.insert(&widget().into()).await?;

        engine.migrate(0, SCHEMA_VERSION).await?;
        assert_eq!(engine.count(&Predicate::True).await?, 0);
        assert_eq!(engine.schema_version().await?, SCHEMA_VERSION);

        assert!(matches!(engine.migrate(SCHEMA_VERSION, SCHEMA_VERSION + 1).await, Err(SqliteError::Schema(_))));
        Ok(())
    }
}
