//! File-backed stores: persistence, schema versioning and concurrent readers

mod common;

use std::sync::Arc;

use anyhow::Result;
use common::*;
use inventory_core::schema::SCHEMA_VERSION;
use inventory_core::ProductStorage;
use inventory_storage_sqlite::{SqliteConfig, SqliteError, SqliteStorageEngine};

#[tokio::test]
async fn test_rows_survive_reopen() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("inventory.db");

    let id = {
        let inventory = Inventory::new(Arc::new(SqliteStorageEngine::open(&path).await?));
        inventory.create(widget()).await?
    };

    let storage = SqliteStorageEngine::open(&path).await?;
    assert_eq!(storage.schema_version().await?, SCHEMA_VERSION);
    let inventory = Inventory::new(Arc::new(storage));
    assert_eq!(inventory.get(id).await?.unwrap().fields(), widget());
    Ok(())
}

#[tokio::test]
async fn test_schema_version_handling() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("inventory.db");

    {
        let storage = SqliteStorageEngine::open(&path).await?;
        storage.insert(&widget().into()).await?;
    }
    {
        let conn = rusqlite_connection(&path)?;
        conn.execute_batch(&format!("PRAGMA user_version = {}", SCHEMA_VERSION + 1))?;
    }
    // Newer than supported: refuse to open rather than destroy data
    assert!(matches!(SqliteStorageEngine::open(&path).await, Err(SqliteError::Schema(_))));

    {
        let conn = rusqlite_connection(&path)?;
        conn.execute_batch("PRAGMA user_version = 0")?;
    }
    // Unversioned store with an existing table: kept as is
    let storage = SqliteStorageEngine::open(&path).await?;
    assert_eq!(storage.count(&Predicate::True).await?, 1);

    storage.migrate(0, SCHEMA_VERSION).await?;
    assert_eq!(storage.count(&Predicate::True).await?, 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reads_and_writes() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = SqliteStorageEngine::open_with(SqliteConfig::File(dir.path().join("inventory.db")), 4).await?;
    let inventory = Inventory::new(Arc::new(storage));
    let id = inventory.create(product("Widget", "Acme", 500, 0)).await?;

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let writer = inventory.clone();
        tasks.push(tokio::spawn(async move { writer.adjust_quantity(id, 1).await }));
        let reader = inventory.clone();
        tasks.push(tokio::spawn(async move { reader.get(id).await.map(|p| p.map(|p| p.quantity)) }));
    }
    for task in tasks {
        task.await??;
    }

    assert_eq!(inventory.get(id).await?.unwrap().quantity, 20);
    Ok(())
}

fn rusqlite_connection(path: &std::path::Path) -> Result<rusqlite::Connection> { Ok(rusqlite::Connection::open(path)?) }
