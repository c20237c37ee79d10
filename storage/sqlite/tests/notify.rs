//! Change notification through the SQLite-backed inventory

mod common;

use anyhow::Result;
use common::*;

#[tokio::test]
async fn test_create_notifies_collection() -> Result<()> {
    let inventory = memory_inventory().await?;
    let watcher = TestWatcher::new();
    let _sub = inventory.subscribe(Address::Collection, &watcher);

    inventory.create(widget()).await?;
    assert_eq!(watcher.drain(), vec![Address::Collection]);
    Ok(())
}

#[tokio::test]
async fn test_item_writes_reach_collection_and_item_subscribers() -> Result<()> {
    let inventory = memory_inventory().await?;
    let id = inventory.create(widget()).await?;
    let other = inventory.create(product("Gadget", "Globex", 120, 3)).await?;

    let all = TestWatcher::new();
    let mine = TestWatcher::new();
    let _a = inventory.subscribe(Address::Collection, &all);
    let _b = inventory.subscribe(Address::Item(id), &mine);

    inventory.patch(Address::Item(id), ProductValues::new().with(Column::Quantity, 1)).await?;
    inventory.patch(Address::Item(other), ProductValues::new().with(Column::Quantity, 1)).await?;
    inventory.adjust_quantity(id, 2).await?;

    assert_eq!(all.drain(), vec![Address::Item(id), Address::Item(other), Address::Item(id)]);
    assert_eq!(mine.drain(), vec![Address::Item(id), Address::Item(id)]);
    Ok(())
}

#[tokio::test]
async fn test_no_event_when_nothing_changed() -> Result<()> {
    let inventory = memory_inventory().await?;
    let id = inventory.create(widget()).await?;

    let watcher = TestWatcher::new();
    let _sub = inventory.subscribe(Address::Collection, &watcher);

    assert_eq!(inventory.remove(Address::Item(id + 1)).await?, 0);
    assert_eq!(inventory.update(Address::Collection, Predicate::eq(Column::Brand, "Nobody"), ProductValues::new().with(Column::Price, 1)).await?, 0);
    assert_eq!(inventory.patch(Address::Item(id), ProductValues::new()).await?, 0);
    assert!(inventory.patch(Address::Item(id), ProductValues::new().with(Column::Price, -1)).await.is_err());
    assert!(inventory.adjust_quantity(id, -100).await.is_err());

    assert_eq!(watcher.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_collection_delete_notifies_item_subscribers() -> Result<()> {
    let inventory = memory_inventory().await?;
    let id = inventory.create(widget()).await?;

    let watcher = TestWatcher::new();
    let _sub = inventory.subscribe(Address::Item(id), &watcher);

    assert_eq!(inventory.delete(Address::Collection, Predicate::eq(Column::Brand, "Acme")).await?, 1);
    assert_eq!(watcher.drain(), vec![Address::Collection]);
    Ok(())
}

#[tokio::test]
async fn test_dropped_subscription_stops_events() -> Result<()> {
    let inventory = memory_inventory().await?;
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let sub = inventory.subscribe(Address::Collection, tx);

    let id = inventory.create(widget()).await?;
    assert_eq!(rx.recv().await, Some(ChangeEvent { address: Address::Collection }));

    drop(sub);
    inventory.remove(Address::Item(id)).await?;
    // The sender was dropped with the subscription, so the channel is closed and empty
    assert_eq!(rx.recv().await, None);
    Ok(())
}
