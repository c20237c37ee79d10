#[allow(unused)]
pub use inventory_core::{
    Address, ChangeEvent, ChangeListener, Column, ContentType, Inventory, InventoryError, IntoChangeListener, NewProduct, OrderDirection,
    Predicate, Product, ProductValues, Selection, Value,
};
use inventory_storage_sqlite::SqliteStorageEngine;
use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

/// The worked example product
#[allow(unused)]
pub fn widget() -> NewProduct {
    NewProduct {
        name: "Widget".to_string(),
        brand: "Acme".to_string(),
        price: 500,
        quantity: 10,
        image: "img://1".to_string(),
        supplier_name: "Acme Co".to_string(),
        supplier_phone: "555-0100".to_string(),
        supplier_email: "a@acme.test".to_string(),
    }
}

#[allow(unused)]
pub fn product(name: &str, brand: &str, price: i64, quantity: i64) -> NewProduct {
    NewProduct { name: name.to_string(), brand: brand.to_string(), price, quantity, ..widget() }
}

#[allow(unused)]
pub async fn memory_inventory() -> anyhow::Result<Inventory<SqliteStorageEngine>> {
    Ok(Inventory::new(Arc::new(SqliteStorageEngine::open_in_memory().await?)))
}

/// Accumulates change events for later assertions
#[derive(Clone, Default)]
pub struct TestWatcher {
    events: Arc<Mutex<Vec<ChangeEvent>>>,
}

#[allow(unused)]
impl TestWatcher {
    pub fn new() -> Self { Self::default() }

    /// Takes (empties and returns) the addresses of all accumulated events
    pub fn drain(&self) -> Vec<Address> { self.events.lock().unwrap().drain(..).map(|e| e.address).collect() }

    pub fn count(&self) -> usize { self.events.lock().unwrap().len() }
}

impl IntoChangeListener for &TestWatcher {
    fn into_change_listener(self) -> ChangeListener {
        let events = self.events.clone();
        ChangeListener::Payload(Arc::new(move |event: ChangeEvent| events.lock().unwrap().push(event)))
    }
}
