use std::sync::Arc;

use tracing::debug;

use crate::error::InventoryError;
use crate::notify::{ChangeNotifier, IntoChangeListener, Subscription};
use crate::product::{NewProduct, Product, ProductValues};
use crate::router::Router;
use crate::schema::{Address, ContentType};
use crate::selection::{Predicate, Selection};
use crate::storage::ProductStorage;
use crate::validate::{validate_insert, validate_update};

/// The product data-access layer.
///
/// Every write goes router → validator → storage, and a write that changed
/// rows is followed by a change event for the address written.
pub struct Inventory<S: ProductStorage + ?Sized> {
    storage: Arc<S>,
    router: Router,
    notifier: ChangeNotifier,
}

impl<S: ProductStorage + ?Sized> Clone for Inventory<S> {
    fn clone(&self) -> Self { Self { storage: self.storage.clone(), router: self.router.clone(), notifier: self.notifier.clone() } }
}

impl<S: ProductStorage + ?Sized> Inventory<S> {
    pub fn new(storage: Arc<S>) -> Self { Self::with_router(storage, Router::default()) }

    pub fn with_router(storage: Arc<S>, router: Router) -> Self { Self { storage, router, notifier: ChangeNotifier::new() } }

    pub fn router(&self) -> &Router { &self.router }

    /// Products at `address`. An item address ignores `selection`.
    pub async fn list(&self, address: Address, selection: Selection) -> Result<Vec<Product>, InventoryError> {
        let selection = self.router.route(&address, selection);
        self.storage.query(&selection).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Product>, InventoryError> {
        Ok(self.list(Address::Item(id), Selection::all()).await?.into_iter().next())
    }

    /// Validates and inserts a full record, returning the assigned id.
    pub async fn create(&self, values: impl Into<ProductValues>) -> Result<i64, InventoryError> {
        let values = values.into();
        validate_insert(&values)?;

        let id = self.storage.insert(&values).await?;
        debug!("Inventory.create: new product {}", id);
        self.notifier.notify(Address::Collection);
        Ok(id)
    }

    /// Overwrites every writable column of the rows at `address`.
    pub async fn replace(&self, address: Address, product: NewProduct) -> Result<usize, InventoryError> {
        let values: ProductValues = product.into();
        validate_insert(&values)?;
        self.write(address, Predicate::True, &values).await
    }

    /// Writes the columns present in `values` to the rows at `address`.
    pub async fn patch(&self, address: Address, values: ProductValues) -> Result<usize, InventoryError> {
        self.update(address, Predicate::True, values).await
    }

    /// Like [`patch`](Self::patch), narrowed by `predicate` when `address` is the collection.
    pub async fn update(&self, address: Address, predicate: Predicate, values: ProductValues) -> Result<usize, InventoryError> {
        validate_update(&values)?;
        if values.is_empty() {
            debug!("Inventory.update: empty payload for {}, nothing to do", address);
            return Ok(0);
        }
        self.write(address, predicate, &values).await
    }

    async fn write(&self, address: Address, predicate: Predicate, values: &ProductValues) -> Result<usize, InventoryError> {
        let predicate = self.router.route_predicate(&address, predicate);
        let rows = self.storage.update(&predicate, values).await?;
        if rows > 0 {
            self.notifier.notify(address);
        }
        Ok(rows)
    }

    pub async fn remove(&self, address: Address) -> Result<usize, InventoryError> { self.delete(address, Predicate::True).await }

    /// Deletes the rows at `address`, narrowed by `predicate` when `address` is the collection.
    pub async fn delete(&self, address: Address, predicate: Predicate) -> Result<usize, InventoryError> {
        let predicate = self.router.route_predicate(&address, predicate);
        let rows = self.storage.delete(&predicate).await?;
        if rows > 0 {
            self.notifier.notify(address);
        }
        Ok(rows)
    }

    /// Adds `delta` to a product's quantity, returning the new quantity.
    ///
    /// `Ok(None)` if the product does not exist. A change that would take the
    /// quantity below zero or past `i64::MAX` fails with `InvalidArgument` and
    /// leaves it unchanged.
    pub async fn adjust_quantity(&self, id: i64, delta: i64) -> Result<Option<i64>, InventoryError> {
        match self.storage.adjust_quantity(id, delta).await? {
            Some(quantity) => {
                self.notifier.notify(Address::Item(id));
                Ok(Some(quantity))
            }
            None => match self.get(id).await? {
                Some(_) => Err(InventoryError::invalid("invalid quantity")),
                None => Ok(None),
            },
        }
    }

    pub fn describe(&self, address: &Address) -> ContentType { self.router.describe(address) }

    pub fn subscribe<L: IntoChangeListener>(&self, address: Address, listener: L) -> Subscription { self.notifier.subscribe(address, listener) }

    pub async fn list_at(&self, raw: &str, selection: Selection) -> Result<Vec<Product>, InventoryError> {
        let address = self.router.resolve(raw)?;
        self.list(address, selection).await
    }

    pub async fn patch_at(&self, raw: &str, values: ProductValues) -> Result<usize, InventoryError> {
        let address = self.router.resolve(raw)?;
        self.patch(address, values).await
    }

    pub async fn remove_at(&self, raw: &str) -> Result<usize, InventoryError> {
        let address = self.router.resolve(raw)?;
        self.remove(address).await
    }

    pub fn describe_at(&self, raw: &str) -> Result<ContentType, InventoryError> { Ok(self.describe(&self.router.resolve(raw)?)) }
}
