use async_trait::async_trait;

use crate::error::InventoryError;
use crate::product::{Product, ProductValues};
use crate::selection::{Predicate, Selection};

/// The four CRUD primitives over the product table.
///
/// Implementations do not validate payloads; the [`Inventory`](crate::Inventory)
/// façade does that before calling in. A filter matching nothing is a zero
/// result, never an error.
#[async_trait]
pub trait ProductStorage: Send + Sync {
    // Read-only scan
    async fn query(&self, selection: &Selection) -> Result<Vec<Product>, InventoryError>;

    // Inserts a full record, returning the newly assigned id. Ids are never reused.
    async fn insert(&self, values: &ProductValues) -> Result<i64, InventoryError>;

    // Writes the columns present in `values` to every matching row
    async fn update(&self, predicate: &Predicate, values: &ProductValues) -> Result<usize, InventoryError>;

    async fn delete(&self, predicate: &Predicate) -> Result<usize, InventoryError>;

    /// Atomically adds `delta` to the quantity of one product.
    ///
    /// Returns the new quantity, or `None` when no row was changed: the id does
    /// not exist or the result would be negative or overflow.
    async fn adjust_quantity(&self, id: i64, delta: i64) -> Result<Option<i64>, InventoryError>;

    async fn count(&self, predicate: &Predicate) -> Result<usize, InventoryError> {
        Ok(self.query(&Selection::filter(predicate.clone())).await?.len())
    }
}
