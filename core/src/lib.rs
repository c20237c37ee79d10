//! Product catalog data-access layer.
//!
//! Addresses ([`Address::Collection`] / [`Address::Item`]) are resolved by the
//! [`Router`], payloads are checked by the validator, the [`ProductStorage`]
//! engine runs the SQL, and the [`ChangeNotifier`] tells subscribers to re-read.

pub mod error;
pub mod inventory;
pub mod notify;
pub mod product;
pub mod router;
pub mod schema;
pub mod selection;
pub mod storage;
pub mod validate;

pub use error::InventoryError;
pub use inventory::Inventory;
pub use notify::{ChangeEvent, ChangeListener, ChangeNotifier, IntoChangeListener, Subscription};
pub use product::{NewProduct, Product, ProductValues, Value};
pub use router::{AddressMatcher, Router};
pub use schema::{Address, Column, ContentType};
pub use selection::{ComparisonOperator, OrderByItem, OrderDirection, Predicate, Selection};
pub use storage::ProductStorage;
