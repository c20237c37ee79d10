//! Public error types for the inventory data layer.

use thiserror::Error;

/// Error type for every inventory operation.
///
/// Not-found is never an error: updates and deletes report zero rows and
/// `get` returns `None`.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// A validation rule was violated. Storage was not touched.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The address does not name the collection or an item in it
    #[error("unsupported address: {0}")]
    UnsupportedAddress(String),

    /// The storage engine could not complete the operation
    #[error("storage failure: {0}")]
    StorageFailure(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl InventoryError {
    pub fn invalid(message: impl Into<String>) -> Self { InventoryError::InvalidArgument(message.into()) }

    pub fn is_invalid_argument(&self) -> bool { matches!(self, InventoryError::InvalidArgument(_)) }
}
