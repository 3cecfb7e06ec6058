use thiserror::Error;

use crate::{OrderId, record::Version};

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A compare-and-swap update found a different version than expected.
    /// The caller should reload the record and retry against current state.
    #[error("version conflict for order {order_id}: expected {expected}, found {actual}")]
    VersionConflict {
        order_id: OrderId,
        expected: Version,
        actual: Version,
    },

    /// An order with this id already exists.
    #[error("order already exists: {0}")]
    DuplicateOrder(OrderId),

    /// Another record already holds this idempotency key. The original
    /// submission won; the caller should return that order instead.
    #[error("idempotency key already used: {0}")]
    DuplicateIdempotencyKey(String),

    /// The order was not found in the store.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
