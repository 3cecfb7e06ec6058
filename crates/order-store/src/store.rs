use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{OrderId, OrderRecord, Result, UserId, record::Version};

/// Core trait for order store implementations.
///
/// A store keeps one record per order, keyed by order id, with a secondary
/// lookup by owner. All implementations must be thread-safe (Send + Sync)
/// and must guarantee that a successful `insert` or `update` is visible to
/// an immediately following `get` (read-your-writes), and that no reader
/// ever observes a partially applied record.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a new order record.
    ///
    /// Fails with `DuplicateOrder` if the order id is already present, or
    /// `DuplicateIdempotencyKey` if another record holds the same
    /// idempotency key. The key check and the insert are a single atomic
    /// step, so exactly one of two concurrent writers with the same key
    /// succeeds.
    async fn insert(&self, record: OrderRecord) -> Result<()>;

    /// Retrieves an order record by id.
    async fn get(&self, order_id: OrderId) -> Result<Option<OrderRecord>>;

    /// Retrieves the order record holding the given idempotency key, if any.
    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<OrderRecord>>;

    /// Replaces the payload of an existing record if its current version
    /// matches `expected` (compare-and-swap).
    ///
    /// Returns the new version on success; fails with `VersionConflict` if
    /// the record has moved on, or `OrderNotFound` if it does not exist.
    async fn update(
        &self,
        order_id: OrderId,
        expected: Version,
        payload: serde_json::Value,
        updated_at: DateTime<Utc>,
    ) -> Result<Version>;

    /// Lists all orders belonging to an owner, newest first.
    async fn list_for_owner(&self, owner_id: UserId) -> Result<Vec<OrderRecord>>;

    /// Lists every order in the store, newest first. Admin use only.
    async fn list_all(&self) -> Result<Vec<OrderRecord>>;
}
