use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    OrderId, OrderRecord, Result, StoreError, UserId,
    record::Version,
    store::OrderStore,
};

#[derive(Default)]
struct Inner {
    orders: HashMap<OrderId, OrderRecord>,
    by_idempotency_key: HashMap<String, OrderId>,
}

/// In-memory order store.
///
/// Used for tests and as the default store when no database is configured.
/// A single write lock covers both the record map and the idempotency index,
/// so inserts and compare-and-swap updates are atomic.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of records stored.
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    /// Clears all records.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.orders.clear();
        inner.by_idempotency_key.clear();
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, record: OrderRecord) -> Result<()> {
        let mut inner = self.inner.write().await;

        if inner.orders.contains_key(&record.order_id) {
            return Err(StoreError::DuplicateOrder(record.order_id));
        }

        if let Some(ref key) = record.idempotency_key
            && inner.by_idempotency_key.contains_key(key)
        {
            return Err(StoreError::DuplicateIdempotencyKey(key.clone()));
        }

        if let Some(ref key) = record.idempotency_key {
            inner
                .by_idempotency_key
                .insert(key.clone(), record.order_id);
        }
        inner.orders.insert(record.order_id, record);

        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<OrderRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.orders.get(&order_id).cloned())
    }

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<OrderRecord>> {
        let inner = self.inner.read().await;
        let order_id = inner.by_idempotency_key.get(key);
        Ok(order_id.and_then(|id| inner.orders.get(id)).cloned())
    }

    async fn update(
        &self,
        order_id: OrderId,
        expected: Version,
        payload: serde_json::Value,
        updated_at: DateTime<Utc>,
    ) -> Result<Version> {
        let mut inner = self.inner.write().await;

        let record = inner
            .orders
            .get_mut(&order_id)
            .ok_or(StoreError::OrderNotFound(order_id))?;

        if record.version != expected {
            return Err(StoreError::VersionConflict {
                order_id,
                expected,
                actual: record.version,
            });
        }

        record.version = record.version.next();
        record.payload = payload;
        record.updated_at = updated_at;

        Ok(record.version)
    }

    async fn list_for_owner(&self, owner_id: UserId) -> Result<Vec<OrderRecord>> {
        let inner = self.inner.read().await;
        let mut records: Vec<_> = inner
            .orders
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn list_all(&self) -> Result<Vec<OrderRecord>> {
        let inner = self.inner.read().await;
        let mut records: Vec<_> = inner.orders.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}
