//! Order persistence: serializing aggregates into store records and back.

use order_store::{OrderRecord, OrderStore, Version};

use common::{OrderId, UserId};

use crate::error::DomainError;
use crate::order::Order;

/// Loads and saves [`Order`] aggregates through an [`OrderStore`].
///
/// The repository owns the mapping between the aggregate and its stored
/// record: the aggregate serializes into the record's JSON payload, and the
/// record's version rides on the aggregate for compare-and-swap saves.
pub struct OrderRepository<S: OrderStore> {
    store: S,
}

impl<S: OrderStore> OrderRepository<S> {
    /// Creates a new repository over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persists a new order. Fails if the order id or idempotency key is
    /// already present.
    pub async fn insert(&self, order: &mut Order) -> Result<(), DomainError> {
        let record = OrderRecord::new(
            order.id(),
            order.owner(),
            Some(order.idempotency_key().to_string()),
            serde_json::to_value(&*order)?,
            order.created_at(),
        );

        self.store.insert(record).await?;
        order.set_version(Version::first());
        Ok(())
    }

    /// Loads an order by id, returning `None` if it does not exist.
    pub async fn load(&self, order_id: OrderId) -> Result<Option<Order>, DomainError> {
        let record = self.store.get(order_id).await?;
        record.map(hydrate).transpose()
    }

    /// Loads the order created under the given idempotency key, if any.
    pub async fn load_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<Order>, DomainError> {
        let record = self.store.find_by_idempotency_key(key).await?;
        record.map(hydrate).transpose()
    }

    /// Saves a mutated order with compare-and-swap on the version it was
    /// loaded at. A `VersionConflict` store error means a concurrent writer
    /// got there first; reload and retry against current state.
    pub async fn save(&self, order: &mut Order) -> Result<(), DomainError> {
        let new_version = self
            .store
            .update(
                order.id(),
                order.version(),
                serde_json::to_value(&*order)?,
                order.updated_at(),
            )
            .await?;

        order.set_version(new_version);
        Ok(())
    }

    /// Loads all orders belonging to an owner, newest first.
    pub async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Order>, DomainError> {
        let records = self.store.list_for_owner(owner).await?;
        records.into_iter().map(hydrate).collect()
    }

    /// Loads every order in the store, newest first.
    pub async fn list_all(&self) -> Result<Vec<Order>, DomainError> {
        let records = self.store.list_all().await?;
        records.into_iter().map(hydrate).collect()
    }
}

fn hydrate(record: OrderRecord) -> Result<Order, DomainError> {
    let mut order: Order = serde_json::from_value(record.payload)?;
    order.set_version(record.version);
    Ok(order)
}
