//! The stored representation of an order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OrderId, UserId};

/// Version of an order record, used for optimistic concurrency.
///
/// Versions start at 1 when a record is inserted and increment by 1 on each
/// successful update.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the version of a record that has not been persisted yet (0).
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the version assigned on insert (1).
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// A persisted order: indexable columns plus the aggregate state as JSON.
///
/// The payload is opaque to the store; the domain layer serializes the order
/// aggregate into it and hydrates it back on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    /// The order this record belongs to.
    pub order_id: OrderId,

    /// The buyer who owns the order.
    pub owner_id: UserId,

    /// Key that makes order creation idempotent. Unique across records when
    /// present.
    pub idempotency_key: Option<String>,

    /// Current record version for compare-and-swap updates.
    pub version: Version,

    /// The serialized order aggregate.
    pub payload: serde_json::Value,

    /// When the order was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Creates a record for a new order at version 1.
    pub fn new(
        order_id: OrderId,
        owner_id: UserId,
        idempotency_key: Option<String>,
        payload: serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            owner_id,
            idempotency_key,
            version: Version::first(),
            payload,
            created_at,
            updated_at: created_at,
        }
    }
}
