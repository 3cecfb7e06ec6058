//! Durable persistence for order records.
//!
//! Orders are stored as versioned JSON payloads keyed by order id, with a
//! secondary lookup by owner and a uniqueness guarantee on the idempotency
//! key. Updates are applied with compare-and-swap on the record version so
//! concurrent status transitions are serialized per order.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use common::{OrderId, UserId};
pub use error::{Result, StoreError};
pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use record::{OrderRecord, Version};
pub use store::OrderStore;
