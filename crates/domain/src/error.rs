//! Domain error types.

use common::{AddressId, OrderId};
use order_store::StoreError;
use thiserror::Error;

use crate::money::Money;
use crate::order::OrderError;

/// Errors that can occur during checkout and order operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the order aggregate.
    #[error("order error: {0}")]
    Order(#[from] OrderError),

    /// A payment submission field failed validation. Carries the first
    /// offending field so the caller can re-prompt precisely.
    #[error("invalid payment field: {field}")]
    InvalidPayment { field: &'static str },

    /// Client-submitted pricing disagrees with the authoritative server
    /// computation beyond the rounding epsilon. Treated as a tamper or
    /// staleness signal; the order is not created.
    #[error("pricing mismatch: submitted total {submitted}, computed total {computed}")]
    PricingMismatch { submitted: Money, computed: Money },

    /// The caller lacks ownership or admin rights for the resource.
    #[error("forbidden")]
    Forbidden,

    /// No order with this id exists.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// No saved address with this id exists.
    #[error("address not found: {0}")]
    AddressNotFound(AddressId),

    /// An error occurred in the order store.
    #[error("order store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization error while persisting or hydrating an order.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
