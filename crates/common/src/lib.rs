//! Shared identifier types for the checkout service.

mod types;

pub use types::{AddressId, OrderId, UserId};
