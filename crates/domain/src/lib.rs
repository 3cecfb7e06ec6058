//! Checkout and order domain for the checkout service.
//!
//! This crate provides the core business logic:
//! - Pure pricing computation (subtotal, shipping, tax, total)
//! - Checkout assembly with address resolution
//! - Payment submission validation
//! - The Order aggregate with its status state machine
//! - The order lifecycle service over a pluggable order store

pub mod addresses;
pub mod checkout;
pub mod context;
pub mod error;
pub mod money;
pub mod order;
pub mod payment;
pub mod pricing;
pub mod repository;
pub mod service;

pub use addresses::{AddressInput, AddressProvider, InMemoryAddressBook, SavedAddress};
pub use checkout::{AddressSelection, CartLine, CheckoutAssembler, CheckoutDraft};
pub use context::RequestContext;
pub use error::DomainError;
pub use money::Money;
pub use order::{
    Address, Order, OrderError, OrderLine, OrderStatus, PaymentConfirmation, ProductId,
    ShippingMethod,
};
pub use payment::{PaymentMethod, PaymentSubmission};
pub use pricing::{Pricing, compute_pricing};
pub use repository::OrderRepository;
pub use service::{CreatedOrder, OrderService};
