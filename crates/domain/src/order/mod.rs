//! Order aggregate and related types.

mod aggregate;
mod state;
mod value_objects;

pub use aggregate::Order;
pub use state::OrderStatus;
pub use value_objects::{Address, OrderLine, PaymentConfirmation, ProductId, ShippingMethod};

use thiserror::Error;

use crate::money::Money;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The requested status change is not in the transition table.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Checkout or order creation was attempted with no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A line carries a zero quantity.
    #[error("invalid quantity: {quantity} (must be at least 1)")]
    InvalidQuantity { quantity: u32 },

    /// A line carries a non-positive unit price.
    #[error("invalid unit price: {price} (must be greater than zero)")]
    InvalidPrice { price: Money },
}

/// Validates order lines before they are frozen into a draft or order.
pub(crate) fn validate_lines(lines: &[OrderLine]) -> Result<(), OrderError> {
    if lines.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    for line in lines {
        if line.quantity == 0 {
            return Err(OrderError::InvalidQuantity {
                quantity: line.quantity,
            });
        }
        if !line.unit_price.is_positive() {
            return Err(OrderError::InvalidPrice {
                price: line.unit_price,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_lines_rejected() {
        assert!(matches!(validate_lines(&[]), Err(OrderError::EmptyCart)));
    }

    #[test]
    fn zero_quantity_rejected() {
        let line = OrderLine::new("SKU-001", "Widget", "/w.jpg", Money::from_rupees(100), 0);
        assert!(matches!(
            validate_lines(&[line]),
            Err(OrderError::InvalidQuantity { quantity: 0 })
        ));
    }

    #[test]
    fn zero_price_rejected() {
        let line = OrderLine::new("SKU-001", "Widget", "/w.jpg", Money::ZERO, 1);
        assert!(matches!(
            validate_lines(&[line]),
            Err(OrderError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn valid_lines_accepted() {
        let line = OrderLine::new("SKU-001", "Widget", "/w.jpg", Money::from_rupees(100), 2);
        assert!(validate_lines(&[line]).is_ok());
    }
}
