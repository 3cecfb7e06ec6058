//! Value objects for the order domain.

use chrono::{DateTime, Utc};
use common::AddressId;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Product identifier (catalog reference).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How an order travels to the buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    /// Delivery in 5-7 business days; free above the shipping threshold.
    #[default]
    Standard,

    /// Delivery in 1-3 business days at a flat fee.
    Express,
}

impl ShippingMethod {
    /// Returns the method name as a string.
    pub fn as_str(self) -> &'static str {
        match self {
            ShippingMethod::Standard => "standard",
            ShippingMethod::Express => "express",
        }
    }
}

impl std::fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A line on an order: a cart entry frozen at order-creation time.
///
/// The unit price is the snapshot taken when the buyer added the product;
/// later catalog price changes never alter it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// The product this line refers to.
    pub product_id: ProductId,

    /// Human-readable product name.
    pub name: String,

    /// Product image reference.
    pub image: String,

    /// Price per unit at the time the line was snapshotted.
    pub unit_price: Money,

    /// Quantity ordered.
    pub quantity: u32,
}

impl OrderLine {
    /// Creates a new order line.
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        image: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            image: image.into(),
            unit_price,
            quantity,
        }
    }

    /// Returns the total for this line (unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A postal address embedded in a draft or order.
///
/// When the address came from (or was persisted into) the buyer's address
/// book, `address_id` links back to the saved record; ephemeral addresses
/// carry no id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_id: Option<AddressId>,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Payment gateway confirmation metadata attached to a paid order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    /// Gateway reference for the payment.
    pub reference: String,

    /// When the payment was confirmed.
    pub confirmed_at: DateTime<Utc>,
}
