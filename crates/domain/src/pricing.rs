//! Cart pricing: subtotal, shipping, tax and total.
//!
//! Pure and deterministic. Called once to present an estimate to the buyer
//! and again, authoritatively, when an order is persisted; the two results
//! must agree within [`Pricing::matches`] or order creation fails.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::order::{OrderLine, ShippingMethod};

/// Standard shipping is free above this subtotal (rupees).
const FREE_SHIPPING_THRESHOLD: i64 = 5000;

/// Flat standard shipping fee (rupees).
const STANDARD_SHIPPING_FEE: i64 = 300;

/// Flat express shipping fee (rupees), regardless of subtotal.
const EXPRESS_SHIPPING_FEE: i64 = 500;

/// GST applied to the subtotal.
fn tax_rate() -> Decimal {
    Decimal::new(18, 2)
}

/// Largest tolerated difference per component between client-submitted and
/// server-computed pricing. Anything beyond this is a tamper or staleness
/// signal, never silently corrected.
fn pricing_epsilon() -> Money {
    Money::new(Decimal::new(1, 2))
}

/// The computed cost breakdown of a cart.
///
/// `total == subtotal + shipping_cost + tax` holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub tax: Money,
    pub total: Money,
}

impl Pricing {
    /// Returns true if every component of `other` agrees with this pricing
    /// within the rounding epsilon.
    pub fn matches(&self, other: &Pricing) -> bool {
        within_epsilon(self.subtotal, other.subtotal)
            && within_epsilon(self.shipping_cost, other.shipping_cost)
            && within_epsilon(self.tax, other.tax)
            && within_epsilon(self.total, other.total)
    }
}

fn within_epsilon(a: Money, b: Money) -> bool {
    a.abs_diff(b) <= pricing_epsilon()
}

/// Computes the cost breakdown for a set of order lines and a shipping
/// method.
///
/// The subtotal and shipping fee are exact; tax is rounded to paise at this
/// output boundary, never in intermediate steps.
pub fn compute_pricing(lines: &[OrderLine], method: ShippingMethod) -> Pricing {
    let subtotal = lines
        .iter()
        .fold(Money::ZERO, |acc, line| acc + line.line_total());
    let shipping_cost = shipping_cost_for(subtotal, method);
    let tax = Money::new(subtotal.amount() * tax_rate()).rounded();
    let total = subtotal + shipping_cost + tax;

    Pricing {
        subtotal,
        shipping_cost,
        tax,
        total,
    }
}

fn shipping_cost_for(subtotal: Money, method: ShippingMethod) -> Money {
    match method {
        ShippingMethod::Standard => {
            if subtotal.amount() > Decimal::from(FREE_SHIPPING_THRESHOLD) {
                Money::ZERO
            } else {
                Money::from_rupees(STANDARD_SHIPPING_FEE)
            }
        }
        ShippingMethod::Express => Money::from_rupees(EXPRESS_SHIPPING_FEE),
    }
}
