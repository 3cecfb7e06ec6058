//! Payment submission validation.
//!
//! Submissions are validated and discarded; card details are never persisted
//! and never logged. Only the resulting [`PaymentConfirmation`] metadata is
//! stored on the order.
//!
//! [`PaymentConfirmation`]: crate::order::PaymentConfirmation

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::error::DomainError;

/// Supported payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "creditCard")]
    CreditCard,
}

/// A buyer's card details as submitted at the payment step.
///
/// Deliberately not `Serialize` and with a redacted `Debug`: this type must
/// not leak into the store, responses or logs.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSubmission {
    #[serde(default)]
    pub method: PaymentMethod,
    pub card_holder_name: String,
    pub card_number: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub cvv: String,
}

impl std::fmt::Debug for PaymentSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentSubmission")
            .field("method", &self.method)
            .field("card_holder_name", &self.card_holder_name)
            .field("card_number", &"[redacted]")
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvv", &"[redacted]")
            .finish()
    }
}

impl PaymentSubmission {
    /// Validates the submission against `today`.
    ///
    /// Fields are checked in a fixed order (card holder name, card number,
    /// expiry month, expiry year, cvv) and the first invalid one is
    /// reported, so error reporting is deterministic.
    pub fn validate(&self, today: NaiveDate) -> Result<(), DomainError> {
        if self.card_holder_name.trim().is_empty() {
            return Err(DomainError::InvalidPayment {
                field: "cardHolderName",
            });
        }

        let digits: String = self
            .card_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if digits.len() != 16 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::InvalidPayment {
                field: "cardNumber",
            });
        }

        if !(1..=12).contains(&self.expiry_month) {
            return Err(DomainError::InvalidPayment {
                field: "expiryMonth",
            });
        }

        let expired = self.expiry_year < today.year()
            || (self.expiry_year == today.year() && self.expiry_month < today.month());
        if expired {
            return Err(DomainError::InvalidPayment {
                field: "expiryYear",
            });
        }

        if !(3..=4).contains(&self.cvv.len()) || !self.cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::InvalidPayment { field: "cvv" });
        }

        Ok(())
    }
}
