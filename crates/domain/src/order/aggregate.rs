//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use order_store::Version;
use serde::{Deserialize, Serialize};

use crate::checkout::CheckoutDraft;
use crate::pricing::Pricing;

use super::{
    Address, OrderError, OrderLine, OrderStatus, PaymentConfirmation, ShippingMethod,
    validate_lines,
};

/// The durable order aggregate.
///
/// Created once from a checkout draft and a validated payment submission,
/// then mutated only through the status transitions below. Orders are never
/// deleted; cancellation is a status, which keeps the full history available
/// for audit and reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: OrderId,
    owner: UserId,
    order_lines: Vec<OrderLine>,
    shipping_address: Address,
    billing_address: Address,
    shipping_method: ShippingMethod,
    pricing: Pricing,
    status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payment: Option<PaymentConfirmation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tracking_number: Option<String>,
    idempotency_key: String,
    /// Store version for compare-and-swap; lives in the record, not the
    /// serialized payload.
    #[serde(skip)]
    version: Version,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new order in `PendingPayment` from a checkout draft.
    ///
    /// The line snapshots and the server-computed pricing are frozen here;
    /// nothing after this point may change them.
    pub fn create(
        owner: UserId,
        draft: CheckoutDraft,
        pricing: Pricing,
        idempotency_key: String,
    ) -> Result<Self, OrderError> {
        validate_lines(&draft.order_lines)?;

        let now = Utc::now();
        Ok(Self {
            id: OrderId::new(),
            owner,
            order_lines: draft.order_lines,
            shipping_address: draft.shipping_address,
            billing_address: draft.billing_address,
            shipping_method: draft.shipping_method,
            pricing,
            status: OrderStatus::PendingPayment,
            payment: None,
            tracking_number: None,
            idempotency_key,
            version: Version::initial(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn order_lines(&self) -> &[OrderLine] {
        &self.order_lines
    }

    pub fn shipping_address(&self) -> &Address {
        &self.shipping_address
    }

    pub fn billing_address(&self) -> &Address {
        &self.billing_address
    }

    pub fn shipping_method(&self) -> ShippingMethod {
        self.shipping_method
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    pub fn payment(&self) -> Option<&PaymentConfirmation> {
        self.payment.as_ref()
    }

    pub fn tracking_number(&self) -> Option<&str> {
        self.tracking_number.as_deref()
    }

    pub fn idempotency_key(&self) -> &str {
        &self.idempotency_key
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Sets the store version. Called by the repository after load/save.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Confirms payment, moving the order to `Paid` and attaching the
    /// confirmation metadata.
    pub fn confirm_payment(
        &mut self,
        confirmation: PaymentConfirmation,
    ) -> Result<(), OrderError> {
        self.transition(OrderStatus::Paid)?;
        self.payment = Some(confirmation);
        Ok(())
    }

    /// Cancels the order. Legal only before shipment.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Cancelled)
    }

    /// Marks the order as handed to the carrier.
    pub fn ship(&mut self, tracking_number: Option<String>) -> Result<(), OrderError> {
        self.transition(OrderStatus::Shipped)?;
        if tracking_number.is_some() {
            self.tracking_number = tracking_number;
        }
        Ok(())
    }

    /// Marks the order as received by the buyer.
    pub fn deliver(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Delivered)
    }

    /// Applies an admin-requested status, routed through the same
    /// transition table as the buyer-facing operations.
    pub fn apply_status(
        &mut self,
        next: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<(), OrderError> {
        match next {
            OrderStatus::Shipped => self.ship(tracking_number),
            OrderStatus::Delivered => self.deliver(),
            OrderStatus::Cancelled => self.cancel(),
            OrderStatus::Paid | OrderStatus::PendingPayment => self.transition(next),
        }
    }

    /// Attaches (or replaces) gateway reconciliation metadata without
    /// changing the status.
    pub fn attach_payment_result(&mut self, confirmation: PaymentConfirmation) {
        self.payment = Some(confirmation);
        self.touch();
    }

    fn transition(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
