//! Order lifecycle manager.
//!
//! Owns order creation from a checkout draft plus payment submission, and
//! every status transition afterwards. Client-supplied pricing is advisory
//! only: creation always recomputes from the line snapshots and rejects
//! disagreement.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use common::{OrderId, UserId};
use order_store::{OrderStore, StoreError};

use crate::checkout::CheckoutDraft;
use crate::context::RequestContext;
use crate::error::DomainError;
use crate::order::{Order, OrderError, OrderStatus, PaymentConfirmation};
use crate::payment::PaymentSubmission;
use crate::pricing::compute_pricing;
use crate::repository::OrderRepository;

/// Width of the time bucket folded into content-hash idempotency keys.
///
/// A retry of the same submission inside the bucket replays the original
/// order; a deliberate identical purchase later lands in a new bucket.
const IDEMPOTENCY_BUCKET_SECS: i64 = 600;

/// Reload-and-retry budget when a concurrent writer wins the version race.
const TRANSITION_RETRIES: usize = 3;

/// Result of an order creation request.
#[derive(Debug)]
pub struct CreatedOrder {
    /// The created (or replayed) order.
    pub order: Order,

    /// True when this request was an idempotent replay and `order` is the
    /// previously created one.
    pub replayed: bool,
}

/// Who may perform a given transition.
enum Access {
    OwnerOrAdmin,
    AdminOnly,
}

/// Service for managing the order lifecycle.
pub struct OrderService<S: OrderStore> {
    repo: OrderRepository<S>,
}

impl<S: OrderStore> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self {
            repo: OrderRepository::new(store),
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &OrderRepository<S> {
        &self.repo
    }

    /// Creates an order from a checkout draft and a payment submission.
    ///
    /// Validates the submission, recomputes pricing authoritatively, and
    /// persists the order already `Paid`: there is no asynchronous gateway
    /// callback in this design, so creation and payment confirmation are one
    /// atomic step and `PendingPayment` is never observable to readers.
    ///
    /// Resubmitting the same draft and payment (same explicit idempotency
    /// key, or the same content fingerprint within a short window) returns
    /// the already-created order instead of creating a second one.
    #[tracing::instrument(skip(self, draft, submission, idempotency_key))]
    pub async fn create_order(
        &self,
        ctx: &RequestContext,
        draft: CheckoutDraft,
        submission: PaymentSubmission,
        idempotency_key: Option<String>,
    ) -> Result<CreatedOrder, DomainError> {
        submission.validate(Utc::now().date_naive())?;

        let pricing = compute_pricing(&draft.order_lines, draft.shipping_method);
        if !pricing.matches(&draft.pricing) {
            metrics::counter!("orders_pricing_mismatches_total").increment(1);
            tracing::warn!(
                submitted = %draft.pricing.total,
                computed = %pricing.total,
                "rejecting order with mismatched pricing"
            );
            return Err(DomainError::PricingMismatch {
                submitted: draft.pricing.total,
                computed: pricing.total,
            });
        }

        let key = idempotency_key
            .unwrap_or_else(|| submission_fingerprint(ctx.user_id, &draft, Utc::now()));

        if let Some(existing) = self.repo.load_by_idempotency_key(&key).await? {
            metrics::counter!("orders_replayed_total").increment(1);
            return Ok(CreatedOrder {
                order: existing,
                replayed: true,
            });
        }

        let mut order = Order::create(ctx.user_id, draft, pricing, key.clone())?;
        order.confirm_payment(PaymentConfirmation {
            reference: format!("PAY-{}", Uuid::new_v4().simple()),
            confirmed_at: Utc::now(),
        })?;

        match self.repo.insert(&mut order).await {
            Ok(()) => {
                metrics::counter!("orders_created_total").increment(1);
                tracing::info!(order_id = %order.id(), total = %order.pricing().total, "order created");
                Ok(CreatedOrder {
                    order,
                    replayed: false,
                })
            }
            Err(DomainError::Store(StoreError::DuplicateIdempotencyKey(_))) => {
                // Lost the race against a concurrent identical submission;
                // the first writer's order wins.
                match self.repo.load_by_idempotency_key(&key).await? {
                    Some(existing) => {
                        metrics::counter!("orders_replayed_total").increment(1);
                        Ok(CreatedOrder {
                            order: existing,
                            replayed: true,
                        })
                    }
                    None => Err(DomainError::Store(StoreError::DuplicateIdempotencyKey(key))),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Cancels an order. Legal from `PendingPayment` or `Paid` only, and
    /// only for the owning buyer or an admin.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(
        &self,
        ctx: &RequestContext,
        order_id: OrderId,
    ) -> Result<Order, DomainError> {
        let order = self
            .apply_transition(ctx, order_id, Access::OwnerOrAdmin, |order| order.cancel())
            .await?;
        metrics::counter!("orders_cancelled_total").increment(1);
        Ok(order)
    }

    /// Attaches gateway reconciliation metadata without changing status.
    ///
    /// The transition to `Paid` already happened at creation; this call
    /// exists for reconciliation and audit only.
    #[tracing::instrument(skip(self, result))]
    pub async fn record_payment_result(
        &self,
        ctx: &RequestContext,
        order_id: OrderId,
        result: PaymentConfirmation,
    ) -> Result<Order, DomainError> {
        self.apply_transition(ctx, order_id, Access::OwnerOrAdmin, |order| {
            order.attach_payment_result(result.clone());
            Ok(())
        })
        .await
    }

    /// Admin-only status override, enforced against the same transition
    /// table as the buyer-facing operations. `Shipped` may carry a tracking
    /// number.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        order_id: OrderId,
        next: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<Order, DomainError> {
        self.apply_transition(ctx, order_id, Access::AdminOnly, |order| {
            order.apply_status(next, tracking_number.clone())
        })
        .await
    }

    /// Loads a single order for its owner or an admin.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(
        &self,
        ctx: &RequestContext,
        order_id: OrderId,
    ) -> Result<Order, DomainError> {
        let order = self
            .repo
            .load(order_id)
            .await?
            .ok_or(DomainError::OrderNotFound(order_id))?;

        if !ctx.can_access(order.owner()) {
            return Err(DomainError::Forbidden);
        }

        Ok(order)
    }

    /// Lists the caller's own orders, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, ctx: &RequestContext) -> Result<Vec<Order>, DomainError> {
        self.repo.list_for_owner(ctx.user_id).await
    }

    /// Lists every order. Admin only.
    #[tracing::instrument(skip(self))]
    pub async fn list_all_orders(&self, ctx: &RequestContext) -> Result<Vec<Order>, DomainError> {
        if !ctx.admin {
            return Err(DomainError::Forbidden);
        }
        self.repo.list_all().await
    }

    /// Runs a transition with compare-and-swap: on a version conflict the
    /// order is reloaded and the transition re-checked against the true
    /// current status, so a stale read can never sneak an illegal move past
    /// the transition table.
    async fn apply_transition<F>(
        &self,
        ctx: &RequestContext,
        order_id: OrderId,
        access: Access,
        mutate: F,
    ) -> Result<Order, DomainError>
    where
        F: Fn(&mut Order) -> Result<(), OrderError>,
    {
        if matches!(access, Access::AdminOnly) && !ctx.admin {
            return Err(DomainError::Forbidden);
        }

        let mut attempts = 0;
        loop {
            let mut order = self
                .repo
                .load(order_id)
                .await?
                .ok_or(DomainError::OrderNotFound(order_id))?;

            if matches!(access, Access::OwnerOrAdmin) && !ctx.can_access(order.owner()) {
                return Err(DomainError::Forbidden);
            }

            mutate(&mut order)?;

            match self.repo.save(&mut order).await {
                Ok(()) => {
                    metrics::counter!("order_transitions_total").increment(1);
                    return Ok(order);
                }
                Err(DomainError::Store(StoreError::VersionConflict { .. }))
                    if attempts < TRANSITION_RETRIES =>
                {
                    attempts += 1;
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Content-hash fallback for callers that do not send an idempotency key:
/// owner + line snapshots + total, bucketed by time.
fn submission_fingerprint(owner: UserId, draft: &CheckoutDraft, now: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(owner.as_uuid().as_bytes());
    for line in &draft.order_lines {
        hasher.update(line.product_id.as_str().as_bytes());
        hasher.update(line.unit_price.amount().to_string().as_bytes());
        hasher.update(line.quantity.to_le_bytes());
    }
    hasher.update(draft.pricing.total.amount().to_string().as_bytes());
    hasher.update((now.timestamp() / IDEMPOTENCY_BUCKET_SECS).to_le_bytes());
    hex::encode(hasher.finalize())
}
