//! Integration tests for the checkout and order lifecycle.
//!
//! These tests drive the full path from cart to persisted order, including
//! idempotency under concurrent duplicate submissions and serialized status
//! transitions.

use common::UserId;
use domain::{
    AddressInput, AddressSelection, CartLine, CheckoutAssembler, CheckoutDraft, DomainError,
    InMemoryAddressBook, Money, OrderError, OrderService, OrderStatus, PaymentMethod,
    PaymentSubmission, ProductId, RequestContext, ShippingMethod,
};
use order_store::InMemoryOrderStore;

fn create_service() -> OrderService<InMemoryOrderStore> {
    OrderService::new(InMemoryOrderStore::new())
}

fn cart_line(product: &str, price: i64, quantity: u32) -> CartLine {
    CartLine {
        product_id: ProductId::new(product),
        name: format!("Product {product}"),
        image: format!("/images/{product}.jpg"),
        unit_price: Money::from_rupees(price),
        quantity,
    }
}

fn new_address() -> AddressInput {
    AddressInput {
        street: "42 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        zip_code: "560001".to_string(),
        country: "India".to_string(),
        phone: Some("9876543210".to_string()),
    }
}

fn submission() -> PaymentSubmission {
    PaymentSubmission {
        method: PaymentMethod::CreditCard,
        card_holder_name: "Priya Sharma".to_string(),
        card_number: "4111 1111 1111 1111".to_string(),
        expiry_month: 12,
        expiry_year: 2031,
        cvv: "123".to_string(),
    }
}

async fn assemble_draft(
    ctx: &RequestContext,
    lines: Vec<CartLine>,
    method: ShippingMethod,
) -> CheckoutDraft {
    CheckoutAssembler::new(InMemoryAddressBook::new())
        .assemble(
            ctx,
            lines,
            AddressSelection::UseNew {
                address: new_address(),
                persist: false,
            },
            None,
            method,
        )
        .await
        .unwrap()
}

mod checkout_to_order {
    use super::*;

    #[tokio::test]
    async fn full_checkout_and_payment_flow() {
        let service = create_service();
        let ctx = RequestContext::user(UserId::new());

        let draft = assemble_draft(
            &ctx,
            vec![cart_line("SKU-001", 2000, 2)],
            ShippingMethod::Standard,
        )
        .await;
        assert_eq!(draft.pricing.total, Money::from_rupees(5020));

        let created = service
            .create_order(&ctx, draft, submission(), None)
            .await
            .unwrap();
        assert_eq!(created.order.status(), OrderStatus::Paid);

        // Read-your-writes: the order is immediately visible, already Paid.
        let loaded = service.get_order(&ctx, created.order.id()).await.unwrap();
        assert_eq!(loaded.status(), OrderStatus::Paid);
        assert_eq!(loaded.pricing().subtotal, Money::from_rupees(4000));
        assert_eq!(loaded.pricing().shipping_cost, Money::from_rupees(300));
        assert_eq!(loaded.pricing().tax, Money::from_rupees(720));
    }

    #[tokio::test]
    async fn free_shipping_above_threshold_flows_through() {
        let service = create_service();
        let ctx = RequestContext::user(UserId::new());

        let draft = assemble_draft(
            &ctx,
            vec![cart_line("SKU-001", 2000, 3)],
            ShippingMethod::Standard,
        )
        .await;

        let created = service
            .create_order(&ctx, draft, submission(), None)
            .await
            .unwrap();
        let pricing = created.order.pricing();
        assert_eq!(pricing.shipping_cost, Money::ZERO);
        assert_eq!(pricing.tax, Money::from_rupees(1080));
        assert_eq!(pricing.total, Money::from_rupees(7080));
    }

    #[tokio::test]
    async fn tampered_total_is_rejected_and_nothing_is_persisted() {
        let service = create_service();
        let ctx = RequestContext::user(UserId::new());

        let mut draft = assemble_draft(
            &ctx,
            vec![cart_line("SKU-001", 2000, 3)],
            ShippingMethod::Standard,
        )
        .await;
        draft.pricing.total = Money::from_rupees(7000);

        let result = service.create_order(&ctx, draft, submission(), None).await;
        assert!(matches!(result, Err(DomainError::PricingMismatch { .. })));
        assert!(service.list_orders(&ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn price_snapshots_outlive_catalog_changes() {
        let service = create_service();
        let ctx = RequestContext::user(UserId::new());

        // The cart snapshotted the price at 2000 when the item was added.
        let draft = assemble_draft(
            &ctx,
            vec![cart_line("SKU-001", 2000, 2)],
            ShippingMethod::Standard,
        )
        .await;
        let created = service
            .create_order(&ctx, draft, submission(), None)
            .await
            .unwrap();

        // A later checkout sees a raised catalog price; the old order keeps
        // its snapshot.
        let raised = assemble_draft(
            &ctx,
            vec![cart_line("SKU-001", 2500, 2)],
            ShippingMethod::Standard,
        )
        .await;
        service
            .create_order(&ctx, raised, submission(), Some("second".into()))
            .await
            .unwrap();

        let original = service.get_order(&ctx, created.order.id()).await.unwrap();
        assert_eq!(
            original.order_lines()[0].unit_price,
            Money::from_rupees(2000)
        );
        assert_eq!(original.pricing().subtotal, Money::from_rupees(4000));
    }
}

mod idempotency {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn double_submission_yields_one_order() {
        let service = create_service();
        let ctx = RequestContext::user(UserId::new());
        let draft = assemble_draft(
            &ctx,
            vec![cart_line("SKU-001", 2000, 2)],
            ShippingMethod::Standard,
        )
        .await;

        let first = service
            .create_order(&ctx, draft.clone(), submission(), Some("pay-once".into()))
            .await
            .unwrap();
        let second = service
            .create_order(&ctx, draft, submission(), Some("pay-once".into()))
            .await
            .unwrap();

        assert!(second.replayed);
        assert_eq!(first.order.id(), second.order.id());
        assert_eq!(service.list_orders(&ctx).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_double_click_yields_one_order() {
        let service = Arc::new(create_service());
        let ctx = RequestContext::user(UserId::new());
        let draft = assemble_draft(
            &ctx,
            vec![cart_line("SKU-001", 2000, 2)],
            ShippingMethod::Standard,
        )
        .await;

        let a = {
            let service = service.clone();
            let draft = draft.clone();
            tokio::spawn(async move {
                service
                    .create_order(&ctx, draft, submission(), Some("double-click".into()))
                    .await
            })
        };
        let b = {
            let service = service.clone();
            let draft = draft.clone();
            tokio::spawn(async move {
                service
                    .create_order(&ctx, draft, submission(), Some("double-click".into()))
                    .await
            })
        };

        let first = a.await.unwrap().unwrap();
        let second = b.await.unwrap().unwrap();

        assert_eq!(first.order.id(), second.order.id());
        assert_eq!(service.list_orders(&ctx).await.unwrap().len(), 1);
        // Exactly one of the two was the actual creation.
        assert_ne!(first.replayed, second.replayed);
    }

    #[tokio::test]
    async fn different_carts_create_different_orders() {
        let service = create_service();
        let ctx = RequestContext::user(UserId::new());

        let small = assemble_draft(
            &ctx,
            vec![cart_line("SKU-001", 2000, 1)],
            ShippingMethod::Standard,
        )
        .await;
        let large = assemble_draft(
            &ctx,
            vec![cart_line("SKU-001", 2000, 3)],
            ShippingMethod::Standard,
        )
        .await;

        service
            .create_order(&ctx, small, submission(), None)
            .await
            .unwrap();
        service
            .create_order(&ctx, large, submission(), None)
            .await
            .unwrap();

        assert_eq!(service.list_orders(&ctx).await.unwrap().len(), 2);
    }
}

mod lifecycle {
    use super::*;

    async fn paid_order(
        service: &OrderService<InMemoryOrderStore>,
        ctx: &RequestContext,
    ) -> common::OrderId {
        let draft = assemble_draft(
            ctx,
            vec![cart_line("SKU-001", 2000, 1)],
            ShippingMethod::Express,
        )
        .await;
        service
            .create_order(ctx, draft, submission(), None)
            .await
            .unwrap()
            .order
            .id()
    }

    #[tokio::test]
    async fn paid_to_shipped_to_delivered() {
        let service = create_service();
        let owner = RequestContext::user(UserId::new());
        let admin = RequestContext::admin(UserId::new());
        let order_id = paid_order(&service, &owner).await;

        let shipped = service
            .update_status(&admin, order_id, OrderStatus::Shipped, Some("TRK-42".into()))
            .await
            .unwrap();
        assert_eq!(shipped.status(), OrderStatus::Shipped);
        assert_eq!(shipped.tracking_number(), Some("TRK-42"));

        let delivered = service
            .update_status(&admin, order_id, OrderStatus::Delivered, None)
            .await
            .unwrap();
        assert_eq!(delivered.status(), OrderStatus::Delivered);

        // Terminal: no further moves.
        let result = service.cancel_order(&owner, order_id).await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::InvalidTransition { .. }))
        ));
    }

    #[tokio::test]
    async fn cancel_races_with_shipment() {
        // Buyer cancels while the admin marks shipped; whoever commits
        // second is re-checked against the true current status and fails.
        let service = create_service();
        let owner = RequestContext::user(UserId::new());
        let admin = RequestContext::admin(UserId::new());
        let order_id = paid_order(&service, &owner).await;

        service
            .update_status(&admin, order_id, OrderStatus::Shipped, None)
            .await
            .unwrap();

        let result = service.cancel_order(&owner, order_id).await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::InvalidTransition {
                from: OrderStatus::Shipped,
                to: OrderStatus::Cancelled,
            }))
        ));
    }

    #[tokio::test]
    async fn cancelled_order_remains_listed() {
        // Cancellation is a status, not a removal.
        let service = create_service();
        let owner = RequestContext::user(UserId::new());
        let order_id = paid_order(&service, &owner).await;

        service.cancel_order(&owner, order_id).await.unwrap();

        let orders = service.list_orders(&owner).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status(), OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn record_payment_result_keeps_status() {
        let service = create_service();
        let owner = RequestContext::user(UserId::new());
        let order_id = paid_order(&service, &owner).await;

        let updated = service
            .record_payment_result(
                &owner,
                order_id,
                domain::PaymentConfirmation {
                    reference: "PAY-RECON-1".to_string(),
                    confirmed_at: chrono::Utc::now(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status(), OrderStatus::Paid);
        assert_eq!(updated.payment().unwrap().reference, "PAY-RECON-1");
    }
}
