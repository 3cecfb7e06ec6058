//! Order creation, lookup and lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use domain::{
    Address, CheckoutDraft, Money, Order, OrderLine, OrderStatus, PaymentConfirmation,
    PaymentSubmission, Pricing, ShippingMethod,
};
use order_store::OrderStore;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::identity::Identity;

/// Header carrying a client-generated idempotency token for order creation.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub order_lines: Vec<OrderLine>,
    pub shipping_address: Address,
    pub billing_address: Address,
    #[serde(default)]
    pub shipping_method: ShippingMethod,
    pub payment: PaymentSubmission,
    // Client-computed pricing, advisory only; the server recomputes and
    // compares before persisting anything.
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub tax: Money,
    pub total: Money,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    pub payment_result: PaymentConfirmation,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: OrderId,
    pub owner_id: UserId,
    pub order_lines: Vec<OrderLine>,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub shipping_method: ShippingMethod,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub tax: Money,
    pub total: Money,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_result: Option<PaymentConfirmation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        let pricing = order.pricing();
        Self {
            id: order.id(),
            owner_id: order.owner(),
            order_lines: order.order_lines().to_vec(),
            shipping_address: order.shipping_address().clone(),
            billing_address: order.billing_address().clone(),
            shipping_method: order.shipping_method(),
            subtotal: pricing.subtotal,
            shipping_cost: pricing.shipping_cost,
            tax: pricing.tax,
            total: pricing.total,
            status: order.status(),
            payment_result: order.payment().cloned(),
            tracking_number: order.tracking_number().map(String::from),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}

// -- Handlers --

/// POST /orders — create an order from a draft and a payment submission.
///
/// Returns 201 with the created order (already `Paid`), or 200 with the
/// existing order when the request is an idempotent replay.
#[tracing::instrument(skip(state, headers, req))]
pub async fn create<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(ctx): Identity,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let idempotency_key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let draft = CheckoutDraft {
        order_lines: req.order_lines,
        shipping_address: req.shipping_address,
        billing_address: req.billing_address,
        shipping_method: req.shipping_method,
        pricing: Pricing {
            subtotal: req.subtotal,
            shipping_cost: req.shipping_cost,
            tax: req.tax,
            total: req.total,
        },
    };

    let created = state
        .orders
        .create_order(&ctx, draft, req.payment, idempotency_key)
        .await?;

    let status = if created.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((status, Json(OrderResponse::from(&created.order))))
}

/// GET /orders — the caller's own orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(ctx): Identity,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orders.list_orders(&ctx).await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// GET /orders/admin — every order in the store. Admin only.
#[tracing::instrument(skip(state))]
pub async fn list_all<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(ctx): Identity,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orders.list_all_orders(&ctx).await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// GET /orders/{id} — a single order for its owner or an admin.
#[tracing::instrument(skip(state))]
pub async fn get<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(ctx): Identity,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.orders.get_order(&ctx, order_id).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// PUT /orders/{id}/pay — attach gateway reconciliation metadata.
#[tracing::instrument(skip(state, req))]
pub async fn record_payment<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(ctx): Identity,
    Path(id): Path<String>,
    Json(req): Json<RecordPaymentRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state
        .orders
        .record_payment_result(&ctx, order_id, req.payment_result)
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// PUT /orders/{id}/cancel — cancel an order before shipment.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(ctx): Identity,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.orders.cancel_order(&ctx, order_id).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// PUT /orders/{id}/status — admin status override.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(ctx): Identity,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state
        .orders
        .update_status(&ctx, order_id, req.status, req.tracking_number)
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("invalid order id: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}
