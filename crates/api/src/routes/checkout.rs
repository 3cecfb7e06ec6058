//! Checkout assembly endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::{AddressInput, AddressSelection, CartLine, CheckoutDraft, ShippingMethod};
use order_store::OrderStore;
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;
use crate::identity::Identity;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub order_lines: Vec<CartLine>,
    pub shipping: AddressSelection,
    #[serde(default)]
    pub billing: Option<AddressInput>,
    #[serde(default)]
    pub shipping_method: ShippingMethod,
}

/// POST /checkout — assemble a checkout draft with a pricing estimate.
///
/// The returned draft is what the client hands back, together with the
/// payment submission, to `POST /orders`.
#[tracing::instrument(skip(state, req))]
pub async fn assemble<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(ctx): Identity,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutDraft>, ApiError> {
    let draft = state
        .assembler
        .assemble(
            &ctx,
            req.order_lines,
            req.shipping,
            req.billing,
            req.shipping_method,
        )
        .await?;

    Ok(Json(draft))
}
