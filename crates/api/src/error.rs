//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, OrderError};
use order_store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// No caller identity on the request.
    Unauthorized,
    /// Bad request from the client.
    BadRequest(String),
    /// Resource not found.
    NotFound(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "missing or invalid caller identity".to_string(),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    match &err {
        DomainError::Order(order_err) => match order_err {
            OrderError::InvalidTransition { .. } => (StatusCode::CONFLICT, err.to_string()),
            OrderError::EmptyCart
            | OrderError::InvalidQuantity { .. }
            | OrderError::InvalidPrice { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        },
        DomainError::InvalidPayment { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        // A pricing disagreement means the client draft is stale or
        // tampered; surfaced distinctly so the client can re-run checkout.
        DomainError::PricingMismatch { .. } => (StatusCode::CONFLICT, err.to_string()),
        DomainError::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
        DomainError::OrderNotFound(_) | DomainError::AddressNotFound(_) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        DomainError::Store(StoreError::VersionConflict { .. }) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        DomainError::Store(
            StoreError::DuplicateOrder(_) | StoreError::DuplicateIdempotencyKey(_),
        ) => (StatusCode::CONFLICT, err.to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}
