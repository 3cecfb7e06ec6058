//! Caller identity extraction.
//!
//! Authentication itself is handled by the surrounding infrastructure; the
//! resolved identity reaches this service as trusted headers. The extractor
//! turns them into the [`RequestContext`] the domain operations take as a
//! parameter.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::UserId;
use domain::RequestContext;
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the authenticated user's id (UUID).
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header set to `true`/`1` when the caller has admin capabilities.
pub const ADMIN_HEADER: &str = "x-admin";

/// Extractor producing the domain request context from identity headers.
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub RequestContext);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let uuid = Uuid::parse_str(user)
            .map_err(|e| ApiError::BadRequest(format!("invalid {USER_ID_HEADER}: {e}")))?;

        let admin = parts
            .headers
            .get(ADMIN_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "true" || v == "1");

        Ok(Identity(RequestContext {
            user_id: UserId::from_uuid(uuid),
            admin,
        }))
    }
}
