//! Authenticated-user extraction for handlers behind the auth middleware.

use axum::{extract::FromRequestParts, http::request::Parts};
use taskflow_core::UserId;

use crate::error::ApiError;

/// The user whose access token authorized this request.
///
/// Inserted into request extensions by
/// [`require_access_token`](crate::middleware::auth::require_access_token).
/// Extracting it in a handler that is not behind that middleware fails with
/// 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or_else(|| ApiError::Unauthorized("authentication required".to_string()))
    }
}
