//! Access-token middleware for the `/api` routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use taskflow_core::{UserId, verify_token};

use crate::error::ApiError;
use crate::extract::AuthenticatedUser;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Require a valid access token on every request.
///
/// Reads `Authorization`, accepting the token with or without a `Bearer `
/// prefix, verifies it against the access secret and inserts
/// [`AuthenticatedUser`] into the request extensions. Any failure ends the
/// request with 401 before the handler runs.
pub async fn require_access_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, &request) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(rejection) => rejection.into_response(),
    }
}

fn authenticate(state: &AppState, request: &Request) -> Result<AuthenticatedUser, ApiError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| unauthorized("missing authorization header"))?;
    let header_value = header_value
        .to_str()
        .map_err(|_| unauthorized("invalid authorization header"))?;

    let token = header_value
        .strip_prefix(BEARER_PREFIX)
        .unwrap_or(header_value)
        .trim();
    if token.is_empty() {
        return Err(unauthorized("missing token"));
    }

    let claims = verify_token(token, &state.session().access_secret).map_err(|e| {
        tracing::debug!(error = %e, path = %request.uri().path(), "Access token rejected");
        unauthorized("invalid or expired token")
    })?;

    let user_id: UserId = claims
        .subject
        .parse()
        .map_err(|_| unauthorized("invalid token subject"))?;

    Ok(AuthenticatedUser { user_id })
}

fn unauthorized(message: &str) -> ApiError {
    ApiError::Unauthorized(message.to_string())
}
