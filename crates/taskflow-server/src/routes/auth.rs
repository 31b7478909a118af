//! Authentication routes: signup, login, refresh-token.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};

use crate::auth::TokenPair;
use crate::config::SessionConfig;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /signup
async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<&'static str> {
    let Json(request) = payload?;

    state
        .auth()
        .signup(&request.email, &request.username, &request.password)
        .await?;

    Ok("User registered successfully")
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<(CookieJar, Json<TokenResponse>)> {
    let Json(request) = payload?;

    let pair = state
        .auth()
        .login(&request.username, &request.password)
        .await?;

    Ok(issue_session(jar, pair, state.session()))
}

/// POST /refresh-token
async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<TokenResponse>)> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| ApiError::Unauthorized("missing refresh token".to_string()))?;

    let pair = state.auth().refresh(&token).await?;

    Ok(issue_session(jar, pair, state.session()))
}

/// Put the refresh token in its cookie and the access token in the body.
fn issue_session(
    jar: CookieJar,
    pair: TokenPair,
    session: &SessionConfig,
) -> (CookieJar, Json<TokenResponse>) {
    let jar = jar.add(refresh_cookie(pair.refresh_token, session));
    (
        jar,
        Json(TokenResponse {
            access_token: pair.access_token,
        }),
    )
}

fn refresh_cookie(token: String, session: &SessionConfig) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(session.cookie_secure)
        .max_age(time::Duration::seconds(session.refresh_ttl.num_seconds()))
        .build()
}

/// Build auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
}
