//! Route definitions for the HTTP API.
//!
//! Public: `/health`, `/signup`, `/login`, `/refresh-token` and the HTML
//! pages. Everything under `/api` sits behind
//! [`require_access_token`](crate::middleware::auth::require_access_token).

pub mod auth;
pub mod health;
pub mod notebooks;
pub mod pages;
pub mod profile;
pub mod site;
pub mod tasks;

use axum::{Router, middleware};
use serde::Serialize;

use crate::error::ApiError;
use crate::middleware::auth::require_access_token;
use crate::state::AppState;

/// `{"message": ...}` body returned by update and delete handlers.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Unknown `/api` path. Runs behind the auth layer, so callers without a
/// valid token see 401 rather than 404.
async fn api_not_found() -> ApiError {
    ApiError::NotFound("no such endpoint".to_string())
}

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(profile::routes())
        .merge(notebooks::routes())
        .merge(pages::routes())
        .merge(tasks::routes())
        .fallback(api_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_access_token,
        ));

    let site = site::routes(&state.config().static_dir);

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(site)
        .nest("/api", api)
        .with_state(state)
}
