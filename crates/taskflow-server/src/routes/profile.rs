//! Profile of the signed-in user.

use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;
use taskflow_core::UserId;
use taskflow_store::UserRow;

use crate::error::ApiResult;
use crate::extract::AuthenticatedUser;
use crate::state::AppState;

/// Response for GET /api/profile. Never includes the password hash.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for ProfileResponse {
    fn from(user: UserRow) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// GET /api/profile
async fn get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<ProfileResponse>> {
    let row = state.store().get_user(user.user_id).await?;
    Ok(Json(row.into()))
}

/// Build profile routes (nested under `/api`).
pub fn routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile))
}
