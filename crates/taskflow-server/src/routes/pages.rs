//! Page routes.
//!
//! - GET /api/pages/{notebook_id} - List a notebook's pages
//! - POST /api/pages?notebook_id= - Create a page (`/api/pages/` also accepted)
//! - PUT /api/pages/{id} - Update title and/or content
//! - DELETE /api/pages/{id} - Delete a page with its tasks
//!
//! GET takes a notebook id while PUT and DELETE take a page id on the same
//! path, so all three share one route.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use taskflow_core::{NotebookId, PageId};
use taskflow_store::{NewPage, PageRow, PageUpdate};

use super::MessageResponse;
use crate::error::{ApiError, ApiResult};
use crate::extract::AuthenticatedUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePageQuery {
    pub notebook_id: NotebookId,
}

#[derive(Debug, Deserialize)]
pub struct CreatePageRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePageRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatePageResponse {
    pub message: String,
    pub id: PageId,
    pub title: String,
    pub content: String,
}

/// GET /api/pages/{notebook_id}
async fn list_pages(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<NotebookId>, PathRejection>,
) -> ApiResult<Json<Vec<PageRow>>> {
    let Path(notebook_id) = path?;
    let pages = state.store().list_pages(user.user_id, notebook_id).await?;
    Ok(Json(pages))
}

/// POST /api/pages?notebook_id=
async fn create_page(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    query: Result<Query<CreatePageQuery>, QueryRejection>,
    payload: Result<Json<CreatePageRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatePageResponse>)> {
    let Query(query) = query?;
    let Json(request) = payload?;

    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Page title is required".to_string()));
    }

    let page = state
        .store()
        .insert_page(
            user.user_id,
            &NewPage {
                notebook_id: query.notebook_id,
                title: request.title,
                content: request.content,
            },
        )
        .await?;
    tracing::info!(page_id = %page.id, notebook_id = %page.notebook_id, "Page created");

    Ok((
        StatusCode::CREATED,
        Json(CreatePageResponse {
            message: "Page created successfully".to_string(),
            id: page.id,
            title: page.title,
            content: page.content,
        }),
    ))
}

/// PUT /api/pages/{id}
async fn update_page(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<PageId>, PathRejection>,
    payload: Result<Json<UpdatePageRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = path?;
    let Json(request) = payload?;

    if request.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ApiError::BadRequest("Page title must not be empty".to_string()));
    }

    let update = PageUpdate {
        title: request.title,
        content: request.content,
    };
    state.store().update_page(user.user_id, id, &update).await?;

    Ok(Json(MessageResponse::new("Page updated successfully")))
}

/// DELETE /api/pages/{id}
async fn delete_page(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<PageId>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = path?;

    state.store().delete_page(user.user_id, id).await?;
    tracing::info!(page_id = %id, user_id = %user.user_id, "Page deleted");

    Ok(Json(MessageResponse::new("Page deleted successfully")))
}

/// Build page routes (nested under `/api`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pages", post(create_page))
        .route("/pages/", post(create_page))
        .route(
            "/pages/{id}",
            get(list_pages).put(update_page).delete(delete_page),
        )
}
