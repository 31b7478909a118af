//! Notebook routes.
//!
//! - GET /api/notebooks - List the caller's notebooks
//! - POST /api/notebooks - Create a notebook
//! - PUT /api/notebooks/{id} - Rename a notebook
//! - DELETE /api/notebooks/{id} - Delete a notebook with its pages and tasks

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use taskflow_core::NotebookId;
use taskflow_store::NotebookRow;

use super::MessageResponse;
use crate::error::{ApiError, ApiResult};
use crate::extract::AuthenticatedUser;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST and PUT.
#[derive(Debug, Deserialize)]
pub struct NotebookRequest {
    pub name: String,
}

/// Response for POST /api/notebooks.
#[derive(Debug, Serialize)]
pub struct CreateNotebookResponse {
    pub message: String,
    pub id: NotebookId,
    pub name: String,
}

fn validated_name(request: NotebookRequest) -> ApiResult<String> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Notebook name is required".to_string()));
    }
    Ok(name.to_string())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/notebooks
async fn list_notebooks(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<NotebookRow>>> {
    let notebooks = state.store().list_notebooks(user.user_id).await?;
    Ok(Json(notebooks))
}

/// POST /api/notebooks
async fn create_notebook(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<NotebookRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateNotebookResponse>)> {
    let Json(request) = payload?;
    let name = validated_name(request)?;

    let notebook = state.store().insert_notebook(user.user_id, &name).await?;
    tracing::info!(notebook_id = %notebook.id, user_id = %user.user_id, "Notebook created");

    Ok((
        StatusCode::CREATED,
        Json(CreateNotebookResponse {
            message: "Notebook created successfully".to_string(),
            id: notebook.id,
            name: notebook.name,
        }),
    ))
}

/// PUT /api/notebooks/{id}
async fn update_notebook(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<NotebookId>, PathRejection>,
    payload: Result<Json<NotebookRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let name = validated_name(request)?;

    state.store().update_notebook(user.user_id, id, &name).await?;

    Ok(Json(MessageResponse::new("Notebook updated successfully")))
}

/// DELETE /api/notebooks/{id}
async fn delete_notebook(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<NotebookId>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = path?;

    state.store().delete_notebook(user.user_id, id).await?;
    tracing::info!(notebook_id = %id, user_id = %user.user_id, "Notebook deleted");

    Ok(Json(MessageResponse::new("Notebook deleted successfully")))
}

/// Build notebook routes (nested under `/api`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notebooks", get(list_notebooks).post(create_notebook))
        .route("/notebooks/{id}", put(update_notebook).delete(delete_notebook))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_is_rejected() {
        let err = validated_name(NotebookRequest {
            name: "   ".to_string(),
        })
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_name_is_trimmed() {
        let name = validated_name(NotebookRequest {
            name: " Work ".to_string(),
        })
        .unwrap();
        assert_eq!(name, "Work");
    }
}
