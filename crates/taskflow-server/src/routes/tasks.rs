//! Task routes.
//!
//! - GET /api/tasks/{page_id} - List a page's tasks
//! - POST /api/tasks?page_id= - Create a task (`/api/tasks/` also accepted)
//! - PUT /api/tasks/{id} - Update any task fields
//! - DELETE /api/tasks/{id} - Delete a task

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use taskflow_core::{PageId, TaskId};
use taskflow_store::{NewTask, TaskRow, TaskUpdate};

use super::MessageResponse;
use crate::error::{ApiError, ApiResult};
use crate::extract::AuthenticatedUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTaskQuery {
    pub page_id: PageId,
}

/// Body for POST. Omitted fields take the store defaults, `due_date` now.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<i32>,
    pub due_date: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    fn into_new_task(self, page_id: PageId) -> NewTask {
        let mut task = NewTask::new(page_id, self.title);
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status.filter(|s| !s.trim().is_empty()) {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        task
    }
}

/// Body for PUT.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<i32>,
    pub due_date: Option<DateTime<Utc>>,
}

impl From<UpdateTaskRequest> for TaskUpdate {
    fn from(request: UpdateTaskRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            status: request.status,
            priority: request.priority,
            due_date: request.due_date,
        }
    }
}

/// GET /api/tasks/{page_id}
async fn list_tasks(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<PageId>, PathRejection>,
) -> ApiResult<Json<Vec<TaskRow>>> {
    let Path(page_id) = path?;
    let tasks = state.store().list_tasks(user.user_id, page_id).await?;
    Ok(Json(tasks))
}

/// POST /api/tasks?page_id=
async fn create_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    query: Result<Query<CreateTaskQuery>, QueryRejection>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskRow>)> {
    let Query(query) = query?;
    let Json(request) = payload?;

    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Task title is required".to_string()));
    }

    let task = state
        .store()
        .insert_task(user.user_id, &request.into_new_task(query.page_id))
        .await?;
    tracing::info!(task_id = %task.id, page_id = %task.page_id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /api/tasks/{id}
async fn update_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<TaskId>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = path?;
    let Json(request) = payload?;

    if request.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ApiError::BadRequest("Task title must not be empty".to_string()));
    }

    state
        .store()
        .update_task(user.user_id, id, &request.into())
        .await?;

    Ok(Json(MessageResponse::new("Task updated successfully")))
}

/// DELETE /api/tasks/{id}
async fn delete_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<TaskId>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = path?;

    state.store().delete_task(user.user_id, id).await?;

    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

/// Build task routes (nested under `/api`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", post(create_task))
        .route("/tasks/", post(create_task))
        .route(
            "/tasks/{id}",
            get(list_tasks).put(update_task).delete(delete_task),
        )
}
