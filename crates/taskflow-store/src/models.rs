//! Database models for the storage layer.
//!
//! Row types map directly to table rows and are used for sqlx queries.
//! Resource rows also derive `Serialize` because the HTTP layer returns them
//! as-is.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use taskflow_core::{NotebookId, PageId, TaskId, UserId};

/// Unique constraint on `users.email`.
pub const USERS_EMAIL_KEY: &str = "users_email_key";

/// Unique constraint on `users.username`.
pub const USERS_USERNAME_KEY: &str = "users_username_key";

/// Status assigned to tasks created without one.
pub const DEFAULT_TASK_STATUS: &str = "todo";

// ==================== Users ====================

/// Database row for the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    #[sqlx(try_from = "i64")]
    pub id: UserId,
    pub email: String,
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

// ==================== Notebooks ====================

/// Database row for the `notebooks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotebookRow {
    #[sqlx(try_from = "i64")]
    pub id: NotebookId,
    #[sqlx(try_from = "i64")]
    pub user_id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==================== Pages ====================

/// Database row for the `pages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PageRow {
    #[sqlx(try_from = "i64")]
    pub id: PageId,
    #[sqlx(try_from = "i64")]
    pub notebook_id: NotebookId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new page.
#[derive(Debug, Clone)]
pub struct NewPage {
    pub notebook_id: NotebookId,
    pub title: String,
    pub content: String,
}

/// Partial update of a page. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct PageUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

// ==================== Tasks ====================

/// Database row for the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskRow {
    #[sqlx(try_from = "i64")]
    pub id: TaskId,
    #[sqlx(try_from = "i64")]
    pub page_id: PageId,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: i32,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub page_id: PageId,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: i32,
    pub due_date: DateTime<Utc>,
}

impl NewTask {
    /// A task with default status, priority zero, due now.
    pub fn new(page_id: PageId, title: impl Into<String>) -> Self {
        Self {
            page_id,
            title: title.into(),
            description: String::new(),
            status: DEFAULT_TASK_STATUS.to_string(),
            priority: 0,
            due_date: Utc::now(),
        }
    }
}

/// Partial update of a task. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<i32>,
    pub due_date: Option<DateTime<Utc>>,
}
