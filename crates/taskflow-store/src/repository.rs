//! The storage interface used by the server.
//!
//! [`CredentialStore`] is implemented by [`crate::PgStore`] for production
//! and by [`crate::MemoryStore`] for tests and database-less development.
//! Both implementations follow the same contract:
//!
//! - `insert_user` reports a duplicate email or username as
//!   [`StoreError::UniqueViolation`] with the constraint name
//!   ([`USERS_EMAIL_KEY`](crate::USERS_EMAIL_KEY) or
//!   [`USERS_USERNAME_KEY`](crate::USERS_USERNAME_KEY)).
//! - Every notebook, page and task operation is scoped to `owner`. A record
//!   that exists but belongs to someone else yields
//!   [`StoreError::NotFound`], exactly like a missing one.
//! - Deleting a notebook removes its pages and their tasks.

use async_trait::async_trait;
use taskflow_core::{NotebookId, PageId, TaskId, UserId};

use crate::error::StoreResult;
use crate::models::*;

/// Persistence for users and their notebook → page → task hierarchy.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    // ==================== Users ====================

    /// Insert a new user. Email and username must each be unused.
    async fn insert_user(&self, user: &NewUser) -> StoreResult<UserRow>;

    /// Look up a user by exact username.
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>>;

    /// Get a user by id.
    async fn get_user(&self, id: UserId) -> StoreResult<UserRow>;

    // ==================== Notebooks ====================

    /// List the notebooks owned by `owner`, oldest first.
    async fn list_notebooks(&self, owner: UserId) -> StoreResult<Vec<NotebookRow>>;

    /// Create a notebook owned by `owner`.
    async fn insert_notebook(&self, owner: UserId, name: &str) -> StoreResult<NotebookRow>;

    /// Rename a notebook.
    async fn update_notebook(
        &self,
        owner: UserId,
        id: NotebookId,
        name: &str,
    ) -> StoreResult<NotebookRow>;

    /// Delete a notebook together with its pages and tasks.
    async fn delete_notebook(&self, owner: UserId, id: NotebookId) -> StoreResult<()>;

    // ==================== Pages ====================

    /// List the pages of a notebook, oldest first.
    async fn list_pages(&self, owner: UserId, notebook_id: NotebookId) -> StoreResult<Vec<PageRow>>;

    /// Create a page in one of `owner`'s notebooks.
    async fn insert_page(&self, owner: UserId, page: &NewPage) -> StoreResult<PageRow>;

    /// Apply a partial update to a page.
    async fn update_page(&self, owner: UserId, id: PageId, update: &PageUpdate)
    -> StoreResult<PageRow>;

    /// Delete a page together with its tasks.
    async fn delete_page(&self, owner: UserId, id: PageId) -> StoreResult<()>;

    // ==================== Tasks ====================

    /// List the tasks of a page, oldest first.
    async fn list_tasks(&self, owner: UserId, page_id: PageId) -> StoreResult<Vec<TaskRow>>;

    /// Create a task on one of `owner`'s pages.
    async fn insert_task(&self, owner: UserId, task: &NewTask) -> StoreResult<TaskRow>;

    /// Apply a partial update to a task.
    async fn update_task(&self, owner: UserId, id: TaskId, update: &TaskUpdate)
    -> StoreResult<TaskRow>;

    /// Delete a task.
    async fn delete_task(&self, owner: UserId, id: TaskId) -> StoreResult<()>;
}
