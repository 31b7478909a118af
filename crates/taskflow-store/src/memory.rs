//! In-memory [`CredentialStore`] for tests and running without a database.
//!
//! Mirrors the PostgreSQL behavior: ids are assigned from per-table
//! sequences, the email and username uniqueness checks report the same
//! constraint names, and deletes cascade.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use taskflow_core::{NotebookId, PageId, TaskId, UserId};
use tokio::sync::RwLock;

use crate::error::{Entity, StoreError, StoreResult};
use crate::models::*;
use crate::repository::CredentialStore;

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<UserId, UserRow>,
    notebooks: BTreeMap<NotebookId, NotebookRow>,
    pages: BTreeMap<PageId, PageRow>,
    tasks: BTreeMap<TaskId, TaskRow>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn owns_notebook(&self, owner: UserId, id: NotebookId) -> bool {
        self.notebooks.get(&id).is_some_and(|n| n.user_id == owner)
    }

    fn owns_page(&self, owner: UserId, id: PageId) -> bool {
        self.pages
            .get(&id)
            .is_some_and(|p| self.owns_notebook(owner, p.notebook_id))
    }

    fn owns_task(&self, owner: UserId, id: TaskId) -> bool {
        self.tasks
            .get(&id)
            .is_some_and(|t| self.owns_page(owner, t.page_id))
    }

    fn remove_page(&mut self, id: PageId) {
        self.pages.remove(&id);
        self.tasks.retain(|_, t| t.page_id != id);
    }
}

/// Store that keeps every table in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn insert_user(&self, user: &NewUser) -> StoreResult<UserRow> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation {
                constraint: USERS_EMAIL_KEY.to_string(),
            });
        }
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::UniqueViolation {
                constraint: USERS_USERNAME_KEY.to_string(),
            });
        }

        let row = UserRow {
            id: UserId(tables.next_id()),
            email: user.email.clone(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            created_at: Utc::now(),
        };
        tables.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<UserRow> {
        let tables = self.tables.read().await;
        tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Entity::User, id.get()))
    }

    async fn list_notebooks(&self, owner: UserId) -> StoreResult<Vec<NotebookRow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .notebooks
            .values()
            .filter(|n| n.user_id == owner)
            .cloned()
            .collect())
    }

    async fn insert_notebook(&self, owner: UserId, name: &str) -> StoreResult<NotebookRow> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let row = NotebookRow {
            id: NotebookId(tables.next_id()),
            user_id: owner,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.notebooks.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_notebook(
        &self,
        owner: UserId,
        id: NotebookId,
        name: &str,
    ) -> StoreResult<NotebookRow> {
        let mut tables = self.tables.write().await;
        match tables.notebooks.get_mut(&id) {
            Some(row) if row.user_id == owner => {
                row.name = name.to_string();
                row.updated_at = Utc::now();
                Ok(row.clone())
            }
            _ => Err(StoreError::not_found(Entity::Notebook, id.get())),
        }
    }

    async fn delete_notebook(&self, owner: UserId, id: NotebookId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.owns_notebook(owner, id) {
            return Err(StoreError::not_found(Entity::Notebook, id.get()));
        }

        tables.notebooks.remove(&id);
        let pages: Vec<PageId> = tables
            .pages
            .values()
            .filter(|p| p.notebook_id == id)
            .map(|p| p.id)
            .collect();
        for page in pages {
            tables.remove_page(page);
        }
        Ok(())
    }

    async fn list_pages(&self, owner: UserId, notebook_id: NotebookId) -> StoreResult<Vec<PageRow>> {
        let tables = self.tables.read().await;
        if !tables.owns_notebook(owner, notebook_id) {
            return Err(StoreError::not_found(Entity::Notebook, notebook_id.get()));
        }
        Ok(tables
            .pages
            .values()
            .filter(|p| p.notebook_id == notebook_id)
            .cloned()
            .collect())
    }

    async fn insert_page(&self, owner: UserId, page: &NewPage) -> StoreResult<PageRow> {
        let mut tables = self.tables.write().await;
        if !tables.owns_notebook(owner, page.notebook_id) {
            return Err(StoreError::not_found(Entity::Notebook, page.notebook_id.get()));
        }

        let now = Utc::now();
        let row = PageRow {
            id: PageId(tables.next_id()),
            notebook_id: page.notebook_id,
            title: page.title.clone(),
            content: page.content.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.pages.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_page(
        &self,
        owner: UserId,
        id: PageId,
        update: &PageUpdate,
    ) -> StoreResult<PageRow> {
        let mut tables = self.tables.write().await;
        if !tables.owns_page(owner, id) {
            return Err(StoreError::not_found(Entity::Page, id.get()));
        }

        let row = tables
            .pages
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Entity::Page, id.get()))?;
        if let Some(title) = &update.title {
            row.title = title.clone();
        }
        if let Some(content) = &update.content {
            row.content = content.clone();
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_page(&self, owner: UserId, id: PageId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.owns_page(owner, id) {
            return Err(StoreError::not_found(Entity::Page, id.get()));
        }
        tables.remove_page(id);
        Ok(())
    }

    async fn list_tasks(&self, owner: UserId, page_id: PageId) -> StoreResult<Vec<TaskRow>> {
        let tables = self.tables.read().await;
        if !tables.owns_page(owner, page_id) {
            return Err(StoreError::not_found(Entity::Page, page_id.get()));
        }
        Ok(tables
            .tasks
            .values()
            .filter(|t| t.page_id == page_id)
            .cloned()
            .collect())
    }

    async fn insert_task(&self, owner: UserId, task: &NewTask) -> StoreResult<TaskRow> {
        let mut tables = self.tables.write().await;
        if !tables.owns_page(owner, task.page_id) {
            return Err(StoreError::not_found(Entity::Page, task.page_id.get()));
        }

        let now = Utc::now();
        let row = TaskRow {
            id: TaskId(tables.next_id()),
            page_id: task.page_id,
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status.clone(),
            priority: task.priority,
            due_date: Some(task.due_date),
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_task(
        &self,
        owner: UserId,
        id: TaskId,
        update: &TaskUpdate,
    ) -> StoreResult<TaskRow> {
        let mut tables = self.tables.write().await;
        if !tables.owns_task(owner, id) {
            return Err(StoreError::not_found(Entity::Task, id.get()));
        }

        let row = tables
            .tasks
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Entity::Task, id.get()))?;
        if let Some(title) = &update.title {
            row.title = title.clone();
        }
        if let Some(description) = &update.description {
            row.description = description.clone();
        }
        if let Some(status) = &update.status {
            row.status = status.clone();
        }
        if let Some(priority) = update.priority {
            row.priority = priority;
        }
        if let Some(due_date) = update.due_date {
            row.due_date = Some(due_date);
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_task(&self, owner: UserId, id: TaskId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.owns_task(owner, id) {
            return Err(StoreError::not_found(Entity::Task, id.get()));
        }
        tables.tasks.remove(&id);
        Ok(())
    }
}
