//! PostgreSQL implementation of [`CredentialStore`].
//!
//! Every operation is a single parameterized statement. Ownership checks are
//! folded into the statement itself (`WHERE ... AND n.user_id = $2`), so a
//! record owned by another user is indistinguishable from a missing one.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use taskflow_core::{NotebookId, PageId, TaskId, UserId};

use crate::error::{Entity, StoreError, StoreResult};
use crate::models::*;
use crate::repository::CredentialStore;
use crate::schema;

const USER_COLUMNS: &str = "id, email, username, password_hash, created_at";
const NOTEBOOK_COLUMNS: &str = "id, user_id, name, created_at, updated_at";
const PAGE_COLUMNS: &str = "id, notebook_id, title, content, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, page_id, title, description, status, priority, due_date, created_at, updated_at";

/// Configuration for connecting to the database.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database connection URL.
    pub database_url: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Minimum number of connections to maintain.
    pub min_connections: u32,
    /// How long a request may wait for a pooled connection.
    pub acquire_timeout: Duration,
    /// Run migrations on connect.
    pub run_migrations: bool,
}

impl StoreConfig {
    /// Pool settings for `database_url` with defaults.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Pool settings for `database_url`, overridden from the environment.
    ///
    /// Reads:
    /// - `DATABASE_MAX_CONNECTIONS` - Optional, defaults to 10
    /// - `DATABASE_MIN_CONNECTIONS` - Optional, defaults to 1
    /// - `DATABASE_ACQUIRE_TIMEOUT_SECS` - Optional, defaults to 5
    /// - `DATABASE_RUN_MIGRATIONS` - Optional, defaults to true
    pub fn from_env(database_url: impl Into<String>) -> Self {
        let defaults = Self::new(database_url);

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_connections);

        let min_connections = std::env::var("DATABASE_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.min_connections);

        let acquire_timeout = std::env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.acquire_timeout);

        let run_migrations = std::env::var("DATABASE_RUN_MIGRATIONS")
            .ok()
            .map(|s| s.to_lowercase() != "false" && s != "0")
            .unwrap_or(defaults.run_migrations);

        Self {
            max_connections,
            min_connections,
            acquire_timeout,
            run_migrations,
            ..defaults
        }
    }
}

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database with the given configuration.
    ///
    /// Runs migrations if `config.run_migrations` is true.
    pub async fn connect(config: StoreConfig) -> StoreResult<Self> {
        tracing::info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await?;

        tracing::info!("Connected to database");

        if config.run_migrations {
            schema::run_migrations(&pool).await?;
        } else if !schema::is_schema_initialized(&pool).await? {
            tracing::warn!("Migrations disabled and schema not initialized");
        }

        Ok(Self { pool })
    }

    async fn notebook_owned(&self, owner: UserId, id: NotebookId) -> StoreResult<()> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM notebooks WHERE id = $1 AND user_id = $2)",
        )
        .bind(id.get())
        .bind(owner.get())
        .fetch_one(&self.pool)
        .await?;

        if exists {
            Ok(())
        } else {
            Err(StoreError::not_found(Entity::Notebook, id.get()))
        }
    }

    async fn page_owned(&self, owner: UserId, id: PageId) -> StoreResult<()> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM pages p
                JOIN notebooks n ON n.id = p.notebook_id
                WHERE p.id = $1 AND n.user_id = $2
            )
            "#,
        )
        .bind(id.get())
        .bind(owner.get())
        .fetch_one(&self.pool)
        .await?;

        if exists {
            Ok(())
        } else {
            Err(StoreError::not_found(Entity::Page, id.get()))
        }
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    // ==================== User Operations ====================

    async fn insert_user(&self, user: &NewUser) -> StoreResult<UserRow> {
        sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (email, username, password_hash) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        Ok(sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<UserRow> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found(Entity::User, id.get()))
    }

    // ==================== Notebook Operations ====================

    async fn list_notebooks(&self, owner: UserId) -> StoreResult<Vec<NotebookRow>> {
        Ok(sqlx::query_as::<_, NotebookRow>(&format!(
            "SELECT {NOTEBOOK_COLUMNS} FROM notebooks WHERE user_id = $1 ORDER BY id"
        ))
        .bind(owner.get())
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_notebook(&self, owner: UserId, name: &str) -> StoreResult<NotebookRow> {
        sqlx::query_as::<_, NotebookRow>(&format!(
            "INSERT INTO notebooks (user_id, name) VALUES ($1, $2) RETURNING {NOTEBOOK_COLUMNS}"
        ))
        .bind(owner.get())
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn update_notebook(
        &self,
        owner: UserId,
        id: NotebookId,
        name: &str,
    ) -> StoreResult<NotebookRow> {
        sqlx::query_as::<_, NotebookRow>(&format!(
            r#"
            UPDATE notebooks SET name = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {NOTEBOOK_COLUMNS}
            "#
        ))
        .bind(id.get())
        .bind(owner.get())
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found(Entity::Notebook, id.get()))
    }

    async fn delete_notebook(&self, owner: UserId, id: NotebookId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM notebooks WHERE id = $1 AND user_id = $2")
            .bind(id.get())
            .bind(owner.get())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(Entity::Notebook, id.get()));
        }
        Ok(())
    }

    // ==================== Page Operations ====================

    async fn list_pages(&self, owner: UserId, notebook_id: NotebookId) -> StoreResult<Vec<PageRow>> {
        self.notebook_owned(owner, notebook_id).await?;

        Ok(sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE notebook_id = $1 ORDER BY id"
        ))
        .bind(notebook_id.get())
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_page(&self, owner: UserId, page: &NewPage) -> StoreResult<PageRow> {
        sqlx::query_as::<_, PageRow>(&format!(
            r#"
            INSERT INTO pages (notebook_id, title, content)
            SELECT $1, $2, $3
            WHERE EXISTS (SELECT 1 FROM notebooks WHERE id = $1 AND user_id = $4)
            RETURNING {PAGE_COLUMNS}
            "#
        ))
        .bind(page.notebook_id.get())
        .bind(&page.title)
        .bind(&page.content)
        .bind(owner.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or_else(|| StoreError::not_found(Entity::Notebook, page.notebook_id.get()))
    }

    async fn update_page(
        &self,
        owner: UserId,
        id: PageId,
        update: &PageUpdate,
    ) -> StoreResult<PageRow> {
        sqlx::query_as::<_, PageRow>(
            r#"
            UPDATE pages p SET
                title = COALESCE($3, p.title),
                content = COALESCE($4, p.content),
                updated_at = NOW()
            FROM notebooks n
            WHERE p.id = $1 AND n.id = p.notebook_id AND n.user_id = $2
            RETURNING p.id, p.notebook_id, p.title, p.content, p.created_at, p.updated_at
            "#,
        )
        .bind(id.get())
        .bind(owner.get())
        .bind(update.title.as_deref())
        .bind(update.content.as_deref())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found(Entity::Page, id.get()))
    }

    async fn delete_page(&self, owner: UserId, id: PageId) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM pages p USING notebooks n
            WHERE p.id = $1 AND n.id = p.notebook_id AND n.user_id = $2
            "#,
        )
        .bind(id.get())
        .bind(owner.get())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(Entity::Page, id.get()));
        }
        Ok(())
    }

    // ==================== Task Operations ====================

    async fn list_tasks(&self, owner: UserId, page_id: PageId) -> StoreResult<Vec<TaskRow>> {
        self.page_owned(owner, page_id).await?;

        Ok(sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE page_id = $1 ORDER BY id"
        ))
        .bind(page_id.get())
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_task(&self, owner: UserId, task: &NewTask) -> StoreResult<TaskRow> {
        sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            INSERT INTO tasks (page_id, title, description, status, priority, due_date)
            SELECT $1, $2, $3, $4, $5, $6
            WHERE EXISTS (
                SELECT 1 FROM pages p
                JOIN notebooks n ON n.id = p.notebook_id
                WHERE p.id = $1 AND n.user_id = $7
            )
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(task.page_id.get())
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.status)
        .bind(task.priority)
        .bind(task.due_date)
        .bind(owner.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or_else(|| StoreError::not_found(Entity::Page, task.page_id.get()))
    }

    async fn update_task(
        &self,
        owner: UserId,
        id: TaskId,
        update: &TaskUpdate,
    ) -> StoreResult<TaskRow> {
        sqlx::query_as::<_, TaskRow>(
            r#"
            UPDATE tasks t SET
                title = COALESCE($3, t.title),
                description = COALESCE($4, t.description),
                status = COALESCE($5, t.status),
                priority = COALESCE($6, t.priority),
                due_date = COALESCE($7, t.due_date),
                updated_at = NOW()
            FROM pages p
            JOIN notebooks n ON n.id = p.notebook_id
            WHERE t.id = $1 AND p.id = t.page_id AND n.user_id = $2
            RETURNING t.id, t.page_id, t.title, t.description, t.status, t.priority,
                      t.due_date, t.created_at, t.updated_at
            "#,
        )
        .bind(id.get())
        .bind(owner.get())
        .bind(update.title.as_deref())
        .bind(update.description.as_deref())
        .bind(update.status.as_deref())
        .bind(update.priority)
        .bind(update.due_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found(Entity::Task, id.get()))
    }

    async fn delete_task(&self, owner: UserId, id: TaskId) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks t USING pages p, notebooks n
            WHERE t.id = $1 AND p.id = t.page_id AND n.id = p.notebook_id AND n.user_id = $2
            "#,
        )
        .bind(id.get())
        .bind(owner.get())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(Entity::Task, id.get()));
        }
        Ok(())
    }
}
