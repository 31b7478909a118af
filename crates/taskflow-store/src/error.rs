//! Error types for the storage layer.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Kind of record a [`StoreError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Notebook,
    Page,
    Task,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Notebook => "notebook",
            Self::Page => "page",
            Self::Task => "task",
        })
    }
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error not otherwise classified.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique constraint rejected an insert.
    ///
    /// `constraint` is the database constraint name, e.g. `users_email_key`.
    /// Callers decide what the violation means.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// The record does not exist or is not owned by the requesting user.
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: i64 },

    /// Migration error.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    pub(crate) fn not_found(entity: Entity, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Convert a sqlx error, lifting unique violations into
    /// [`StoreError::UniqueViolation`].
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::UniqueViolation {
                    constraint: db_err.constraint().unwrap_or_default().to_string(),
                };
            }
        }
        Self::Database(err)
    }
}
