//! taskflow-store: Persistence for TaskFlow
//!
//! This crate provides:
//! - The [`CredentialStore`] trait the server is written against
//! - [`PgStore`], the PostgreSQL implementation (sqlx connection pool)
//! - [`MemoryStore`], an in-process implementation for tests and local runs
//! - Row models and the embedded schema migration
//!
//! # Usage
//!
//! ```rust,ignore
//! use taskflow_store::{PgStore, StoreConfig};
//!
//! let config = StoreConfig::from_env("postgres://localhost/taskflow");
//! let store = PgStore::connect(config).await?;
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod repository;
pub mod schema;
pub mod store;

pub use error::{Entity, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use models::*;
pub use repository::CredentialStore;
pub use store::{PgStore, StoreConfig};

// Re-export core types for convenience
pub use taskflow_core;
