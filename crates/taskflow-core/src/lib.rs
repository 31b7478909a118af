//! taskflow-core: Core types and session primitives for TaskFlow
//!
//! This crate provides:
//! - Typed identifiers for users, notebooks, pages and tasks
//! - The session token codec (HS256 JWT issue/verify)
//!
//! Nothing in here performs I/O.

pub mod token;
pub mod types;

pub use token::{Claims, TokenError, TokenSecret, issue_token, verify_token};
pub use types::{NotebookId, PageId, TaskId, UserId};
