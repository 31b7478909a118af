//! taskflow-server: HTTP API server for TaskFlow
//!
//! This crate provides:
//! - Signup, login and refresh-token rotation ([`auth::AuthService`])
//! - Access-token middleware guarding every `/api` route
//! - JSON endpoints for notebooks, pages and tasks
//! - The HTML pages and static assets of the web client
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//! - Per-request timeouts
//! - JSON error responses
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use taskflow_server::{AppState, ServerConfig, routes};
//! use taskflow_store::MemoryStore;
//!
//! let config = ServerConfig::from_env()?;
//! let state = AppState::new(Arc::new(MemoryStore::new()), config);
//! let app = routes::build_router(state);
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-exports for convenience
pub use auth::{AuthError, AuthService, TokenPair};
pub use config::{ConfigError, LogFormat, ServerConfig, SessionConfig};
pub use error::{ApiError, ApiResult};
pub use extract::AuthenticatedUser;
pub use state::AppState;

// Re-export dependent crates
pub use taskflow_core;
pub use taskflow_store;
