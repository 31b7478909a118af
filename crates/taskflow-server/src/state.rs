//! Application state shared across handlers.

use std::sync::Arc;

use taskflow_store::CredentialStore;

use crate::auth::AuthService;
use crate::config::{ServerConfig, SessionConfig};

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Credential and resource store.
    store: Arc<dyn CredentialStore>,
    /// Server configuration.
    config: Arc<ServerConfig>,
    /// Session secrets, shared with `auth`.
    session: Arc<SessionConfig>,
    /// Signup, login and refresh.
    auth: AuthService,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: Arc<dyn CredentialStore>, config: ServerConfig) -> Self {
        let session = Arc::new(config.session.clone());
        let auth = AuthService::new(Arc::clone(&store), Arc::clone(&session));
        Self {
            store,
            config: Arc::new(config),
            session,
            auth,
        }
    }

    /// Get a reference to the store.
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Session secrets and lifetimes.
    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    /// Get the auth service.
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
