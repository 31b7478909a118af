//! Authentication service: signup, login and refresh-token rotation.
//!
//! [`AuthService`] owns the password and session rules. It talks to the
//! store through [`CredentialStore`] and to the token codec through
//! [`issue_token`] / [`verify_token`], always with the secret that matches
//! the token kind.

use std::sync::{Arc, LazyLock};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use taskflow_core::{TokenError, UserId, issue_token, verify_token};
use taskflow_store::{CredentialStore, NewUser, StoreError, USERS_EMAIL_KEY, USERS_USERNAME_KEY, UserRow};

use crate::config::SessionConfig;

/// Hash checked when the username is unknown, so both login failures cost
/// one Argon2 verification.
static DUMMY_PASSWORD_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("taskflow-unknown-user").ok());

/// Failures of the auth operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A signup field is empty or malformed.
    #[error("{0}")]
    Validation(String),

    /// The email is already registered.
    #[error("email already exists")]
    DuplicateEmail,

    /// The username is already taken.
    #[error("username already exists")]
    DuplicateUsername,

    /// No user matches the given username and password.
    #[error("invalid username or password")]
    NotFound,

    /// A refresh token failed verification.
    #[error("invalid refresh token")]
    InvalidToken(#[source] TokenError),

    /// A token could not be issued.
    #[error("could not issue token")]
    TokenIssue(#[source] TokenError),

    /// A stored password hash could not be processed.
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    /// Unclassified store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Freshly issued access and refresh tokens for one user.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub user_id: UserId,
    pub access_token: String,
    pub refresh_token: String,
}

/// Signup, login and refresh over a credential store.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    session: Arc<SessionConfig>,
}

impl AuthService {
    /// Create a service over `store` using `session` secrets and lifetimes.
    pub fn new(store: Arc<dyn CredentialStore>, session: Arc<SessionConfig>) -> Self {
        Self { store, session }
    }

    /// Session settings this service signs with.
    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    /// Register a new user.
    pub async fn signup(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<UserRow, AuthError> {
        let email = email.trim();
        let username = username.trim();

        if email.is_empty() || username.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "email, username and password are required".to_string(),
            ));
        }
        if !email.contains('@') {
            return Err(AuthError::Validation("email is not valid".to_string()));
        }

        let new_user = NewUser {
            email: email.to_string(),
            username: username.to_string(),
            password_hash: hash_password(password)?,
        };

        match self.store.insert_user(&new_user).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, username = %user.username, "User registered");
                Ok(user)
            }
            Err(StoreError::UniqueViolation { constraint }) if constraint == USERS_EMAIL_KEY => {
                Err(AuthError::DuplicateEmail)
            }
            Err(StoreError::UniqueViolation { constraint }) if constraint == USERS_USERNAME_KEY => {
                Err(AuthError::DuplicateUsername)
            }
            Err(e) => Err(AuthError::Store(e)),
        }
    }

    /// Check credentials and issue a token pair.
    ///
    /// Unknown username and wrong password are indistinguishable.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let Some(user) = self.store.find_user_by_username(username.trim()).await? else {
            if let Some(hash) = DUMMY_PASSWORD_HASH.as_deref() {
                let _ = verify_password(password, hash);
            }
            return Err(AuthError::NotFound);
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(username = %user.username, "Password mismatch");
            return Err(AuthError::NotFound);
        }

        let pair = self.issue_pair(user.id)?;
        tracing::info!(user_id = %user.id, username = %user.username, "User logged in");
        Ok(pair)
    }

    /// Exchange a valid refresh token for a new token pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = verify_token(refresh_token, &self.session.refresh_secret)
            .map_err(AuthError::InvalidToken)?;
        let user_id: UserId = claims.subject.parse().map_err(|_| {
            AuthError::InvalidToken(TokenError::InvalidClaims(
                "userID is not a user id".to_string(),
            ))
        })?;

        let pair = self.issue_pair(user_id)?;
        tracing::debug!(user_id = %user_id, "Session refreshed");
        Ok(pair)
    }

    fn issue_pair(&self, user_id: UserId) -> Result<TokenPair, AuthError> {
        let subject = user_id.to_string();
        let access_token = issue_token(&subject, &self.session.access_secret, self.session.access_ttl)
            .map_err(AuthError::TokenIssue)?;
        let refresh_token =
            issue_token(&subject, &self.session.refresh_secret, self.session.refresh_ttl)
                .map_err(AuthError::TokenIssue)?;

        Ok(TokenPair {
            user_id,
            access_token,
            refresh_token,
        })
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Hash a password using Argon2.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Ok(password_hash.to_string())
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskflow_core::TokenSecret;
    use taskflow_store::MemoryStore;

    fn service() -> AuthService {
        let session = SessionConfig::new("access-secret", "refresh-secret").unwrap();
        AuthService::new(Arc::new(MemoryStore::new()), Arc::new(session))
    }

    #[test]
    fn test_password_hash_verify() {
        let hash = hash_password("test_password").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("test_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_unparseable_hash() {
        assert!(matches!(
            verify_password("pw", "plaintext"),
            Err(AuthError::PasswordHash(_))
        ));
    }

    #[tokio::test]
    async fn test_signup_then_duplicates() {
        let auth = service();
        auth.signup("a@x.com", "alice", "p1").await.unwrap();

        assert!(matches!(
            auth.signup("b@x.com", "alice", "p2").await,
            Err(AuthError::DuplicateUsername)
        ));
        assert!(matches!(
            auth.signup("a@x.com", "bob", "p2").await,
            Err(AuthError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let auth = service();
        assert!(matches!(
            auth.signup("", "alice", "p1").await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            auth.signup("a@x.com", "  ", "p1").await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            auth.signup("not-an-email", "alice", "p1").await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_signup_stores_hash_not_password() {
        let auth = service();
        let user = auth.signup("a@x.com", "alice", "p1").await.unwrap();
        assert_ne!(user.password_hash, "p1");
        assert!(verify_password("p1", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_login_unknown_credentials() {
        let auth = service();
        auth.signup("a@x.com", "alice", "p1").await.unwrap();

        assert!(matches!(auth.login("ghost", "p1").await, Err(AuthError::NotFound)));
        assert!(matches!(auth.login("alice", "wrong").await, Err(AuthError::NotFound)));
    }

    #[test]
    fn test_dummy_hash_is_valid_phc() {
        let hash = DUMMY_PASSWORD_HASH.as_deref().unwrap();
        assert!(!verify_password("p1", hash).unwrap());
    }

    #[tokio::test]
    async fn test_login_with_oversized_ttl_fails_without_panic() {
        let mut session = SessionConfig::new("access-secret", "refresh-secret").unwrap();
        session.refresh_ttl = chrono::Duration::seconds(100_000_000_000_000);
        let auth = AuthService::new(Arc::new(MemoryStore::new()), Arc::new(session));
        auth.signup("a@x.com", "alice", "p1").await.unwrap();

        assert!(matches!(
            auth.login("alice", "p1").await,
            Err(AuthError::TokenIssue(TokenError::LifetimeOutOfRange))
        ));
    }

    #[tokio::test]
    async fn test_login_issues_tokens_under_distinct_secrets() {
        let auth = service();
        let user = auth.signup("a@x.com", "alice", "p1").await.unwrap();
        let pair = auth.login("alice", "p1").await.unwrap();

        assert_eq!(pair.user_id, user.id);
        let session = auth.session();
        let access = verify_token(&pair.access_token, &session.access_secret).unwrap();
        assert_eq!(access.subject, user.id.to_string());
        assert!(verify_token(&pair.access_token, &session.refresh_secret).is_err());
        assert!(verify_token(&pair.refresh_token, &session.refresh_secret).is_ok());
    }

    #[tokio::test]
    async fn test_refresh_keeps_subject() {
        let auth = service();
        let user = auth.signup("a@x.com", "alice", "p1").await.unwrap();
        let pair = auth.login("alice", "p1").await.unwrap();

        let refreshed = auth.refresh(&pair.refresh_token).await.unwrap();
        assert_eq!(refreshed.user_id, user.id);
        let claims = verify_token(&refreshed.access_token, &auth.session().access_secret).unwrap();
        assert_eq!(claims.subject, user.id.to_string());
    }

    #[tokio::test]
    async fn test_refresh_rejects_expired_and_access_tokens() {
        let auth = service();
        let session = auth.session().clone();

        let expired =
            issue_token("1", &session.refresh_secret, chrono::Duration::seconds(-1)).unwrap();
        assert!(matches!(
            auth.refresh(&expired).await,
            Err(AuthError::InvalidToken(TokenError::Expired))
        ));

        let access = issue_token("1", &session.access_secret, session.access_ttl).unwrap();
        assert!(matches!(
            auth.refresh(&access).await,
            Err(AuthError::InvalidToken(_))
        ));

        let foreign = issue_token("1", &TokenSecret::from("other"), session.refresh_ttl).unwrap();
        assert!(matches!(
            auth.refresh(&foreign).await,
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejects_non_numeric_subject() {
        let auth = service();
        let token = issue_token(
            "alice",
            &auth.session().refresh_secret,
            auth.session().refresh_ttl,
        )
        .unwrap();
        assert!(matches!(
            auth.refresh(&token).await,
            Err(AuthError::InvalidToken(_))
        ));
    }
}
