//! Server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use taskflow_core::TokenSecret;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected \"text\" or \"json\", got {:?}", other)),
        }
    }
}

/// Session token settings.
///
/// Built once at startup and shared read-only by the auth service and the
/// auth middleware.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Key for access tokens.
    pub access_secret: TokenSecret,
    /// Key for refresh tokens. Never equal to `access_secret`.
    pub refresh_secret: TokenSecret,
    /// Lifetime of an access token.
    pub access_ttl: chrono::Duration,
    /// Lifetime of a refresh token, also the refresh cookie's `Max-Age`.
    pub refresh_ttl: chrono::Duration,
    /// Mark the refresh cookie `Secure`.
    pub cookie_secure: bool,
}

impl SessionConfig {
    /// Default access token lifetime: 15 minutes.
    pub const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;
    /// Default refresh token lifetime: 7 days.
    pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;
    /// Upper bound for either lifetime: one year.
    pub const MAX_TTL_SECS: i64 = 365 * 24 * 60 * 60;

    /// Session settings with default lifetimes.
    ///
    /// Fails if either secret is empty or both are the same.
    pub fn new(
        access_secret: impl Into<TokenSecret>,
        refresh_secret: impl Into<TokenSecret>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl: chrono::Duration::seconds(Self::DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl: chrono::Duration::seconds(Self::DEFAULT_REFRESH_TTL_SECS),
            cookie_secure: false,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.access_secret.is_empty() {
            return Err(invalid("ACCESS_TOKEN_SECRET", "must not be empty"));
        }
        if self.refresh_secret.is_empty() {
            return Err(invalid("REFRESH_TOKEN_SECRET", "must not be empty"));
        }
        if self.access_secret == self.refresh_secret {
            return Err(invalid(
                "REFRESH_TOKEN_SECRET",
                "must differ from ACCESS_TOKEN_SECRET",
            ));
        }
        check_ttl("ACCESS_TOKEN_TTL_SECS", self.access_ttl)?;
        check_ttl("REFRESH_TOKEN_TTL_SECS", self.refresh_ttl)?;
        Ok(())
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Database connection URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
    /// Directory holding the HTML pages and `/static` assets.
    pub static_dir: PathBuf,
    /// Per-request deadline.
    pub request_timeout: Duration,
    /// Token secrets and lifetimes.
    pub session: SessionConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `ACCESS_TOKEN_SECRET`: HMAC key for access tokens
    /// - `REFRESH_TOKEN_SECRET`: HMAC key for refresh tokens (must differ)
    ///
    /// Optional:
    /// - `DATABASE_URL`: Postgres connection string (default: in-memory store)
    /// - `PORT`: Server port (default: 8080)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `LOG_FORMAT`: "text" or "json" (default: "text")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "http://localhost:8080")
    /// - `ACCESS_TOKEN_TTL_SECS`: default 900
    /// - `REFRESH_TOKEN_TTL_SECS`: default 604800
    /// - `COOKIE_SECURE`: default false
    /// - `STATIC_DIR`: default "static"
    /// - `REQUEST_TIMEOUT_SECS`: default 30
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        let port = parse_var("PORT", 8080)?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("LOG_FORMAT") {
            Ok(value) => value
                .parse()
                .map_err(|reason: String| invalid("LOG_FORMAT", &reason))?,
            Err(_) => LogFormat::default(),
        };

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        let static_dir = env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("static"));

        let request_timeout = Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 30)?);

        let session = SessionConfig {
            access_secret: required_var("ACCESS_TOKEN_SECRET")?.into(),
            refresh_secret: required_var("REFRESH_TOKEN_SECRET")?.into(),
            access_ttl: ttl_var("ACCESS_TOKEN_TTL_SECS", SessionConfig::DEFAULT_ACCESS_TTL_SECS)?,
            refresh_ttl: ttl_var("REFRESH_TOKEN_TTL_SECS", SessionConfig::DEFAULT_REFRESH_TTL_SECS)?,
            cookie_secure: parse_var("COOKIE_SECURE", false)?,
        };
        session.validate()?;

        Ok(Self {
            database_url,
            port,
            log_level,
            log_format,
            cors_allowed_origins,
            static_dir,
            request_timeout,
            session,
        })
    }

    /// Configuration for tests and embedding: in-memory store, default
    /// settings, the given session.
    pub fn with_session(session: SessionConfig) -> Self {
        Self {
            database_url: None,
            port: 8080,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            cors_allowed_origins: "http://localhost:8080".to_string(),
            static_dir: PathBuf::from("static"),
            request_timeout: Duration::from_secs(30),
            session,
        }
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn required_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(name, &e.to_string())),
        Err(_) => Ok(default),
    }
}

fn ttl_var(name: &str, default_secs: i64) -> Result<chrono::Duration, ConfigError> {
    let secs = parse_var(name, default_secs)?;
    chrono::Duration::try_seconds(secs).ok_or_else(|| invalid(name, "out of range"))
}

fn check_ttl(name: &str, ttl: chrono::Duration) -> Result<(), ConfigError> {
    if ttl <= chrono::Duration::zero() {
        return Err(invalid(name, "must be positive"));
    }
    if ttl > chrono::Duration::seconds(SessionConfig::MAX_TTL_SECS) {
        return Err(invalid(name, "must be at most one year"));
    }
    Ok(())
}

fn invalid(name: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}
