//! HTML pages and static assets.
//!
//! `GET /`, `GET /login` and `GET /signup` serve the matching page from the
//! static directory. Everything else in that directory is under `/static`.

use std::path::Path;

use axum::{Router, routing::get_service};
use tower_http::services::{ServeDir, ServeFile};

use crate::state::AppState;

const MAIN_PAGE: &str = "mainpage.html";
const LOGIN_PAGE: &str = "login.html";
const SIGNUP_PAGE: &str = "signup.html";

/// Build page and asset routes rooted at `static_dir`.
pub fn routes(static_dir: &Path) -> Router<AppState> {
    Router::new()
        .route("/", get_service(ServeFile::new(static_dir.join(MAIN_PAGE))))
        .route("/login", get_service(ServeFile::new(static_dir.join(LOGIN_PAGE))))
        .route("/signup", get_service(ServeFile::new(static_dir.join(SIGNUP_PAGE))))
        .nest_service("/static", ServeDir::new(static_dir))
}
