//! Router-level tests: signup, login, refresh and the protected `/api`
//! resources, driven through `tower::ServiceExt::oneshot` over an in-memory
//! store.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use taskflow_core::{TokenSecret, issue_token};
use taskflow_server::{AppState, ServerConfig, SessionConfig, routes};
use taskflow_store::MemoryStore;
use tower::ServiceExt;

const ACCESS_SECRET: &str = "test-access-secret";
const REFRESH_SECRET: &str = "test-refresh-secret";

fn app() -> Router {
    let session = SessionConfig::new(ACCESS_SECRET, REFRESH_SECRET).unwrap();
    let mut config = ServerConfig::with_session(session);
    config.static_dir = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../static"));
    routes::build_router(AppState::new(Arc::new(MemoryStore::new()), config))
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn delete(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn set_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .unwrap()
        .to_string()
}

/// `name=value` part of a `Set-Cookie` header.
fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().trim().to_string()
}

async fn signup(app: &Router, email: &str, username: &str, password: &str) -> Response {
    send(
        app,
        json_request(
            Method::POST,
            "/signup",
            None,
            json!({"email": email, "username": username, "password": password}),
        ),
    )
    .await
}

async fn login(app: &Router, username: &str, password: &str) -> Response {
    send(
        app,
        json_request(
            Method::POST,
            "/login",
            None,
            json!({"username": username, "password": password}),
        ),
    )
    .await
}

/// Sign up and log in, returning the access token and the refresh cookie.
async fn session_for(app: &Router, username: &str) -> (String, String) {
    let email = format!("{}@example.com", username);
    assert_eq!(signup(app, &email, username, "p1").await.status(), StatusCode::OK);
    let response = login(app, username, "p1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = cookie_pair(&set_cookie(&response));
    let body = body_json(response).await;
    (body["accessToken"].as_str().unwrap().to_string(), cookie)
}

#[tokio::test]
async fn test_end_to_end_session() {
    let app = app();

    let response = signup(&app, "a@x.com", "alice", "p1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"User registered successfully");

    let response = login(&app, "alice", "p1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("refreshToken="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=604800"));
    let body = body_json(response).await;
    assert!(body.get("refreshToken").is_none());
    let token = body["accessToken"].as_str().unwrap().to_string();

    let response = send(&app, get("/api/notebooks", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));

    let response = send(&app, get("/api/notebooks", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");

    let response = send(
        &app,
        json_request(Method::POST, "/api/notebooks", Some(&token), json!({"name": ""})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let app = app();
    assert_eq!(signup(&app, "a@x.com", "alice", "p1").await.status(), StatusCode::OK);

    let response = signup(&app, "b@x.com", "alice", "p2").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "username already exists");

    let response = signup(&app, "a@x.com", "bob", "p2").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "email already exists");
}

#[tokio::test]
async fn test_signup_rejects_bad_input() {
    let app = app();
    assert_eq!(
        signup(&app, "", "alice", "p1").await.status(),
        StatusCode::BAD_REQUEST
    );

    let response = send(
        &app,
        Request::builder()
            .method(Method::POST)
            .uri("/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_login_with_unknown_credentials() {
    let app = app();
    assert_eq!(signup(&app, "a@x.com", "alice", "p1").await.status(), StatusCode::OK);

    for (username, password) in [("ghost", "p1"), ("alice", "wrong")] {
        let response = login(&app, username, password).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }
}

#[tokio::test]
async fn test_refresh_rotates_cookie() {
    let app = app();
    let (_, cookie) = session_for(&app, "alice").await;

    let response = send(
        &app,
        Request::builder()
            .method(Method::POST)
            .uri("/refresh-token")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).starts_with("refreshToken="));
    let token = body_json(response).await["accessToken"]
        .as_str()
        .unwrap()
        .to_string();

    let response = send(&app, get("/api/profile", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let profile = body_json(response).await;
    assert_eq!(profile["username"], "alice");
    assert!(profile.get("password_hash").is_none());
}

#[tokio::test]
async fn test_refresh_rejects_missing_and_bad_tokens() {
    let app = app();

    let expired = issue_token(
        "1",
        &TokenSecret::from(REFRESH_SECRET),
        chrono::Duration::seconds(-1),
    )
    .unwrap();
    let access = issue_token(
        "1",
        &TokenSecret::from(ACCESS_SECRET),
        chrono::Duration::minutes(15),
    )
    .unwrap();

    let cookies = [
        None,
        Some("refreshToken=garbage".to_string()),
        Some(format!("refreshToken={}", expired)),
        Some(format!("refreshToken={}", access)),
    ];
    for cookie in cookies {
        let mut builder = Request::builder().method(Method::POST).uri("/refresh-token");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let response = send(&app, builder.body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_middleware_token_handling() {
    let app = app();
    let (token, _) = session_for(&app, "alice").await;

    // Bare token without the Bearer prefix.
    let response = send(
        &app,
        Request::builder()
            .uri("/api/notebooks")
            .header(header::AUTHORIZATION, &token)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let refresh_signed = issue_token(
        "1",
        &TokenSecret::from(REFRESH_SECRET),
        chrono::Duration::minutes(15),
    )
    .unwrap();
    let expired = issue_token(
        "1",
        &TokenSecret::from(ACCESS_SECRET),
        chrono::Duration::seconds(-1),
    )
    .unwrap();
    let not_a_user = issue_token(
        "alice",
        &TokenSecret::from(ACCESS_SECRET),
        chrono::Duration::minutes(15),
    )
    .unwrap();

    for header_value in [
        "Bearer ".to_string(),
        "Bearer not.a.jwt".to_string(),
        format!("Bearer {}", refresh_signed),
        format!("Bearer {}", expired),
        format!("Bearer {}", not_a_user),
    ] {
        let response = send(
            &app,
            Request::builder()
                .uri("/api/notebooks")
                .header(header::AUTHORIZATION, header_value)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_notebook_page_task_lifecycle() {
    let app = app();
    let (token, _) = session_for(&app, "alice").await;
    let token = Some(token.as_str());

    let response = send(
        &app,
        json_request(Method::POST, "/api/notebooks", token, json!({"name": "Work"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let notebook = body_json(response).await;
    assert_eq!(notebook["name"], "Work");
    assert_eq!(notebook["message"], "Notebook created successfully");
    let notebook_id = notebook["id"].as_i64().unwrap();

    let response = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/pages?notebook_id={}", notebook_id),
            token,
            json!({"title": "Plan", "content": "steps"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let page_id = body_json(response).await["id"].as_i64().unwrap();

    let response = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/tasks?page_id={}", page_id),
            token,
            json!({"title": "Ship", "priority": 1}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let task = body_json(response).await;
    assert_eq!(task["status"], "todo");
    assert_eq!(task["priority"], 1);
    assert!(task["due_date"].is_string());
    let task_id = task["id"].as_i64().unwrap();

    let response = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/tasks/{}", task_id),
            token,
            json!({"status": "done"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, get(&format!("/api/tasks/{}", page_id), token)).await;
    let tasks = body_json(response).await;
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["status"], "done");
    assert_eq!(tasks[0]["title"], "Ship");

    let response = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/notebooks/{}", notebook_id),
            token,
            json!({"name": "Work 2"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        delete(&format!("/api/notebooks/{}", notebook_id), token.unwrap()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, get(&format!("/api/pages/{}", notebook_id), token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = send(&app, get(&format!("/api/tasks/{}", page_id), token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resources_are_isolated_between_users() {
    let app = app();
    let (alice, _) = session_for(&app, "alice").await;
    let (bob, _) = session_for(&app, "bob").await;

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/api/notebooks",
            Some(&alice),
            json!({"name": "Private"}),
        ),
    )
    .await;
    let notebook_id = body_json(response).await["id"].as_i64().unwrap();

    let response = send(&app, get("/api/notebooks", Some(&bob))).await;
    assert_eq!(body_json(response).await, json!([]));

    let response = send(&app, get(&format!("/api/pages/{}", notebook_id), Some(&bob))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/notebooks/{}", notebook_id),
            Some(&bob),
            json!({"name": "Stolen"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/pages?notebook_id={}", notebook_id),
            Some(&bob),
            json!({"title": "Injected"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, delete(&format!("/api/notebooks/{}", notebook_id), &bob)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, get("/api/notebooks", Some(&alice))).await;
    assert_eq!(body_json(response).await[0]["name"], "Private");
}

#[tokio::test]
async fn test_bad_ids_are_bad_requests() {
    let app = app();
    let (token, _) = session_for(&app, "alice").await;

    let response = send(&app, get("/api/pages/abc", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        json_request(Method::POST, "/api/pages", Some(&token), json!({"title": "x"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_public_routes() {
    let app = app();

    let response = send(&app, get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");

    let response = send(&app, get("/login", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
}

#[tokio::test]
async fn test_unknown_api_path_requires_token() {
    let app = app();
    let (token, _) = session_for(&app, "alice").await;

    let response = send(&app, get("/api/whatever", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, get("/api/whatever", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_create_accepts_trailing_slash() {
    let app = app();
    let (token, _) = session_for(&app, "alice").await;

    let response = send(
        &app,
        json_request(Method::POST, "/api/notebooks", Some(&token), json!({"name": "Work"})),
    )
    .await;
    let notebook_id = body_json(response).await["id"].as_i64().unwrap();

    let response = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/pages/?notebook_id={}", notebook_id),
            Some(&token),
            json!({"title": "Plan", "content": ""}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let page_id = body_json(response).await["id"].as_i64().unwrap();

    let response = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/tasks/?page_id={}", page_id),
            Some(&token),
            json!({"title": "Ship"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}
