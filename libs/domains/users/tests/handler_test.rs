//! Handler tests for the Users domain
//!
//! The auth and users routers run over the in-memory store and are driven
//! with `oneshot`, covering status codes, bodies and the auth guards.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::{JwtAuth, JwtConfig};
use database::{InMemoryRepository, MemoryDatabase, Repository};
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use test_utils::TestDataBuilder;
use test_utils::assertions::assert_error_message;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    repo: Arc<InMemoryRepository<User>>,
    jwt: JwtAuth,
}

impl TestApp {
    fn new() -> Self {
        let jwt = JwtAuth::new(&JwtConfig::new("this-is-a-valid-secret-with-32-chars!").unwrap());
        let repo = Arc::new(InMemoryRepository::new(&MemoryDatabase::new()));

        let router = Router::new()
            .nest(
                "/auth",
                auth_handlers::router(AuthService::new(repo.clone(), jwt.clone())),
            )
            .nest(
                "/users",
                handlers::router(UserService::new(repo.clone()), jwt.clone()),
            );

        Self { router, repo, jwt }
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn register(&self, email: &str) -> (String, String) {
        let (status, body) = self
            .call(
                "POST",
                "/auth/register",
                None,
                Some(json!({ "email": email, "password": "secret1", "name": "Jane" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    async fn admin_token(&self, email: &str) -> String {
        let mut admin = User::new(email, "Admin", "unused".into());
        admin.role = Role::Admin;
        let admin = self.repo.create(admin).await.unwrap();
        self.jwt
            .create_token(&admin.id.to_hex(), &admin.email, admin.role.as_str())
            .unwrap()
    }
}

#[tokio::test]
async fn test_register_returns_201_with_token() {
    let app = TestApp::new();
    let builder = TestDataBuilder::from_test_name("register_201");

    let (status, body) = app
        .call(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "email": builder.email("jane"), "password": "secret1", "name": "Jane" })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["email"], builder.email("jane"));
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_register_validation_and_conflict() {
    let app = TestApp::new();
    let builder = TestDataBuilder::from_test_name("register_conflict");

    let (status, body) = app
        .call(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "email": "nope", "password": "123", "name": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["password"].is_array());

    app.register(&builder.email("jane")).await;
    let (status, body) = app
        .call(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "email": builder.email("jane"), "password": "secret1", "name": "Jane" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_error_message(&body, "Email already registered");
}

#[tokio::test]
async fn test_login_flow() {
    let app = TestApp::new();
    let email = TestDataBuilder::from_test_name("login_flow").email("jane");
    app.register(&email).await;

    let (status, body) = app
        .call(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": "secret1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], email);

    let (status, body) = app
        .call(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error_message(&body, "Invalid credentials");
}

#[tokio::test]
async fn test_profile_requires_token() {
    let app = TestApp::new();

    let (status, body) = app.call("GET", "/users/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error_message(&body, "Authentication token is required");

    let (status, body) = app
        .call("GET", "/users/profile", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error_message(&body, "Invalid or expired token");
}

#[tokio::test]
async fn test_profile_read_and_update() {
    let app = TestApp::new();
    let builder = TestDataBuilder::from_test_name("profile_update");
    let (token, id) = app.register(&builder.email("jane")).await;
    app.register(&builder.email("other")).await;

    let (status, body) = app
        .call("GET", "/users/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["isActive"], true);

    let (status, body) = app
        .call(
            "PUT",
            "/users/profile",
            Some(&token),
            Some(json!({ "email": builder.email("other") })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_error_message(&body, "Email already in use");

    let (status, body) = app
        .call(
            "PUT",
            "/users/profile",
            Some(&token),
            Some(json!({ "name": "Renamed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");
}

#[tokio::test]
async fn test_list_users_paginates() {
    let app = TestApp::new();
    let builder = TestDataBuilder::from_test_name("list_users");
    let (token, _) = app.register(&builder.email("a")).await;
    app.register(&builder.email("b")).await;
    app.register(&builder.email("c")).await;

    let (status, body) = app
        .call("GET", "/users?page=2&limit=2", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["page"], 2);
}

#[tokio::test]
async fn test_delete_user_requires_admin() {
    let app = TestApp::new();
    let builder = TestDataBuilder::from_test_name("delete_admin");
    let (token, id) = app.register(&builder.email("jane")).await;

    let (status, body) = app
        .call("DELETE", &format!("/users/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error_message(&body, "Insufficient permissions");

    let admin = app.admin_token(&builder.email("admin")).await;
    let (status, _) = app
        .call("DELETE", &format!("/users/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .call("DELETE", &format!("/users/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_message(&body, "User not found");

    let (status, _) = app
        .call("DELETE", "/users/not-an-object-id", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
