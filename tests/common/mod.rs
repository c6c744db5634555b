//! In-process test harness: builds the router over a temp SQLite database and
//! drives it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use shoplist::auth::{IdTokenVerifier, VerifyError};
use shoplist::config::ServerConfig;
use shoplist::server::{AppState, create_router};
use shoplist::store::{SqliteStore, Store};
use shoplist::types::OAuthProfile;

pub const PASSWORD: &str = "correct horse battery";

pub struct TestApp {
    pub temp_dir: TempDir,
    pub store: Arc<SqliteStore>,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn error(&self) -> Option<&str> {
        self.body["error"].as_str()
    }

    /// The `name=value` pair of the Set-Cookie header, if any.
    pub fn cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }
}

/// Accepts tokens of the form `google:<subject>:<email>` and rejects everything else.
pub struct FakeVerifier;

#[async_trait]
impl IdTokenVerifier for FakeVerifier {
    async fn verify(&self, id_token: &str) -> Result<OAuthProfile, VerifyError> {
        let mut parts = id_token.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("google"), Some(subject), Some(email)) => Ok(OAuthProfile {
                provider: "google".to_string(),
                subject: subject.to_string(),
                email: email.to_string(),
                name: Some("Google User".to_string()),
                photo: Some("https://example.com/photo.png".to_string()),
            }),
            _ => Err(VerifyError::Invalid("bad test token".to_string())),
        }
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_google() -> Self {
        Self::build(Some(Arc::new(FakeVerifier)))
    }

    fn build(verifier: Option<Arc<dyn IdTokenVerifier>>) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");

        let mut config = ServerConfig::default();
        config.data_dir = temp_dir.path().to_path_buf();
        config.app_base_url = "https://lists.example.com".to_string();
        config.session.secret = Some("integration-test-secret".to_string());

        let store = Arc::new(SqliteStore::new(config.db_path()).expect("open store"));
        store.initialize().expect("initialize store");

        let mut state = AppState::new(store.clone(), &config);
        if let Some(verifier) = verifier {
            state = state.with_verifier(verifier);
        }

        Self {
            temp_dir,
            store,
            router: create_router(Arc::new(state)),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers a user and returns their session token.
    pub async fn register(&self, email: &str) -> String {
        let resp = self
            .request(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(serde_json::json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "register {email}: {:?}", resp.body);
        resp.data()["token"]
            .as_str()
            .expect("session token")
            .to_string()
    }

    /// Creates a list and returns its id.
    pub async fn create_list(&self, token: &str, name: &str) -> String {
        let resp = self
            .post("/api/v1/lists", token, serde_json::json!({ "name": name }))
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "{:?}", resp.body);
        resp.data()["id"].as_str().expect("list id").to_string()
    }

    /// Creates a share link and returns its token.
    pub async fn create_link(&self, token: &str, list_id: &str, role: &str) -> String {
        let resp = self
            .post(
                &format!("/api/v1/lists/{list_id}/links"),
                token,
                serde_json::json!({ "role": role }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "{:?}", resp.body);
        resp.data()["token"].as_str().expect("link token").to_string()
    }

    pub async fn redeem(&self, token: &str, link_token: &str) -> TestResponse {
        self.post(
            &format!("/api/v1/links/{link_token}/redeem"),
            token,
            serde_json::json!({}),
        )
        .await
    }
}
