use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use shiftbook_api::{router, AppState, LedgerConfig};
use shiftbook_db::{Database, DbConfig};
use tower::ServiceExt;

/// Router backed by a fresh in-memory database, plus a token for `alice`.
pub struct TestApp {
    router: Router,
    pub state: Arc<AppState>,
    token: String,
}

/// Status and parsed JSON body (`Value::Null` when empty).
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut config = LedgerConfig::default();
        config.auth.jwt_secret = "test_secret_key_for_testing_purposes_only".to_string();

        let db = Database::new(DbConfig::in_memory())
            .await
            .expect("failed to create test database");
        let state = Arc::new(
            AppState::new(db, config)
                .await
                .expect("failed to start register"),
        );
        let token = state.jwt.issue("alice").expect("failed to issue token");

        TestApp {
            router: router(state.clone()),
            state,
            token,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, json: Option<Value>) -> TestResponse {
        self.send(method, uri, json, Some(&self.token)).await
    }

    pub async fn request_without_auth(&self, method: Method, uri: &str) -> TestResponse {
        self.send(method, uri, None, None).await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        json: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match json {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }
}
