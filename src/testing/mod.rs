use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::app;
use crate::config::AppConfig;
use crate::database::MemoryEngine;
use crate::events::EventChannel;
use crate::state::AppState;

pub const TEST_ADMIN_EMAIL: &str = "admin@quill.test";
pub const TEST_SESSION_SECRET: &str = "quill-test-session-secret";

/// Development preset with a fixed admin and secret
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.admin_email = TEST_ADMIN_EMAIL.to_string();
    config.security.session_secret = TEST_SESSION_SECRET.to_string();
    config
}

/// Fresh in-memory state with the startup subscribers
pub fn test_state() -> AppState {
    AppState::with_engine(test_config(), Arc::new(MemoryEngine::new()))
}

/// Fresh in-memory state using a caller-built channel
pub fn test_state_with_channel(channel: EventChannel) -> AppState {
    AppState::with_channel(test_config(), Arc::new(MemoryEngine::new()), channel)
}

/// Drives the router in-process with `tower::ServiceExt::oneshot`
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

/// Status, `Location` header, and parsed JSON body (`Null` when empty)
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_state(test_state())
    }

    pub fn with_state(state: AppState) -> Self {
        let router = app::router(state.clone());
        Self { state, router }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> anyhow::Result<TestResponse> {
        self.send(Method::GET, uri, token, None, Body::empty()).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> anyhow::Result<TestResponse> {
        self.send(Method::DELETE, uri, token, None, Body::empty()).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: &Value) -> anyhow::Result<TestResponse> {
        let body = Body::from(serde_json::to_vec(body)?);
        self.send(Method::POST, uri, token, Some("application/json"), body).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        token: Option<&str>,
        fields: &[(&str, &str)],
    ) -> anyhow::Result<TestResponse> {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.send(
            Method::POST,
            uri,
            token,
            Some("application/x-www-form-urlencoded"),
            Body::from(encoded),
        )
        .await
    }

    /// Create an account and return its session token
    pub async fn join(&self, email: &str, password: &str) -> anyhow::Result<String> {
        let response = self
            .post_json(
                "/auth/join",
                None,
                &serde_json::json!({ "email": email, "password": password }),
            )
            .await?;
        anyhow::ensure!(
            response.status == StatusCode::CREATED,
            "join failed: {} {}",
            response.status,
            response.body
        );
        response.body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("join response has no token"))
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: Body,
    ) -> anyhow::Result<TestResponse> {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }

        let response = self.router.clone().oneshot(request.body(body)?).await?;
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Ok(TestResponse { status, location, body })
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
