//! Shared harness: an in-memory router driven with `oneshot`

#![allow(dead_code)]

use api::{
    AppState,
    config::{ApiConfig, BootstrapAdmin, JwtSettings, OrderSettings, StorageBackend},
    rate_limiter::RateLimiterConfig,
    repositories::Stores,
    routes::create_router,
};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use common::cache::RevocationList;
use domain::ProgressPolicy;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_LOGIN: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-pass";

pub fn test_config(policy: ProgressPolicy) -> ApiConfig {
    ApiConfig {
        bind_address: "127.0.0.1:0".to_string(),
        storage: StorageBackend::Memory,
        jwt: JwtSettings {
            secret: "integration-test-secret-0123456789".to_string(),
            access_token_expiry: 3600,
        },
        orders: OrderSettings {
            progress_policy: policy,
        },
        login_throttle: RateLimiterConfig {
            max_attempts: 3,
            window_seconds: 300,
            ban_duration_seconds: 300,
        },
        bootstrap_admin: Some(BootstrapAdmin {
            login: ADMIN_LOGIN.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            full_name: "Administrator".to_string(),
        }),
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_policy(ProgressPolicy::AutoAdvance).await
    }

    pub async fn with_policy(policy: ProgressPolicy) -> Self {
        let config = test_config(policy);
        let state = AppState::new(Stores::in_memory(), &config, RevocationList::in_memory());
        state
            .directory
            .bootstrap_admin(config.bootstrap_admin.as_ref())
            .await
            .expect("bootstrap admin");

        Self {
            router: create_router(state.clone()),
            state,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), body).await
    }

    /// Log in and return the access token
    pub async fn login(&self, login: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/login",
                None,
                Some(serde_json::json!({ "login": login, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_LOGIN, ADMIN_PASSWORD).await
    }

    /// Create an account with `role` and return its id and a token
    pub async fn account(&self, login: &str, role: &str) -> (i64, String) {
        let user = self
            .state
            .directory
            .create_user(login, "password", role, &format!("{} name", login))
            .await
            .unwrap();
        (user.id, self.login(login, "password").await)
    }
}
