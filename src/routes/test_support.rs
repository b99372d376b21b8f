//! 라우트 테스트 공용 도우미
//!
//! 메모리 SQLite에 마이그레이션을 적용하고, 실제 라우터를 서버 없이
//! `tower::ServiceExt::oneshot`으로 호출합니다.

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use tower::ServiceExt;

use super::{api_router, AppState};
use crate::services::tour::TourClient;

pub const TEST_SECRET: &str = "test-secret";

pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
}

/// 메모리 DB는 연결마다 따로 생기므로 연결을 하나로 고정하고 만료시키지 않습니다.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

pub async fn test_app() -> TestApp {
    test_app_with_tour(None, "http://127.0.0.1:9").await
}

pub async fn test_app_with_tour(service_key: Option<&str>, base_url: &str) -> TestApp {
    let pool = test_pool().await;
    let tour = TourClient::new(
        base_url,
        service_key.map(str::to_string),
        Duration::from_secs(5),
    )
    .unwrap();
    let state = AppState {
        pool: pool.clone(),
        jwt_secret: TEST_SECRET.to_string(),
        tour,
    };
    let app = Router::new().nest("/api/v1", api_router(state));
    TestApp { app, pool }
}

impl TestApp {
    /// 요청을 보내고 `(상태 코드, JSON 본문)`을 반환합니다. 본문이 비어 있으면 `Value::Null`.
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

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// 회원가입 후 `(access_token, user_id)`를 반환합니다.
    pub async fn register(&self, username: &str, role: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/api/v1/auth/register",
                None,
                json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "password123",
                    "role": role,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {}", body);
        (
            body["access_token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// 관리자는 가입으로 만들 수 없으므로 DB에서 직접 역할을 바꿉니다.
    pub async fn make_admin(&self, user_id: &str) {
        sqlx::query("UPDATE users SET role = 'admin' WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    /// 사업자 계정으로 장소를 하나 등록하고 ID를 반환합니다.
    pub async fn create_place(&self, token: &str, body: Value) -> String {
        let (status, place) = self.post("/api/v1/places", Some(token), body).await;
        assert_eq!(status, StatusCode::CREATED, "create place failed: {}", place);
        place["id"].as_str().unwrap().to_string()
    }
}
