//! # 헬스체크(Health Check) 핸들러
//!
//! 서버와 데이터베이스가 정상적으로 동작하는지 확인하는 엔드포인트입니다.
//!
//! ## 엔드포인트
//! - `GET /api/v1/health` → `{ "status": "ok", "database": "ok" }`
//! - DB에 `SELECT 1`이 실패하면 503과 `"database": "unavailable"`
//!
//! 주로 다음 용도로 사용됩니다:
//! - 컨테이너 오케스트레이터(Docker)의 헬스체크
//! - 모니터링 시스템의 가동 시간 추적

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{db, routes::AppState};

/// `GET /health`
///
/// 실패해도 에러 본문 대신 상태 JSON을 그대로 돌려주므로 `Result`를 쓰지 않습니다.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match db::ping(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "database": "ok" })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "unavailable" })),
            )
        }
    }
}
