//! # 사업자 대시보드 API
//!
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET | /api/v1/business/places | 내가 등록한 장소 |
//! | GET | /api/v1/business/summary | 장소/리뷰/북마크 합계와 최근 리뷰 |
//!
//! `business`, `admin` 역할만 접근할 수 있습니다.

use crate::{
    db::{places as db_places, reviews as db_reviews},
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
};
use axum::{extract::State, Json};
use serde_json::{json, Value};

const RECENT_REVIEW_LIMIT: i64 = 5;

async fn require_business(state: &AppState, auth_user: &AuthUser) -> Result<User, AppError> {
    let user = auth_user.load(&state.pool).await?;
    if !user.role().can_manage_places() {
        return Err(AppError::Forbidden(
            "Business account required".to_string(),
        ));
    }
    Ok(user)
}

/// 장소별 평균을 리뷰 수로 가중해 전체 평균을 구합니다.
fn weighted_rating(places: &[Place]) -> f64 {
    let reviews: i64 = places.iter().map(|p| p.review_count).sum();
    if reviews == 0 {
        return 0.0;
    }
    let total: f64 = places
        .iter()
        .map(|p| p.rating_avg * p.review_count as f64)
        .sum();
    (total / reviews as f64 * 10.0).round() / 10.0
}

pub async fn my_places(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let user = require_business(&state, &auth_user).await?;
    let places = db_places::list_places_by_owner(&state.pool, &user.id).await?;
    Ok(Json(json!({ "places": places })))
}

pub async fn summary(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<BusinessSummary>, AppError> {
    let user = require_business(&state, &auth_user).await?;
    let places = db_places::list_places_by_owner(&state.pool, &user.id).await?;
    let recent_reviews =
        db_reviews::list_recent_reviews_for_owner(&state.pool, &user.id, RECENT_REVIEW_LIMIT).await?;

    Ok(Json(BusinessSummary {
        place_count: places.len() as i64,
        review_count: places.iter().map(|p| p.review_count).sum(),
        bookmark_count: places.iter().map(|p| p.bookmark_count).sum(),
        rating_avg: weighted_rating(&places),
        recent_reviews,
    }))
}
