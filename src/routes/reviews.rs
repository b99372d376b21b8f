//! # 리뷰 API 라우트 핸들러
//!
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET | /api/v1/places/{id}/reviews | 장소 리뷰 목록 |
//! | POST | /api/v1/places/{id}/reviews | 리뷰 작성 (장소당 1개) |
//! | PATCH | /api/v1/reviews/{id} | 리뷰 수정 (작성자) |
//! | DELETE | /api/v1/reviews/{id} | 리뷰 삭제 (작성자/관리자) |
//! | GET | /api/v1/users/me/reviews | 내가 쓴 리뷰 |

use crate::{
    db::{places as db_places, reviews as db_reviews},
    error::AppError,
    middleware::auth::{ensure_owner_or_admin, AuthUser},
    models::*,
    routes::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

fn validate_rating(rating: i64) -> Result<(), AppError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::BadRequest(format!(
            "rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }
    Ok(())
}

pub async fn list_place_reviews(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !db_places::place_exists(&state.pool, &place_id).await? {
        return Err(AppError::NotFound);
    }

    let reviews = db_reviews::list_reviews_for_place(&state.pool, &place_id).await?;
    Ok(Json(json!({ "reviews": reviews })))
}

pub async fn create_review(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(place_id): Path<String>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    validate_rating(req.rating)?;
    let content = req.content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("Review content is required".to_string()));
    }
    if !db_places::place_exists(&state.pool, &place_id).await? {
        return Err(AppError::NotFound);
    }

    let review = db_reviews::create_review(
        &state.pool,
        &place_id,
        &auth_user.user_id,
        req.rating,
        content,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn update_review(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateReviewRequest>,
) -> Result<Json<Review>, AppError> {
    let review = db_reviews::get_review(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    // 수정은 작성자 본인만 (관리자도 남의 글을 고치지는 않습니다)
    if review.user_id != auth_user.user_id {
        return Err(AppError::Forbidden("You can only edit your own reviews".to_string()));
    }

    if let Some(rating) = req.rating {
        validate_rating(rating)?;
    }
    let content = req.content.as_deref().map(str::trim);
    if content == Some("") {
        return Err(AppError::BadRequest("Review content cannot be empty".to_string()));
    }

    let updated = db_reviews::update_review(&state.pool, &id, req.rating, content)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(updated))
}

pub async fn delete_review(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user = auth_user.load(&state.pool).await?;
    let review = db_reviews::get_review(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_owner_or_admin(&user, Some(&review.user_id))?;

    db_reviews::delete_review(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn my_reviews(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let reviews = db_reviews::list_reviews_by_user(&state.pool, &auth_user.user_id).await?;
    Ok(Json(json!({ "reviews": reviews })))
}
