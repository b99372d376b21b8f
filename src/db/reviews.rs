use crate::error::{is_unique_violation, AppError};
use crate::models::*;
use sqlx::SqlitePool;

const REVIEW_SELECT: &str = r#"
    SELECT r.id, r.place_id, r.user_id,
           COALESCE(u.nickname, u.username) AS author,
           r.rating, r.content, r.created_at, r.updated_at
    FROM reviews r
    JOIN users u ON u.id = r.user_id
"#;

pub async fn list_reviews_for_place(pool: &SqlitePool, place_id: &str) -> Result<Vec<Review>, AppError> {
    let sql = format!("{} WHERE r.place_id = ? ORDER BY r.created_at DESC, r.id DESC", REVIEW_SELECT);
    let reviews = sqlx::query_as::<_, Review>(&sql)
        .bind(place_id)
        .fetch_all(pool)
        .await?;

    Ok(reviews)
}

pub async fn list_reviews_by_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<Review>, AppError> {
    let sql = format!("{} WHERE r.user_id = ? ORDER BY r.created_at DESC, r.id DESC", REVIEW_SELECT);
    let reviews = sqlx::query_as::<_, Review>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(reviews)
}

/// 특정 사업자의 장소에 달린 최근 리뷰
pub async fn list_recent_reviews_for_owner(
    pool: &SqlitePool,
    owner_id: &str,
    limit: i64,
) -> Result<Vec<Review>, AppError> {
    let sql = format!(
        "{} JOIN places p ON p.id = r.place_id WHERE p.owner_id = ? ORDER BY r.created_at DESC, r.id DESC LIMIT ?",
        REVIEW_SELECT
    );
    let reviews = sqlx::query_as::<_, Review>(&sql)
        .bind(owner_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(reviews)
}

pub async fn get_review(pool: &SqlitePool, id: &str) -> Result<Option<Review>, AppError> {
    let sql = format!("{} WHERE r.id = ?", REVIEW_SELECT);
    let review = sqlx::query_as::<_, Review>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(review)
}

/// 리뷰를 작성합니다. 같은 장소에 이미 리뷰를 남겼으면 409 Conflict.
pub async fn create_review(
    pool: &SqlitePool,
    place_id: &str,
    user_id: &str,
    rating: i64,
    content: &str,
) -> Result<Review, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query("INSERT INTO reviews (id, place_id, user_id, rating, content) VALUES (?, ?, ?, ?, ?)")
        .bind(&id)
        .bind(place_id)
        .bind(user_id)
        .bind(rating)
        .bind(content)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("You have already reviewed this place".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

    get_review(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created review".to_string()))
}

pub async fn update_review(
    pool: &SqlitePool,
    id: &str,
    rating: Option<i64>,
    content: Option<&str>,
) -> Result<Option<Review>, AppError> {
    sqlx::query(
        r#"
        UPDATE reviews
        SET rating = COALESCE(?, rating),
            content = COALESCE(?, content),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(rating)
    .bind(content)
    .bind(id)
    .execute(pool)
    .await?;

    get_review(pool, id).await
}

pub async fn delete_review(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
