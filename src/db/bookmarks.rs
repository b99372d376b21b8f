//! # 북마크 데이터베이스 쿼리 모듈
//!
//! 사용자-장소 즐겨찾기 관계입니다. `(user_id, place_id)`는 UNIQUE 제약으로 보장됩니다.

use crate::error::{is_unique_violation, AppError};
use crate::models::*;
use sqlx::SqlitePool;

use super::places::PLACE_SELECT;

/// 북마크 목록 조회용 행: 장소 컬럼 + 북마크 시각
#[derive(sqlx::FromRow)]
struct BookmarkRow {
    bookmarked_at: String,
    #[sqlx(flatten)]
    place: Place,
}

pub async fn list_bookmarks(pool: &SqlitePool, user_id: &str) -> Result<Vec<BookmarkedPlace>, AppError> {
    // PLACE_SELECT의 SELECT 목록 앞에 북마크 시각을 끼워 넣습니다
    let select = PLACE_SELECT.replacen("SELECT", "SELECT bm.created_at AS bookmarked_at,", 1);
    let sql = format!(
        "{} JOIN bookmarks bm ON bm.place_id = p.id WHERE bm.user_id = ? ORDER BY bm.created_at DESC, bm.id DESC",
        select
    );

    let rows = sqlx::query_as::<_, BookmarkRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| BookmarkedPlace {
            bookmarked_at: row.bookmarked_at,
            place: row.place,
        })
        .collect())
}

pub async fn find_bookmark(
    pool: &SqlitePool,
    user_id: &str,
    place_id: &str,
) -> Result<Option<Bookmark>, AppError> {
    let bookmark = sqlx::query_as::<_, Bookmark>(
        "SELECT id, user_id, place_id, created_at FROM bookmarks WHERE user_id = ? AND place_id = ?",
    )
    .bind(user_id)
    .bind(place_id)
    .fetch_optional(pool)
    .await?;

    Ok(bookmark)
}

/// 북마크를 추가합니다. 이미 있으면 409 Conflict.
pub async fn create_bookmark(
    pool: &SqlitePool,
    user_id: &str,
    place_id: &str,
) -> Result<Bookmark, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query("INSERT INTO bookmarks (id, user_id, place_id) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(user_id)
        .bind(place_id)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Place is already bookmarked".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

    find_bookmark(pool, user_id, place_id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created bookmark".to_string()))
}

pub async fn delete_bookmark(pool: &SqlitePool, user_id: &str, place_id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM bookmarks WHERE user_id = ? AND place_id = ?")
        .bind(user_id)
        .bind(place_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
