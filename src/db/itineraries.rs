//! # 여행 일정 데이터베이스 쿼리 모듈
//!
//! 순서 계산은 `services::itinerary`에서 끝내고, 여기서는 계산된
//! `(item_id, order_index)` 목록을 트랜잭션 안에서 저장만 합니다.
//!
//! ## order_index 불변식
//! ```text
//! (itinerary_id, day) 마다 order_index = 0, 1, 2, ... n-1
//! ```
//! 아이템 추가는 맨 뒤(n)에, 삭제/이동 후에는 `reindex_day`나 계산된 목록으로 다시 채웁니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::{SqliteConnection, SqlitePool};

const ITINERARY_COLUMNS: &str =
    "id, user_id, title, description, start_date, end_date, is_public, created_at, updated_at";

const ITEM_SELECT: &str = r#"
    SELECT i.id, i.itinerary_id, i.place_id,
           p.name AS place_name, p.category AS place_category,
           p.latitude, p.longitude,
           i.day, i.order_index, i.memo, i.visit_time, i.created_at
    FROM itinerary_items i
    JOIN places p ON p.id = i.place_id
"#;

pub async fn list_itineraries_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<Itinerary>, AppError> {
    let itineraries = sqlx::query_as::<_, Itinerary>(&format!(
        "SELECT {} FROM itineraries WHERE user_id = ? ORDER BY start_date DESC, created_at DESC",
        ITINERARY_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(itineraries)
}

pub async fn list_public_itineraries(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Itinerary>, AppError> {
    let itineraries = sqlx::query_as::<_, Itinerary>(&format!(
        "SELECT {} FROM itineraries WHERE is_public = 1 ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        ITINERARY_COLUMNS
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(itineraries)
}

pub async fn get_itinerary(pool: &SqlitePool, id: &str) -> Result<Option<Itinerary>, AppError> {
    let itinerary = sqlx::query_as::<_, Itinerary>(&format!(
        "SELECT {} FROM itineraries WHERE id = ?",
        ITINERARY_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(itinerary)
}

pub async fn create_itinerary(
    pool: &SqlitePool,
    user_id: &str,
    req: &CreateItineraryRequest,
) -> Result<Itinerary, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        r#"
        INSERT INTO itineraries (id, user_id, title, description, start_date, end_date, is_public)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(req.start_date.trim())
    .bind(req.end_date.trim())
    .bind(req.is_public.unwrap_or(false))
    .execute(pool)
    .await?;

    get_itinerary(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created itinerary".to_string()))
}

pub async fn update_itinerary(
    pool: &SqlitePool,
    id: &str,
    title: Option<&str>,
    description: Option<&str>,
    start_date: &str,
    end_date: &str,
    is_public: Option<bool>,
) -> Result<Option<Itinerary>, AppError> {
    sqlx::query(
        r#"
        UPDATE itineraries
        SET title = COALESCE(?, title),
            description = COALESCE(?, description),
            start_date = ?,
            end_date = ?,
            is_public = COALESCE(?, is_public),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(title)
    .bind(description)
    .bind(start_date)
    .bind(end_date)
    .bind(is_public)
    .bind(id)
    .execute(pool)
    .await?;

    get_itinerary(pool, id).await
}

pub async fn delete_itinerary(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM itineraries WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 일정의 모든 아이템 (날짜, 순서대로)
pub async fn list_items(pool: &SqlitePool, itinerary_id: &str) -> Result<Vec<ItineraryItem>, AppError> {
    let sql = format!(
        "{} WHERE i.itinerary_id = ? ORDER BY i.day, i.order_index",
        ITEM_SELECT
    );
    let items = sqlx::query_as::<_, ItineraryItem>(&sql)
        .bind(itinerary_id)
        .fetch_all(pool)
        .await?;

    Ok(items)
}

pub async fn get_item(
    pool: &SqlitePool,
    itinerary_id: &str,
    item_id: &str,
) -> Result<Option<ItineraryItem>, AppError> {
    let sql = format!("{} WHERE i.itinerary_id = ? AND i.id = ?", ITEM_SELECT);
    let item = sqlx::query_as::<_, ItineraryItem>(&sql)
        .bind(itinerary_id)
        .bind(item_id)
        .fetch_optional(pool)
        .await?;

    Ok(item)
}

/// 가장 늦은 날짜에 놓인 아이템의 day (아이템이 없으면 0)
pub async fn max_item_day(pool: &SqlitePool, itinerary_id: &str) -> Result<i64, AppError> {
    let (day,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(MAX(day), 0) FROM itinerary_items WHERE itinerary_id = ?",
    )
    .bind(itinerary_id)
    .fetch_one(pool)
    .await?;

    Ok(day)
}

/// 한 날의 아이템 ID를 현재 순서대로 가져옵니다.
pub async fn day_item_ids(
    conn: &mut SqliteConnection,
    itinerary_id: &str,
    day: i64,
) -> Result<Vec<String>, AppError> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT id FROM itinerary_items WHERE itinerary_id = ? AND day = ? ORDER BY order_index, created_at, id",
    )
    .bind(itinerary_id)
    .bind(day)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// 아이템을 해당 날의 맨 뒤에 추가합니다.
pub async fn add_item(
    pool: &SqlitePool,
    itinerary_id: &str,
    req: &AddItemRequest,
) -> Result<ItineraryItem, AppError> {
    let id = uuid::Uuid::now_v7().to_string();
    let mut tx = pool.begin().await?;

    let (next_index,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM itinerary_items WHERE itinerary_id = ? AND day = ?",
    )
    .bind(itinerary_id)
    .bind(req.day)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO itinerary_items (id, itinerary_id, place_id, day, order_index, memo, visit_time)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(itinerary_id)
    .bind(&req.place_id)
    .bind(req.day)
    .bind(next_index)
    .bind(&req.memo)
    .bind(&req.visit_time)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    get_item(pool, itinerary_id, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created item".to_string()))
}

pub async fn update_item(
    pool: &SqlitePool,
    itinerary_id: &str,
    item_id: &str,
    memo: Option<&str>,
    visit_time: Option<&str>,
) -> Result<Option<ItineraryItem>, AppError> {
    sqlx::query(
        r#"
        UPDATE itinerary_items
        SET memo = COALESCE(?, memo),
            visit_time = COALESCE(?, visit_time)
        WHERE itinerary_id = ? AND id = ?
        "#,
    )
    .bind(memo)
    .bind(visit_time)
    .bind(itinerary_id)
    .bind(item_id)
    .execute(pool)
    .await?;

    get_item(pool, itinerary_id, item_id).await
}

/// 아이템을 지우고 남은 아이템의 순서를 0부터 다시 매깁니다.
pub async fn delete_item(pool: &SqlitePool, itinerary_id: &str, item_id: &str) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;

    let day: Option<(i64,)> =
        sqlx::query_as("SELECT day FROM itinerary_items WHERE itinerary_id = ? AND id = ?")
            .bind(itinerary_id)
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some((day,)) = day else {
        return Ok(false);
    };

    sqlx::query("DELETE FROM itinerary_items WHERE id = ?")
        .bind(item_id)
        .execute(&mut *tx)
        .await?;

    reindex_day(&mut tx, itinerary_id, day).await?;
    tx.commit().await?;
    Ok(true)
}

/// 계산된 순서를 저장합니다. 모든 아이템을 `day`로 옮기고 `order_index`를 덮어씁니다.
pub async fn apply_order(
    conn: &mut SqliteConnection,
    day: i64,
    order: &[(String, i64)],
) -> Result<(), AppError> {
    for (item_id, index) in order {
        sqlx::query("UPDATE itinerary_items SET day = ?, order_index = ? WHERE id = ?")
            .bind(day)
            .bind(index)
            .bind(item_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// 한 날의 아이템을 현재 순서를 유지한 채 `0..n-1`로 다시 번호 매깁니다.
pub async fn reindex_day(conn: &mut SqliteConnection, itinerary_id: &str, day: i64) -> Result<(), AppError> {
    let ids = day_item_ids(conn, itinerary_id, day).await?;
    let order = crate::services::itinerary::indexed(ids);
    apply_order(conn, day, &order).await
}

/// 한 날의 순서를 요청된 순서로 바꿉니다 (드래그 앤 드롭 결과 저장).
pub async fn reorder_day(
    pool: &SqlitePool,
    itinerary_id: &str,
    day: i64,
    requested: &[String],
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let current = day_item_ids(&mut tx, itinerary_id, day).await?;
    let order = crate::services::itinerary::reorder(&current, requested)?;
    apply_order(&mut tx, day, &order).await?;

    tx.commit().await?;
    Ok(())
}

/// 아이템을 `target_day`의 `position` 위치로 옮기고 관련된 날들을 다시 번호 매깁니다.
pub async fn move_item(
    pool: &SqlitePool,
    itinerary_id: &str,
    item_id: &str,
    target_day: i64,
    position: usize,
) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;

    let source_day: Option<(i64,)> =
        sqlx::query_as("SELECT day FROM itinerary_items WHERE itinerary_id = ? AND id = ?")
            .bind(itinerary_id)
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some((source_day,)) = source_day else {
        return Ok(false);
    };

    let source = day_item_ids(&mut tx, itinerary_id, source_day).await?;
    if source_day == target_day {
        let (order, _) = crate::services::itinerary::move_item(item_id, &source, None, position)?;
        apply_order(&mut tx, source_day, &order).await?;
    } else {
        let target = day_item_ids(&mut tx, itinerary_id, target_day).await?;
        let (source_order, target_order) =
            crate::services::itinerary::move_item(item_id, &source, Some(&target), position)?;
        apply_order(&mut tx, source_day, &source_order).await?;
        apply_order(&mut tx, target_day, &target_order).await?;
    }

    tx.commit().await?;
    Ok(true)
}
