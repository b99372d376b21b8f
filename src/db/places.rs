//! # 장소 데이터베이스 쿼리 모듈
//!
//! 장소 CRUD와 목록/주변 검색 쿼리입니다.
//! 평점 평균과 리뷰·북마크 수는 서브쿼리로 조회 시점에 집계합니다.
//!
//! ## 선택 필터 패턴
//! `(? IS NULL OR p.category = ?)`처럼 같은 값을 두 번 바인딩하면,
//! 값이 None일 때는 조건 전체가 참이 되어 필터가 꺼집니다.
//! 동적 SQL 조립 없이 하나의 고정 쿼리로 선택 필터를 표현할 수 있습니다.

use crate::db::like_pattern;
use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

/// 모든 장소 조회 쿼리가 공유하는 SELECT 절
pub(crate) const PLACE_SELECT: &str = r#"
    SELECT p.id, p.name, p.category, p.description, p.address, p.region,
           p.latitude, p.longitude, p.image_url, p.phone, p.owner_id,
           CAST(COALESCE((SELECT AVG(r.rating) FROM reviews r WHERE r.place_id = p.id), 0) AS REAL) AS rating_avg,
           (SELECT COUNT(*) FROM reviews r WHERE r.place_id = p.id) AS review_count,
           (SELECT COUNT(*) FROM bookmarks b WHERE b.place_id = p.id) AS bookmark_count,
           p.created_at, p.updated_at
    FROM places p
"#;

const LIST_FILTER: &str = r#"
    WHERE (? IS NULL OR p.category = ?)
      AND (? IS NULL OR p.region = ?)
      AND (? IS NULL OR p.name LIKE ? ESCAPE '\' OR p.description LIKE ? ESCAPE '\' OR p.address LIKE ? ESCAPE '\')
"#;

/// 목록 필터 값 (이미 검증된 값)
#[derive(Debug, Default)]
pub struct PlaceFilter<'a> {
    pub category: Option<&'a str>,
    pub region: Option<&'a str>,
    pub keyword: Option<&'a str>,
}

/// 필터·정렬·페이지를 적용한 장소 목록과 전체 개수를 반환합니다.
pub async fn list_places(
    pool: &SqlitePool,
    filter: &PlaceFilter<'_>,
    sort: PlaceSort,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Place>, i64), AppError> {
    let pattern = filter.keyword.map(like_pattern);

    let sql = format!(
        "{} {} ORDER BY {} LIMIT ? OFFSET ?",
        PLACE_SELECT,
        LIST_FILTER,
        sort.order_by()
    );
    let places = sqlx::query_as::<_, Place>(&sql)
        .bind(filter.category)
        .bind(filter.category)
        .bind(filter.region)
        .bind(filter.region)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM places p {}", LIST_FILTER);
    let (total,): (i64,) = sqlx::query_as(&count_sql)
        .bind(filter.category)
        .bind(filter.category)
        .bind(filter.region)
        .bind(filter.region)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    Ok((places, total))
}

/// 좌표가 있는 장소를 모두 가져옵니다 (거리 계산은 호출하는 쪽에서).
pub async fn list_places_with_coordinates(
    pool: &SqlitePool,
    category: Option<&str>,
) -> Result<Vec<Place>, AppError> {
    let sql = format!(
        "{} WHERE p.latitude IS NOT NULL AND p.longitude IS NOT NULL AND (? IS NULL OR p.category = ?)",
        PLACE_SELECT
    );
    let places = sqlx::query_as::<_, Place>(&sql)
        .bind(category)
        .bind(category)
        .fetch_all(pool)
        .await?;

    Ok(places)
}

/// 특정 사업자가 등록한 장소 목록 (대시보드)
pub async fn list_places_by_owner(pool: &SqlitePool, owner_id: &str) -> Result<Vec<Place>, AppError> {
    let sql = format!("{} WHERE p.owner_id = ? ORDER BY p.created_at DESC", PLACE_SELECT);
    let places = sqlx::query_as::<_, Place>(&sql)
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

    Ok(places)
}

pub async fn get_place(pool: &SqlitePool, id: &str) -> Result<Option<Place>, AppError> {
    let sql = format!("{} WHERE p.id = ?", PLACE_SELECT);
    let place = sqlx::query_as::<_, Place>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(place)
}

pub async fn place_exists(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM places WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

pub async fn create_place(
    pool: &SqlitePool,
    owner_id: &str,
    req: &CreatePlaceRequest,
) -> Result<Place, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        r#"
        INSERT INTO places (id, name, category, description, address, region,
                            latitude, longitude, image_url, phone, owner_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(req.name.trim())
    .bind(&req.category)
    .bind(&req.description)
    .bind(&req.address)
    .bind(&req.region)
    .bind(req.latitude)
    .bind(req.longitude)
    .bind(&req.image_url)
    .bind(&req.phone)
    .bind(owner_id)
    .execute(pool)
    .await?;

    get_place(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created place".to_string()))
}

/// 보낸 필드만 바꾸는 부분 업데이트: `COALESCE(?, 기존값)`
pub async fn update_place(
    pool: &SqlitePool,
    id: &str,
    req: &UpdatePlaceRequest,
) -> Result<Option<Place>, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE places
        SET name = COALESCE(?, name),
            category = COALESCE(?, category),
            description = COALESCE(?, description),
            address = COALESCE(?, address),
            region = COALESCE(?, region),
            latitude = COALESCE(?, latitude),
            longitude = COALESCE(?, longitude),
            image_url = COALESCE(?, image_url),
            phone = COALESCE(?, phone),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(req.name.as_deref().map(str::trim))
    .bind(&req.category)
    .bind(&req.description)
    .bind(&req.address)
    .bind(&req.region)
    .bind(req.latitude)
    .bind(req.longitude)
    .bind(&req.image_url)
    .bind(&req.phone)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_place(pool, id).await
}

/// 장소를 삭제합니다.
///
/// 북마크·리뷰·일정 아이템은 `ON DELETE CASCADE`로 함께 지워지고,
/// 아이템이 빠진 일정의 날짜들은 같은 트랜잭션 안에서 순서를 다시 매깁니다.
pub async fn delete_place(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;

    let affected_days: Vec<(String, i64)> = sqlx::query_as(
        "SELECT DISTINCT itinerary_id, day FROM itinerary_items WHERE place_id = ?",
    )
    .bind(id)
    .fetch_all(&mut *tx)
    .await?;

    let result = sqlx::query("DELETE FROM places WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    for (itinerary_id, day) in &affected_days {
        super::itineraries::reindex_day(&mut tx, itinerary_id, *day).await?;
    }

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}
