//! # 여행 일정 순서 계산
//!
//! 드래그 앤 드롭으로 바뀐 순서를 받아 `order_index`를 다시 계산하는 순수 함수들입니다.
//! DB에 쓰기 전에 여기서 검증과 계산을 끝내고, `db::itineraries`는 결과만 저장합니다.
//!
//! 불변식: 한 날(day)의 아이템 `order_index`는 항상 `0..n-1`로 빈틈없이 이어집니다.

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::error::AppError;

/// 일정의 최대 일수
pub const MAX_TRIP_DAYS: i64 = 30;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// "YYYY-MM-DD" 문자열을 날짜로 파싱합니다.
pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| AppError::BadRequest(format!("Invalid date (expected YYYY-MM-DD): {}", value)))
}

/// 시작일~종료일의 일수를 계산합니다 (당일치기 = 1).
///
/// 종료일이 시작일보다 빠르거나 최대 일수를 넘으면 400 에러입니다.
pub fn day_count(start: &str, end: &str) -> Result<i64, AppError> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    let days = (end - start).num_days() + 1;

    if days < 1 {
        return Err(AppError::BadRequest(
            "end_date must not be earlier than start_date".to_string(),
        ));
    }
    if days > MAX_TRIP_DAYS {
        return Err(AppError::BadRequest(format!(
            "Trips can be at most {} days long",
            MAX_TRIP_DAYS
        )));
    }
    Ok(days)
}

/// "HH:MM" 방문 시각 검증
pub fn validate_visit_time(value: &str) -> Result<(), AppError> {
    chrono::NaiveTime::parse_from_str(value, "%H:%M")
        .map(|_| ())
        .map_err(|_| AppError::BadRequest(format!("Invalid visit_time (expected HH:MM): {}", value)))
}

/// 요청된 순서가 현재 아이템들의 순열인지 확인합니다.
///
/// 같은 ID를 두 번 넣거나, 다른 날의 아이템을 섞거나, 일부를 빠뜨리면 400입니다.
/// 반환값은 새 순서 그대로 `(item_id, order_index)` 목록입니다.
pub fn reorder(current: &[String], requested: &[String]) -> Result<Vec<(String, i64)>, AppError> {
    if current.len() != requested.len() {
        return Err(AppError::BadRequest(format!(
            "Expected {} item ids for this day, got {}",
            current.len(),
            requested.len()
        )));
    }

    let existing: HashSet<&str> = current.iter().map(String::as_str).collect();
    let mut seen = HashSet::with_capacity(requested.len());
    for id in requested {
        if !existing.contains(id.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Item {} does not belong to this day",
                id
            )));
        }
        if !seen.insert(id.as_str()) {
            return Err(AppError::BadRequest(format!("Duplicate item id {}", id)));
        }
    }

    Ok(indexed(requested.iter().cloned()))
}

/// 아이템을 이동한 뒤의 두 날짜 순서를 계산합니다.
///
/// - `source`: 원래 날의 아이템 ID (현재 순서)
/// - `target`: 옮겨갈 날의 아이템 ID (현재 순서). 같은 날 안에서 옮기면 `None`
/// - `position`: 옮겨갈 위치. 날의 길이를 넘으면 맨 끝으로 보정합니다
///
/// 반환값: `(원래 날의 새 순서, 옮겨간 날의 새 순서)`.
/// 같은 날 이동이면 두 번째 값은 빈 목록입니다.
pub fn move_item(
    item_id: &str,
    source: &[String],
    target: Option<&[String]>,
    position: usize,
) -> Result<(Vec<(String, i64)>, Vec<(String, i64)>), AppError> {
    let mut source: Vec<String> = source.to_vec();
    let from = source
        .iter()
        .position(|id| id == item_id)
        .ok_or(AppError::NotFound)?;
    let moved = source.remove(from);

    match target {
        None => {
            let at = position.min(source.len());
            source.insert(at, moved);
            Ok((indexed(source), Vec::new()))
        }
        Some(target) => {
            let mut target: Vec<String> = target.to_vec();
            let at = position.min(target.len());
            target.insert(at, moved);
            Ok((indexed(source), indexed(target)))
        }
    }
}

/// 목록 위치를 그대로 `order_index`로 사용합니다.
pub fn indexed<I>(ids: I) -> Vec<(String, i64)>
where
    I: IntoIterator<Item = String>,
{
    ids.into_iter()
        .enumerate()
        .map(|(i, id)| (id, i as i64))
        .collect()
}
