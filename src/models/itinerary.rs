//! # 여행 일정(Itinerary) 모델 정의
//!
//! 일정은 시작일~종료일 사이의 여러 날(day)로 구성되고,
//! 각 날에는 방문할 장소(item)가 `order_index` 순서대로 놓입니다.
//!
//! ```text
//! Itinerary (2026-05-01 ~ 2026-05-03, day_count = 3)
//!  ├─ day 1: [경복궁(0), 광장시장(1)]
//!  ├─ day 2: [남산타워(0)]
//!  └─ day 3: []
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Itinerary {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    /// "YYYY-MM-DD"
    pub start_date: String,
    pub end_date: String,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// 목록 응답용: 일정 + 총 일수
#[derive(Debug, Clone, Serialize)]
pub struct ItinerarySummary {
    #[serde(flatten)]
    pub itinerary: Itinerary,
    pub day_count: i64,
}

/// 일정에 담긴 장소 한 건 (장소 이름/좌표 포함)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ItineraryItem {
    pub id: String,
    pub itinerary_id: String,
    pub place_id: String,
    pub place_name: String,
    pub place_category: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub day: i64,
    pub order_index: i64,
    pub memo: Option<String>,
    /// "HH:MM" 형식의 방문 예정 시각 (선택)
    pub visit_time: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItineraryDay {
    pub day: i64,
    pub items: Vec<ItineraryItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItineraryDetail {
    #[serde(flatten)]
    pub itinerary: Itinerary,
    pub day_count: i64,
    pub days: Vec<ItineraryDay>,
}

#[derive(Debug, Deserialize)]
pub struct CreateItineraryRequest {
    pub title: String,
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub is_public: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateItineraryRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub place_id: String,
    pub day: i64,
    pub memo: Option<String>,
    pub visit_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateItemRequest {
    pub memo: Option<String>,
    pub visit_time: Option<String>,
}

/// 드래그 앤 드롭으로 정렬한 결과: 해당 날의 아이템 ID 전체를 새 순서대로
#[derive(Debug, Deserialize)]
pub struct ReorderDayRequest {
    pub item_ids: Vec<String>,
}

/// 다른 날(또는 같은 날)의 특정 위치로 아이템 이동
#[derive(Debug, Deserialize)]
pub struct MoveItemRequest {
    pub day: i64,
    pub position: usize,
}
