//! # 장소(Place) 모델 정의
//!
//! 관광지, 음식점, 숙박 시설을 하나의 `places` 테이블로 관리합니다.
//! 평점 평균, 리뷰 수, 북마크 수는 저장하지 않고 조회 시점에 집계합니다.

use serde::{Deserialize, Serialize};

/// 장소 분류
pub const PLACE_CATEGORIES: [&str; 3] = ["tourist", "restaurant", "accommodation"];

pub fn is_valid_category(category: &str) -> bool {
    PLACE_CATEGORIES.contains(&category)
}

/// 장소 엔티티: `places` 한 행 + 집계 컬럼
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Place {
    pub id: String,
    pub name: String,
    /// "tourist" | "restaurant" | "accommodation"
    pub category: String,
    pub description: Option<String>,
    pub address: Option<String>,
    /// 지역명 (예: "서울", "부산", "제주")
    pub region: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    pub phone: Option<String>,
    /// 장소를 등록한 사업자 ID
    pub owner_id: Option<String>,
    /// 리뷰 평점 평균 (리뷰가 없으면 0)
    pub rating_avg: f64,
    pub review_count: i64,
    pub bookmark_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// 주변 장소 검색 결과: 장소 + 기준점으로부터의 거리
#[derive(Debug, Clone, Serialize)]
pub struct NearbyPlace {
    #[serde(flatten)]
    pub place: Place,
    pub distance_km: f64,
}

/// `GET /places` 쿼리 파라미터
#[derive(Debug, Default, Deserialize)]
pub struct PlaceListQuery {
    pub category: Option<String>,
    pub region: Option<String>,
    /// 이름/설명/주소 키워드
    pub q: Option<String>,
    /// "latest"(기본) | "rating" | "popular" | "name"
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// 목록 정렬 기준
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceSort {
    Latest,
    Rating,
    Popular,
    Name,
}

impl PlaceSort {
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.unwrap_or("latest") {
            "latest" => Some(PlaceSort::Latest),
            "rating" => Some(PlaceSort::Rating),
            "popular" => Some(PlaceSort::Popular),
            "name" => Some(PlaceSort::Name),
            _ => None,
        }
    }

    /// SQL `ORDER BY` 절: 사용자 입력이 아닌 고정 문자열만 반환합니다
    pub fn order_by(&self) -> &'static str {
        match self {
            PlaceSort::Latest => "p.created_at DESC",
            PlaceSort::Rating => "rating_avg DESC, review_count DESC, p.created_at DESC",
            PlaceSort::Popular => "bookmark_count DESC, p.created_at DESC",
            PlaceSort::Name => "p.name ASC",
        }
    }
}

/// `GET /places/nearby` 쿼리 파라미터
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: Option<f64>,
    pub category: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaceRequest {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub region: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    pub phone: Option<String>,
}

/// PATCH 요청: 보낸 필드만 변경합니다
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlaceRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub region: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    pub phone: Option<String>,
}
