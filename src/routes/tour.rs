//! # 한국관광공사 Tour API 중계 라우트
//!
//! | 메서드 | 경로 | upstream 오퍼레이션 |
//! |--------|------|------|
//! | GET | /api/v1/tour/areas | areaCode1 |
//! | GET | /api/v1/tour/places | areaBasedList1 |
//! | GET | /api/v1/tour/search | searchKeyword1 |
//! | GET | /api/v1/tour/nearby | locationBasedList1 |
//! | GET | /api/v1/tour/festivals | searchFestival1 |
//! | GET | /api/v1/tour/detail/{content_id} | detailCommon1 |
//!
//! 쿼리 파라미터 이름은 Tour API와 같은 camelCase를 그대로 받습니다.
//! 인증 없이 호출할 수 있고, 응답 JSON은 upstream 그대로입니다.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::AppError,
    routes::{non_empty, AppState},
    services::tour::TourOperation,
};

pub const DEFAULT_ROWS: i64 = 10;
pub const MAX_ROWS: i64 = 100;
/// 위치기반 조회 반경 (미터)
pub const DEFAULT_RADIUS_M: i64 = 2000;
pub const MAX_RADIUS_M: i64 = 20000;

/// 모든 목록 조회에 붙는 페이지 파라미터 (`pageNo`, `numOfRows`)
fn page_params(page_no: Option<i64>, num_of_rows: Option<i64>) -> Vec<(&'static str, String)> {
    let page_no = page_no.unwrap_or(1).max(1);
    let rows = num_of_rows.unwrap_or(DEFAULT_ROWS).clamp(1, MAX_ROWS);
    vec![("pageNo", page_no.to_string()), ("numOfRows", rows.to_string())]
}

#[derive(Debug, Deserialize)]
pub struct AreaCodeQuery {
    #[serde(rename = "areaCode")]
    pub area_code: Option<String>,
    #[serde(rename = "pageNo")]
    pub page_no: Option<i64>,
    #[serde(rename = "numOfRows")]
    pub num_of_rows: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AreaBasedQuery {
    #[serde(rename = "areaCode")]
    pub area_code: Option<String>,
    #[serde(rename = "sigunguCode")]
    pub sigungu_code: Option<String>,
    #[serde(rename = "contentTypeId")]
    pub content_type_id: Option<String>,
    /// 정렬 (A=제목순, C=수정일순, D=생성일순 ...)
    pub arrange: Option<String>,
    #[serde(rename = "pageNo")]
    pub page_no: Option<i64>,
    #[serde(rename = "numOfRows")]
    pub num_of_rows: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct KeywordQuery {
    pub keyword: Option<String>,
    #[serde(rename = "areaCode")]
    pub area_code: Option<String>,
    #[serde(rename = "contentTypeId")]
    pub content_type_id: Option<String>,
    #[serde(rename = "pageNo")]
    pub page_no: Option<i64>,
    #[serde(rename = "numOfRows")]
    pub num_of_rows: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    /// 경도
    #[serde(rename = "mapX")]
    pub map_x: Option<f64>,
    /// 위도
    #[serde(rename = "mapY")]
    pub map_y: Option<f64>,
    pub radius: Option<i64>,
    #[serde(rename = "contentTypeId")]
    pub content_type_id: Option<String>,
    #[serde(rename = "pageNo")]
    pub page_no: Option<i64>,
    #[serde(rename = "numOfRows")]
    pub num_of_rows: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FestivalQuery {
    #[serde(rename = "eventStartDate")]
    pub event_start_date: Option<String>,
    #[serde(rename = "areaCode")]
    pub area_code: Option<String>,
    #[serde(rename = "pageNo")]
    pub page_no: Option<i64>,
    #[serde(rename = "numOfRows")]
    pub num_of_rows: Option<i64>,
}

/// 값이 있는 선택 파라미터만 덧붙입니다.
fn push_optional(params: &mut Vec<(&'static str, String)>, name: &'static str, value: Option<&str>) {
    if let Some(value) = non_empty(value) {
        params.push((name, value.to_string()));
    }
}

async fn relay(
    state: &AppState,
    operation: TourOperation,
    params: Vec<(&'static str, String)>,
) -> Result<Json<Value>, AppError> {
    let body = state.tour.fetch(operation, &params).await?;
    Ok(Json(body))
}

pub async fn area_codes(
    State(state): State<AppState>,
    Query(query): Query<AreaCodeQuery>,
) -> Result<Json<Value>, AppError> {
    let mut params = page_params(query.page_no, query.num_of_rows);
    push_optional(&mut params, "areaCode", query.area_code.as_deref());
    relay(&state, TourOperation::AreaCode, params).await
}

pub async fn area_based_list(
    State(state): State<AppState>,
    Query(query): Query<AreaBasedQuery>,
) -> Result<Json<Value>, AppError> {
    let mut params = page_params(query.page_no, query.num_of_rows);
    push_optional(&mut params, "areaCode", query.area_code.as_deref());
    push_optional(&mut params, "sigunguCode", query.sigungu_code.as_deref());
    push_optional(&mut params, "contentTypeId", query.content_type_id.as_deref());
    push_optional(&mut params, "arrange", query.arrange.as_deref());
    relay(&state, TourOperation::AreaBasedList, params).await
}

pub async fn search_keyword(
    State(state): State<AppState>,
    Query(query): Query<KeywordQuery>,
) -> Result<Json<Value>, AppError> {
    let keyword = non_empty(query.keyword.as_deref())
        .ok_or_else(|| AppError::BadRequest("keyword is required".to_string()))?;

    let mut params = page_params(query.page_no, query.num_of_rows);
    params.push(("keyword", keyword.to_string()));
    push_optional(&mut params, "areaCode", query.area_code.as_deref());
    push_optional(&mut params, "contentTypeId", query.content_type_id.as_deref());
    relay(&state, TourOperation::SearchKeyword, params).await
}

pub async fn location_based_list(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<Value>, AppError> {
    let (Some(map_x), Some(map_y)) = (query.map_x, query.map_y) else {
        return Err(AppError::BadRequest("mapX and mapY are required".to_string()));
    };
    if !crate::services::geo::is_valid_coordinate(map_y, map_x) {
        return Err(AppError::BadRequest("mapX/mapY out of range".to_string()));
    }
    let radius = query.radius.unwrap_or(DEFAULT_RADIUS_M);
    if !(1..=MAX_RADIUS_M).contains(&radius) {
        return Err(AppError::BadRequest(format!(
            "radius must be between 1 and {} meters",
            MAX_RADIUS_M
        )));
    }

    let mut params = page_params(query.page_no, query.num_of_rows);
    params.push(("mapX", map_x.to_string()));
    params.push(("mapY", map_y.to_string()));
    params.push(("radius", radius.to_string()));
    push_optional(&mut params, "contentTypeId", query.content_type_id.as_deref());
    relay(&state, TourOperation::LocationBasedList, params).await
}

pub async fn festivals(
    State(state): State<AppState>,
    Query(query): Query<FestivalQuery>,
) -> Result<Json<Value>, AppError> {
    let start = non_empty(query.event_start_date.as_deref())
        .filter(|d| d.len() == 8 && NaiveDate::parse_from_str(d, "%Y%m%d").is_ok())
        .ok_or_else(|| AppError::BadRequest("eventStartDate must be YYYYMMDD".to_string()))?;

    let mut params = page_params(query.page_no, query.num_of_rows);
    params.push(("eventStartDate", start.to_string()));
    push_optional(&mut params, "areaCode", query.area_code.as_deref());
    relay(&state, TourOperation::SearchFestival, params).await
}

pub async fn detail(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if content_id.is_empty() || !content_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest("contentId must be numeric".to_string()));
    }

    let mut params = vec![("contentId", content_id)];
    for flag in ["defaultYN", "firstImageYN", "addrinfoYN", "mapinfoYN", "overviewYN"] {
        params.push((flag, "Y".to_string()));
    }
    relay(&state, TourOperation::DetailCommon, params).await
}
