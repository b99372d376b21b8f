//! # 장소(Place) 라우트 핸들러
//!
//! ## 엔드포인트
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET | /api/v1/places | 장소 목록 (분류/지역/키워드 필터, 정렬, 페이지) |
//! | GET | /api/v1/places/nearby | 좌표 기준 주변 장소 (거리순) |
//! | GET | /api/v1/places/{id} | 장소 상세 |
//! | POST | /api/v1/places | 장소 등록 (사업자/관리자) |
//! | PATCH | /api/v1/places/{id} | 장소 수정 (소유자/관리자) |
//! | DELETE | /api/v1/places/{id} | 장소 삭제 (소유자/관리자) |

use crate::{
    db::places::{self as db_places, PlaceFilter},
    error::AppError,
    middleware::auth::{ensure_owner_or_admin, AuthUser},
    models::*,
    routes::{non_empty, AppState},
    services::geo,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 5.0;
pub const MAX_NEARBY_RADIUS_KM: f64 = 100.0;

/// `GET /places` → `{ "places": [...], "page": 1, "limit": 20, "total": 42 }`
pub async fn list_places(
    State(state): State<AppState>,
    Query(query): Query<PlaceListQuery>,
) -> Result<Json<Value>, AppError> {
    let category = non_empty(query.category.as_deref());
    if let Some(category) = category {
        if !is_valid_category(category) {
            return Err(AppError::BadRequest(format!("Unknown category: {}", category)));
        }
    }
    let sort = PlaceSort::parse(non_empty(query.sort.as_deref()))
        .ok_or_else(|| AppError::BadRequest("sort must be one of latest, rating, popular, name".to_string()))?;

    let page = Pagination {
        page: query.page,
        limit: query.limit,
    };
    let filter = PlaceFilter {
        category,
        region: non_empty(query.region.as_deref()),
        keyword: non_empty(query.q.as_deref()),
    };

    let (places, total) =
        db_places::list_places(&state.pool, &filter, sort, page.limit(), page.offset()).await?;

    Ok(Json(json!({
        "places": places,
        "page": page.page(),
        "limit": page.limit(),
        "total": total,
    })))
}

/// `GET /places/nearby?lat=37.57&lng=126.98&radius_km=3`
///
/// 좌표가 있는 장소만 대상으로 하버사인 거리를 계산해 가까운 순으로 반환합니다.
pub async fn nearby_places(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Value>, AppError> {
    if !geo::is_valid_coordinate(query.lat, query.lng) {
        return Err(AppError::BadRequest("lat/lng out of range".to_string()));
    }
    let radius = query.radius_km.unwrap_or(DEFAULT_NEARBY_RADIUS_KM);
    if !(radius > 0.0 && radius <= MAX_NEARBY_RADIUS_KM) {
        return Err(AppError::BadRequest(format!(
            "radius_km must be greater than 0 and at most {}",
            MAX_NEARBY_RADIUS_KM
        )));
    }
    let category = non_empty(query.category.as_deref());
    if let Some(category) = category {
        if !is_valid_category(category) {
            return Err(AppError::BadRequest(format!("Unknown category: {}", category)));
        }
    }
    let limit = Pagination {
        page: None,
        limit: query.limit,
    }
    .limit() as usize;

    let candidates = db_places::list_places_with_coordinates(&state.pool, category).await?;

    let mut nearby: Vec<NearbyPlace> = candidates
        .into_iter()
        .filter_map(|place| {
            let (lat, lng) = (place.latitude?, place.longitude?);
            let distance = geo::haversine_km(query.lat, query.lng, lat, lng);
            (distance <= radius).then_some(NearbyPlace {
                place,
                distance_km: distance,
            })
        })
        .collect();

    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby.truncate(limit);
    for entry in &mut nearby {
        entry.distance_km = geo::round_km(entry.distance_km);
    }

    Ok(Json(json!({ "places": nearby })))
}

pub async fn get_place(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Place>, AppError> {
    let place = db_places::get_place(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(place))
}

/// 위도/경도는 함께 주거나 함께 생략해야 합니다.
fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<(), AppError> {
    match (latitude, longitude) {
        (None, None) => Ok(()),
        (Some(lat), Some(lng)) if geo::is_valid_coordinate(lat, lng) => Ok(()),
        (Some(_), Some(_)) => Err(AppError::BadRequest("latitude/longitude out of range".to_string())),
        _ => Err(AppError::BadRequest(
            "latitude and longitude must be provided together".to_string(),
        )),
    }
}

/// `POST /places` → `201 Created`
pub async fn create_place(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreatePlaceRequest>,
) -> Result<(StatusCode, Json<Place>), AppError> {
    let user = auth_user.load(&state.pool).await?;
    if !user.role().can_manage_places() {
        return Err(AppError::Forbidden(
            "Only business accounts can register places".to_string(),
        ));
    }

    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Place name is required".to_string()));
    }
    if !is_valid_category(&req.category) {
        return Err(AppError::BadRequest(format!("Unknown category: {}", req.category)));
    }
    validate_coordinates(req.latitude, req.longitude)?;

    let place = db_places::create_place(&state.pool, &user.id, &req).await?;
    tracing::info!(place_id = %place.id, owner_id = %user.id, "Place registered");
    Ok((StatusCode::CREATED, Json(place)))
}

pub async fn update_place(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdatePlaceRequest>,
) -> Result<Json<Place>, AppError> {
    let user = auth_user.load(&state.pool).await?;
    let place = db_places::get_place(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_owner_or_admin(&user, place.owner_id.as_deref())?;

    if let Some(name) = &req.name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("Place name cannot be empty".to_string()));
        }
    }
    if let Some(category) = &req.category {
        if !is_valid_category(category) {
            return Err(AppError::BadRequest(format!("Unknown category: {}", category)));
        }
    }
    // 한쪽만 바꾸는 경우 기존 값과 합쳐서 검증합니다
    validate_coordinates(
        req.latitude.or(place.latitude),
        req.longitude.or(place.longitude),
    )?;

    let updated = db_places::update_place(&state.pool, &id, &req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(updated))
}

pub async fn delete_place(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user = auth_user.load(&state.pool).await?;
    let place = db_places::get_place(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_owner_or_admin(&user, place.owner_id.as_deref())?;

    if !db_places::delete_place(&state.pool, &id).await? {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::test_app;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn only_business_accounts_register_places() {
        let app = test_app().await;
        let (user_token, _) = app.register("traveler", "user").await;

        let (status, _) = app
            .post(
                "/api/v1/places",
                Some(&user_token),
                json!({ "name": "경복궁", "category": "tourist" }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (biz_token, biz_id) = app.register("owner", "business").await;
        let (status, place) = app
            .post(
                "/api/v1/places",
                Some(&biz_token),
                json!({ "name": "경복궁", "category": "tourist", "region": "서울" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(place["owner_id"], biz_id.as_str());
        assert_eq!(place["rating_avg"], 0.0);
        assert_eq!(place["review_count"], 0);
    }

    #[tokio::test]
    async fn create_place_validates_fields() {
        let app = test_app().await;
        let (token, _) = app.register("owner", "business").await;

        let cases = [
            json!({ "name": " ", "category": "tourist" }),
            json!({ "name": "카페", "category": "cafe" }),
            json!({ "name": "카페", "category": "restaurant", "latitude": 37.5 }),
            json!({ "name": "카페", "category": "restaurant", "latitude": 99.0, "longitude": 127.0 }),
        ];
        for body in cases {
            let (status, _) = app.post("/api/v1/places", Some(&token), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn list_filters_and_paginates() {
        let app = test_app().await;
        let (token, _) = app.register("owner", "business").await;
        app.create_place(&token, json!({ "name": "해운대", "category": "tourist", "region": "부산" }))
            .await;
        app.create_place(&token, json!({ "name": "광장시장", "category": "restaurant", "region": "서울" }))
            .await;
        app.create_place(&token, json!({ "name": "남산타워", "category": "tourist", "region": "서울", "description": "야경 명소" }))
            .await;

        let (status, body) = app.get("/api/v1/places?category=tourist", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);

        let (_, body) = app
            .get("/api/v1/places?region=%EC%84%9C%EC%9A%B8&sort=name", None)
            .await;
        let names: Vec<&str> = body["places"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["광장시장", "남산타워"]);

        // 설명 키워드 검색 ("야경")
        let (_, body) = app.get("/api/v1/places?q=%EC%95%BC%EA%B2%BD", None).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["places"][0]["name"], "남산타워");

        let (_, body) = app.get("/api/v1/places?limit=2&page=2", None).await;
        assert_eq!(body["total"], 3);
        assert_eq!(body["places"].as_array().unwrap().len(), 1);

        let (status, _) = app.get("/api/v1/places?sort=random", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn nearby_sorts_by_real_distance() {
        let app = test_app().await;
        let (token, _) = app.register("owner", "business").await;
        // 서울시청 기준
        app.create_place(&token, json!({ "name": "남산타워", "category": "tourist", "latitude": 37.5512, "longitude": 126.9882 }))
            .await;
        app.create_place(&token, json!({ "name": "덕수궁", "category": "tourist", "latitude": 37.5658, "longitude": 126.9751 }))
            .await;
        app.create_place(&token, json!({ "name": "해운대", "category": "tourist", "latitude": 35.1587, "longitude": 129.1604 }))
            .await;
        app.create_place(&token, json!({ "name": "좌표없음", "category": "tourist" }))
            .await;

        let (status, body) = app
            .get("/api/v1/places/nearby?lat=37.5665&lng=126.9780&radius_km=10", None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let places = body["places"].as_array().unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0]["name"], "덕수궁");
        assert_eq!(places[1]["name"], "남산타워");
        assert!(places[0]["distance_km"].as_f64().unwrap() < places[1]["distance_km"].as_f64().unwrap());

        let (status, _) = app
            .get("/api/v1/places/nearby?lat=137.0&lng=126.9", None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn only_owner_or_admin_modifies_place() {
        let app = test_app().await;
        let (owner, _) = app.register("owner", "business").await;
        let (other, _) = app.register("rival", "business").await;
        let (admin, admin_id) = app.register("admin", "user").await;
        app.make_admin(&admin_id).await;

        let id = app
            .create_place(&owner, json!({ "name": "카페", "category": "restaurant" }))
            .await;
        let uri = format!("/api/v1/places/{}", id);

        let (status, _) = app.patch(&uri, Some(&other), json!({ "name": "탈취" })).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, place) = app
            .patch(&uri, Some(&owner), json!({ "phone": "02-123-4567" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(place["phone"], "02-123-4567");
        assert_eq!(place["name"], "카페");

        let (status, _) = app.delete(&uri, Some(&admin)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = app.get(&uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rating_and_popular_sorts_use_aggregates() {
        let app = test_app().await;
        let (owner, _) = app.register("owner", "business").await;
        let (alice, _) = app.register("alice", "user").await;
        let (bob, _) = app.register("bob", "user").await;

        let a = app.create_place(&owner, json!({ "name": "가", "category": "tourist" })).await;
        let b = app.create_place(&owner, json!({ "name": "나", "category": "tourist" })).await;
        app.create_place(&owner, json!({ "name": "다", "category": "tourist" })).await;

        // 가: 평균 4 (리뷰 2개), 나: 평균 4 (리뷰 1개), 다: 리뷰 없음
        for (token, place, rating) in [(&alice, &a, 5), (&bob, &a, 3), (&alice, &b, 4)] {
            let (status, _) = app
                .post(
                    &format!("/api/v1/places/{}/reviews", place),
                    Some(token.as_str()),
                    json!({ "rating": rating, "content": "후기" }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }
        // 나: 북마크 2개, 가: 1개, 다: 0개
        for (token, place) in [(&alice, &b), (&bob, &b), (&alice, &a)] {
            let (status, _) = app
                .post("/api/v1/bookmarks", Some(token.as_str()), json!({ "place_id": place }))
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let names = |body: &serde_json::Value| -> Vec<String> {
            body["places"]
                .as_array()
                .unwrap()
                .iter()
                .map(|p| p["name"].as_str().unwrap().to_string())
                .collect()
        };

        let (_, body) = app.get("/api/v1/places?sort=rating", None).await;
        assert_eq!(names(&body), vec!["가", "나", "다"]);
        assert_eq!(body["places"][0]["rating_avg"], 4.0);
        let (_, body) = app.get("/api/v1/places?sort=popular", None).await;
        assert_eq!(names(&body), vec!["나", "가", "다"]);
    }

    #[tokio::test]
    async fn huge_page_returns_empty_list() {
        let app = test_app().await;
        let (token, _) = app.register("owner", "business").await;
        app.create_place(&token, json!({ "name": "해운대", "category": "tourist" })).await;

        let (status, body) = app
            .get("/api/v1/places?page=9223372036854775807&limit=100", None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["places"], json!([]));
    }

    #[tokio::test]
    async fn keyword_wildcards_match_literally() {
        let app = test_app().await;
        let (token, _) = app.register("owner", "business").await;
        app.create_place(&token, json!({ "name": "100% 한우", "category": "restaurant" })).await;
        app.create_place(&token, json!({ "name": "한우 1000", "category": "restaurant" })).await;

        let (_, body) = app.get("/api/v1/places?q=100%25", None).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["places"][0]["name"], "100% 한우");

        let (_, body) = app.get("/api/v1/places?q=_", None).await;
        assert_eq!(body["total"], 0);
    }
}
