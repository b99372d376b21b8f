//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과 라우터 구성을 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 회원가입, 로그인, 토큰 갱신, 로그아웃, 내 정보
//! - `places`: 장소 목록/상세/주변 검색, 사업자 장소 등록
//! - `bookmarks`: 북마크
//! - `reviews`: 장소 리뷰
//! - `boards`: 커뮤니티 게시판, 좋아요, 댓글
//! - `itineraries`: 여행 일정 플래너
//! - `business`: 사업자 대시보드
//! - `tour`: 한국관광공사 Tour API 중계
//! - `health`: 서버 상태 확인

pub mod auth;
pub mod boards;
pub mod bookmarks;
pub mod business;
pub mod health;
pub mod itineraries;
pub mod places;
pub mod reviews;
pub mod tour;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::SqlitePool;

use crate::services::tour::TourClient;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// `SqlitePool`과 `TourClient` 모두 내부적으로 Arc를 쓰므로 clone해도 같은 자원을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    /// JWT 토큰 서명용 비밀키
    pub jwt_secret: String,
    pub tour: TourClient,
}

/// `/api/v1` 아래에 들어갈 API 라우터를 만듭니다.
///
/// 경로 파라미터는 axum 0.8 문법(`{id}`)을 사용합니다.
pub fn api_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me).patch(auth::update_me));

    let place_routes = Router::new()
        .route("/places", get(places::list_places).post(places::create_place))
        // "/places/nearby"는 "/places/{id}"보다 구체적인 경로이므로 axum이 우선 매칭합니다
        .route("/places/nearby", get(places::nearby_places))
        .route(
            "/places/{id}",
            get(places::get_place)
                .patch(places::update_place)
                .delete(places::delete_place),
        )
        .route(
            "/places/{id}/reviews",
            get(reviews::list_place_reviews).post(reviews::create_review),
        )
        .route(
            "/reviews/{id}",
            patch(reviews::update_review).delete(reviews::delete_review),
        )
        .route("/users/me/reviews", get(reviews::my_reviews))
        .route(
            "/bookmarks",
            get(bookmarks::list_bookmarks).post(bookmarks::create_bookmark),
        )
        .route(
            "/bookmarks/{place_id}",
            get(bookmarks::bookmark_status).delete(bookmarks::delete_bookmark),
        );

    let board_routes = Router::new()
        .route("/boards", get(boards::list_boards).post(boards::create_board))
        .route(
            "/boards/{id}",
            get(boards::get_board)
                .patch(boards::update_board)
                .delete(boards::delete_board),
        )
        .route("/boards/{id}/like", post(boards::toggle_like))
        .route(
            "/boards/{id}/comments",
            get(boards::list_comments).post(boards::create_comment),
        )
        .route("/comments/{id}", delete(boards::delete_comment));

    let itinerary_routes = Router::new()
        .route(
            "/itineraries",
            get(itineraries::list_itineraries).post(itineraries::create_itinerary),
        )
        .route("/itineraries/public", get(itineraries::list_public_itineraries))
        .route(
            "/itineraries/{id}",
            get(itineraries::get_itinerary)
                .patch(itineraries::update_itinerary)
                .delete(itineraries::delete_itinerary),
        )
        .route("/itineraries/{id}/items", post(itineraries::add_item))
        .route(
            "/itineraries/{id}/items/{item_id}",
            patch(itineraries::update_item).delete(itineraries::delete_item),
        )
        .route(
            "/itineraries/{id}/items/{item_id}/move",
            post(itineraries::move_item),
        )
        .route(
            "/itineraries/{id}/days/{day}/order",
            put(itineraries::reorder_day),
        );

    let business_routes = Router::new()
        .route("/business/places", get(business::my_places))
        .route("/business/summary", get(business::summary));

    let tour_routes = Router::new()
        .route("/tour/areas", get(tour::area_codes))
        .route("/tour/places", get(tour::area_based_list))
        .route("/tour/search", get(tour::search_keyword))
        .route("/tour/nearby", get(tour::location_based_list))
        .route("/tour/festivals", get(tour::festivals))
        .route("/tour/detail/{content_id}", get(tour::detail));

    Router::new()
        .merge(auth_routes)
        .merge(place_routes)
        .merge(board_routes)
        .merge(itinerary_routes)
        .merge(business_routes)
        .merge(tour_routes)
        .route("/health", get(health::health_check))
        .with_state(state)
}

/// 문자열 입력을 다듬습니다: 앞뒤 공백 제거, 빈 문자열은 None
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
