//! # 북마크 API 라우트 핸들러
//!
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET | /api/v1/bookmarks | 내 북마크 목록 (최신순) |
//! | POST | /api/v1/bookmarks | 북마크 추가 → 201, 중복이면 409 |
//! | GET | /api/v1/bookmarks/{place_id} | 북마크 여부 |
//! | DELETE | /api/v1/bookmarks/{place_id} | 북마크 해제 → 204 |

use crate::{
    db::{bookmarks as db_bookmarks, places as db_places},
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

pub async fn list_bookmarks(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let bookmarks = db_bookmarks::list_bookmarks(&state.pool, &auth_user.user_id).await?;
    Ok(Json(json!({ "bookmarks": bookmarks })))
}

pub async fn create_bookmark(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateBookmarkRequest>,
) -> Result<(StatusCode, Json<Bookmark>), AppError> {
    if !db_places::place_exists(&state.pool, &req.place_id).await? {
        return Err(AppError::NotFound);
    }

    let bookmark =
        db_bookmarks::create_bookmark(&state.pool, &auth_user.user_id, &req.place_id).await?;
    Ok((StatusCode::CREATED, Json(bookmark)))
}

pub async fn bookmark_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(place_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let bookmark = db_bookmarks::find_bookmark(&state.pool, &auth_user.user_id, &place_id).await?;
    Ok(Json(json!({ "bookmarked": bookmark.is_some() })))
}

pub async fn delete_bookmark(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(place_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let removed = db_bookmarks::delete_bookmark(&state.pool, &auth_user.user_id, &place_id).await?;
    if !removed {
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
    async fn bookmark_is_unique_per_user_and_place() {
        let app = test_app().await;
        let (owner, _) = app.register("owner", "business").await;
        let (user, _) = app.register("traveler", "user").await;
        let place_id = app
            .create_place(&owner, json!({ "name": "성산일출봉", "category": "tourist" }))
            .await;

        let (status, _) = app
            .post("/api/v1/bookmarks", Some(&user), json!({ "place_id": place_id }))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = app
            .post("/api/v1/bookmarks", Some(&user), json!({ "place_id": place_id }))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "conflict");

        // 다른 사용자는 같은 장소를 북마크할 수 있습니다
        let (status, _) = app
            .post("/api/v1/bookmarks", Some(&owner), json!({ "place_id": place_id }))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, place) = app.get(&format!("/api/v1/places/{}", place_id), None).await;
        assert_eq!(place["bookmark_count"], 2);
    }

    #[tokio::test]
    async fn list_status_and_delete() {
        let app = test_app().await;
        let (owner, _) = app.register("owner", "business").await;
        let (user, _) = app.register("traveler", "user").await;
        let place_id = app
            .create_place(&owner, json!({ "name": "한옥마을", "category": "accommodation" }))
            .await;
        let status_uri = format!("/api/v1/bookmarks/{}", place_id);

        let (_, body) = app.get(&status_uri, Some(&user)).await;
        assert_eq!(body["bookmarked"], false);

        app.post("/api/v1/bookmarks", Some(&user), json!({ "place_id": place_id }))
            .await;

        let (_, body) = app.get(&status_uri, Some(&user)).await;
        assert_eq!(body["bookmarked"], true);

        let (status, body) = app.get("/api/v1/bookmarks", Some(&user)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bookmarks"][0]["place"]["name"], "한옥마을");

        let (status, _) = app.delete(&status_uri, Some(&user)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.delete(&status_uri, Some(&user)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bookmarking_unknown_place_is_not_found() {
        let app = test_app().await;
        let (user, _) = app.register("traveler", "user").await;
        let (status, _) = app
            .post("/api/v1/bookmarks", Some(&user), json!({ "place_id": "missing" }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
