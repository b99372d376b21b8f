//! # 커뮤니티 게시판 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET | /api/v1/boards | 게시글 목록 (분류/태그/키워드, 페이지) |
//! | POST | /api/v1/boards | 게시글 작성 |
//! | GET | /api/v1/boards/{id} | 게시글 상세 (조회수 +1, 댓글 포함) |
//! | PATCH | /api/v1/boards/{id} | 게시글 수정 (작성자) |
//! | DELETE | /api/v1/boards/{id} | 게시글 삭제 (작성자/관리자) |
//! | POST | /api/v1/boards/{id}/like | 좋아요 토글 |
//! | GET | /api/v1/boards/{id}/comments | 댓글 목록 |
//! | POST | /api/v1/boards/{id}/comments | 댓글 작성 |
//! | DELETE | /api/v1/comments/{id} | 댓글 삭제 (작성자/관리자) |

use crate::{
    db::boards::{self as db_boards, BoardFilter},
    error::AppError,
    middleware::auth::{ensure_owner_or_admin, AuthUser},
    models::*,
    routes::{non_empty, AppState},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// 태그를 정리합니다: 앞뒤 공백 제거, 소문자화, 빈 값 제거, 중복 제거(처음 순서 유지).
///
/// 정리 후 태그가 `MAX_TAGS`개를 넘거나, `MAX_TAG_LENGTH`자를 넘는 태그가 있으면 400입니다.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, AppError> {
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || normalized.contains(&tag) {
            continue;
        }
        if tag.chars().count() > MAX_TAG_LENGTH {
            return Err(AppError::BadRequest(format!(
                "Tags can be at most {} characters",
                MAX_TAG_LENGTH
            )));
        }
        normalized.push(tag);
    }

    if normalized.len() > MAX_TAGS {
        return Err(AppError::BadRequest(format!(
            "A post can have at most {} tags",
            MAX_TAGS
        )));
    }
    Ok(normalized)
}

fn validate_category(category: &str) -> Result<(), AppError> {
    if !is_valid_board_category(category) {
        return Err(AppError::BadRequest(format!("Unknown board category: {}", category)));
    }
    Ok(())
}

pub async fn list_boards(
    State(state): State<AppState>,
    Query(query): Query<BoardListQuery>,
) -> Result<Json<Value>, AppError> {
    let category = non_empty(query.category.as_deref());
    if let Some(category) = category {
        validate_category(category)?;
    }
    let tag = non_empty(query.tag.as_deref()).map(str::to_lowercase);

    let page = Pagination {
        page: query.page,
        limit: query.limit,
    };
    let filter = BoardFilter {
        category,
        tag: tag.as_deref(),
        keyword: non_empty(query.q.as_deref()),
    };

    let (boards, total) =
        db_boards::list_boards(&state.pool, &filter, page.limit(), page.offset()).await?;

    Ok(Json(json!({
        "boards": boards,
        "page": page.page(),
        "limit": page.limit(),
        "total": total,
    })))
}

pub async fn create_board(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateBoardRequest>,
) -> Result<(StatusCode, Json<Board>), AppError> {
    validate_category(&req.category)?;
    let title = req.title.trim();
    let content = req.content.trim();
    if title.is_empty() || content.is_empty() {
        return Err(AppError::BadRequest("Title and content are required".to_string()));
    }
    let tags = normalize_tags(&req.tags)?;

    let board = db_boards::create_board(
        &state.pool,
        &auth_user.user_id,
        &req.category,
        title,
        content,
        &tags,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(board)))
}

/// 상세 조회: 조회수를 먼저 올린 뒤 최신 값을 반환합니다.
pub async fn get_board(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BoardDetail>, AppError> {
    db_boards::increment_view_count(&state.pool, &id).await?;
    let board = db_boards::get_board(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    let comments = db_boards::list_comments(&state.pool, &id).await?;

    Ok(Json(BoardDetail { board, comments }))
}

pub async fn update_board(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateBoardRequest>,
) -> Result<Json<Board>, AppError> {
    let board = db_boards::get_board(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    if board.user_id != auth_user.user_id {
        return Err(AppError::Forbidden("You can only edit your own posts".to_string()));
    }

    if let Some(category) = &req.category {
        validate_category(category)?;
    }
    let title = req.title.as_deref().map(str::trim);
    let content = req.content.as_deref().map(str::trim);
    if title == Some("") || content == Some("") {
        return Err(AppError::BadRequest("Title and content cannot be empty".to_string()));
    }
    let tags = req.tags.as_deref().map(normalize_tags).transpose()?;

    let updated = db_boards::update_board(
        &state.pool,
        &id,
        req.category.as_deref(),
        title,
        content,
        tags.as_deref(),
    )
    .await?
    .ok_or(AppError::NotFound)?;
    Ok(Json(updated))
}

pub async fn delete_board(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user = auth_user.load(&state.pool).await?;
    let board = db_boards::get_board(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_owner_or_admin(&user, Some(&board.user_id))?;

    db_boards::delete_board(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_like(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<LikeResponse>, AppError> {
    if !db_boards::board_exists(&state.pool, &id).await? {
        return Err(AppError::NotFound);
    }

    let (liked, like_count) = db_boards::toggle_like(&state.pool, &id, &auth_user.user_id).await?;
    Ok(Json(LikeResponse { liked, like_count }))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !db_boards::board_exists(&state.pool, &id).await? {
        return Err(AppError::NotFound);
    }

    let comments = db_boards::list_comments(&state.pool, &id).await?;
    Ok(Json(json!({ "comments": comments })))
}

pub async fn create_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("Comment content is required".to_string()));
    }
    if !db_boards::board_exists(&state.pool, &id).await? {
        return Err(AppError::NotFound);
    }

    let comment = db_boards::create_comment(&state.pool, &id, &auth_user.user_id, content).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user = auth_user.load(&state.pool).await?;
    let comment = db_boards::get_comment(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_owner_or_admin(&user, Some(&comment.user_id))?;

    db_boards::delete_comment(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::normalize_tags;
    use crate::routes::test_support::test_app;
    use axum::http::StatusCode;
    use serde_json::json;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn tags_are_trimmed_lowercased_and_deduplicated() {
        let result = normalize_tags(&tags(&[" Jeju ", "jeju", "", "맛집", "  "])).unwrap();
        assert_eq!(result, tags(&["jeju", "맛집"]));
    }

    #[test]
    fn too_many_or_too_long_tags_are_rejected() {
        let many: Vec<String> = (0..11).map(|i| format!("tag{}", i)).collect();
        assert!(normalize_tags(&many).is_err());
        assert!(normalize_tags(&tags(&["가나다라마바사아자차카타파하가나다라마바사"])).is_err());
    }

    #[tokio::test]
    async fn create_list_and_filter_by_tag() {
        let app = test_app().await;
        let (token, _) = app.register("writer", "user").await;

        let (status, board) = app
            .post(
                "/api/v1/boards",
                Some(&token),
                json!({ "category": "review", "title": "제주 3박4일", "content": "후기입니다", "tags": ["Jeju", "맛집"] }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(board["tags"], json!(["jeju", "맛집"]));

        app.post(
            "/api/v1/boards",
            Some(&token),
            json!({ "category": "question", "title": "부산 숙소 추천?", "content": "질문" }),
        )
        .await;

        let (_, body) = app.get("/api/v1/boards", None).await;
        assert_eq!(body["total"], 2);
        // 최신순
        assert_eq!(body["boards"][0]["title"], "부산 숙소 추천?");

        let (_, body) = app.get("/api/v1/boards?tag=JEJU", None).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["boards"][0]["title"], "제주 3박4일");

        let (_, body) = app.get("/api/v1/boards?category=question", None).await;
        assert_eq!(body["total"], 1);

        let (status, _) = app.get("/api/v1/boards?category=ads", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn detail_counts_views_likes_and_comments() {
        let app = test_app().await;
        let (writer, _) = app.register("writer", "user").await;
        let (reader, _) = app.register("reader", "user").await;

        let (_, board) = app
            .post(
                "/api/v1/boards",
                Some(&writer),
                json!({ "category": "companion", "title": "동행 구해요", "content": "5월 강릉" }),
            )
            .await;
        let id = board["id"].as_str().unwrap();
        let like_uri = format!("/api/v1/boards/{}/like", id);

        let (_, like) = app.post(&like_uri, Some(&reader), json!({})).await;
        assert_eq!(like, json!({ "liked": true, "like_count": 1 }));
        let (_, like) = app.post(&like_uri, Some(&reader), json!({})).await;
        assert_eq!(like, json!({ "liked": false, "like_count": 0 }));
        app.post(&like_uri, Some(&writer), json!({})).await;

        let (status, _) = app
            .post(
                &format!("/api/v1/boards/{}/comments", id),
                Some(&reader),
                json!({ "content": "저도 갈래요" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        app.get(&format!("/api/v1/boards/{}", id), None).await;
        let (status, detail) = app.get(&format!("/api/v1/boards/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["view_count"], 2);
        assert_eq!(detail["like_count"], 1);
        assert_eq!(detail["comment_count"], 1);
        assert_eq!(detail["comments"][0]["author"], "reader");
    }

    #[tokio::test]
    async fn only_author_updates_and_admin_can_delete() {
        let app = test_app().await;
        let (writer, _) = app.register("writer", "user").await;
        let (other, _) = app.register("other", "user").await;
        let (admin, admin_id) = app.register("admin", "user").await;
        app.make_admin(&admin_id).await;

        let (_, board) = app
            .post(
                "/api/v1/boards",
                Some(&writer),
                json!({ "category": "free", "title": "안녕하세요", "content": "첫 글", "tags": ["인사"] }),
            )
            .await;
        let uri = format!("/api/v1/boards/{}", board["id"].as_str().unwrap());

        let (status, _) = app.patch(&uri, Some(&other), json!({ "title": "수정" })).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, updated) = app
            .patch(&uri, Some(&writer), json!({ "title": "반갑습니다", "tags": [] }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "반갑습니다");
        assert_eq!(updated["content"], "첫 글");
        assert_eq!(updated["tags"], json!([]));

        let (status, _) = app.delete(&uri, Some(&other)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app.delete(&uri, Some(&admin)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn comment_author_deletes_comment() {
        let app = test_app().await;
        let (writer, _) = app.register("writer", "user").await;
        let (reader, _) = app.register("reader", "user").await;
        let (_, board) = app
            .post(
                "/api/v1/boards",
                Some(&writer),
                json!({ "category": "free", "title": "글", "content": "내용" }),
            )
            .await;
        let (_, comment) = app
            .post(
                &format!("/api/v1/boards/{}/comments", board["id"].as_str().unwrap()),
                Some(&reader),
                json!({ "content": "댓글" }),
            )
            .await;
        let uri = format!("/api/v1/comments/{}", comment["id"].as_str().unwrap());

        let (status, _) = app.delete(&uri, Some(&writer)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app.delete(&uri, Some(&reader)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn like_and_comments_on_missing_board_are_not_found() {
        let app = test_app().await;
        let (token, _) = app.register("reader", "user").await;

        let (status, _) = app
            .post("/api/v1/boards/no-such-board/like", Some(&token), json!({}))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.get("/api/v1/boards/no-such-board/comments", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app
            .post(
                "/api/v1/boards/no-such-board/comments",
                Some(&token),
                json!({ "content": "댓글" }),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn keyword_search_treats_wildcards_literally() {
        let app = test_app().await;
        let (token, _) = app.register("writer", "user").await;
        for (title, content) in [("할인 100% 후기", "만족"), ("전액 환불", "100원 남음"), ("a_b 코스", "설명"), ("axb 코스", "설명")] {
            let (status, _) = app
                .post(
                    "/api/v1/boards",
                    Some(&token),
                    json!({ "category": "free", "title": title, "content": content }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, body) = app.get("/api/v1/boards?q=100%25", None).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["boards"][0]["title"], "할인 100% 후기");

        let (_, body) = app.get("/api/v1/boards?q=a_b", None).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["boards"][0]["title"], "a_b 코스");

        let (_, body) = app.get("/api/v1/boards?q=%25", None).await;
        assert_eq!(body["total"], 1);
    }
}
