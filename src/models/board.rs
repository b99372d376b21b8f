//! # 커뮤니티 게시판 모델 정의
//!
//! ## 구조체 역할
//! - `Board`: 게시글 + 태그 + 좋아요/댓글 수 (응답용)
//! - `BoardRow`: `boards` 테이블 한 행과 집계 컬럼 (DB 매핑용)
//! - `Comment`: 댓글 + 작성자 표시 이름
//! - `CreateBoardRequest` / `UpdateBoardRequest`: 게시글 작성/수정 요청 본문

use serde::{Deserialize, Serialize};

/// 게시판 분류: 자유, 여행후기, 질문, 동행찾기
pub const BOARD_CATEGORIES: [&str; 4] = ["free", "review", "question", "companion"];

pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_LENGTH: usize = 20;

pub fn is_valid_board_category(category: &str) -> bool {
    BOARD_CATEGORIES.contains(&category)
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BoardRow {
    pub id: String,
    pub user_id: String,
    pub author: String,
    pub category: String,
    pub title: String,
    pub content: String,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub id: String,
    pub user_id: String,
    pub author: String,
    pub category: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Board {
    pub fn from_row(row: BoardRow, tags: Vec<String>) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            author: row.author,
            category: row.category,
            title: row.title,
            content: row.content,
            tags,
            view_count: row.view_count,
            like_count: row.like_count,
            comment_count: row.comment_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// 게시글 상세: 게시글 + 댓글 목록
#[derive(Debug, Clone, Serialize)]
pub struct BoardDetail {
    #[serde(flatten)]
    pub board: Board,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: String,
    pub board_id: String,
    pub user_id: String,
    pub author: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct BoardListQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub q: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBoardRequest {
    pub category: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBoardRequest {
    pub category: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    /// Some이면 태그 전체를 교체합니다
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: i64,
}
