//! # 리뷰 모델 정의
//!
//! 사용자는 장소마다 리뷰를 하나만 남길 수 있습니다 (`UNIQUE(place_id, user_id)`).

use serde::{Deserialize, Serialize};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// 리뷰 + 작성자 표시 이름
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: String,
    pub place_id: String,
    pub user_id: String,
    /// 작성자 닉네임 (없으면 아이디)
    pub author: String,
    pub rating: i64,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i64,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<i64>,
    pub content: Option<String>,
}
