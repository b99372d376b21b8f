use serde::{Deserialize, Serialize};

use super::place::Place;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub place_id: String,
    pub created_at: String,
}

/// 내 북마크 목록의 한 항목: 북마크한 시각과 장소 정보
#[derive(Debug, Clone, Serialize)]
pub struct BookmarkedPlace {
    pub bookmarked_at: String,
    pub place: Place,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookmarkRequest {
    pub place_id: String,
}
