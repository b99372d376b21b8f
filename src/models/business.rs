use serde::Serialize;

use super::review::Review;

/// 사업자 대시보드 요약
#[derive(Debug, Clone, Serialize)]
pub struct BusinessSummary {
    pub place_count: i64,
    pub review_count: i64,
    pub bookmark_count: i64,
    /// 소유 장소 전체 리뷰의 평균 평점 (리뷰가 없으면 0)
    pub rating_avg: f64,
    pub recent_reviews: Vec<Review>,
}
