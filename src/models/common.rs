//! # 공통 요청 타입
//!
//! 목록 API들이 함께 쓰는 페이지네이션 파라미터를 정의합니다.

use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// `?page=2&limit=20` 형태의 쿼리 파라미터
///
/// 값이 없거나 범위를 벗어나면 안전한 값으로 보정합니다
/// (page는 1 이상, limit은 1..=100).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// SQL `OFFSET` 값. 아주 큰 page는 i64::MAX에서 멈춥니다 (빈 페이지).
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}
