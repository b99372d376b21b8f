//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출하여 DB 작업을 수행합니다.
//!
//! 각 하위 모듈:
//! - `users`: 사용자, refresh 토큰
//! - `places`: 장소 CRUD, 목록 필터/정렬
//! - `bookmarks`: 북마크
//! - `reviews`: 리뷰
//! - `boards`: 게시글, 태그, 좋아요, 댓글
//! - `itineraries`: 여행 일정과 아이템 순서

pub mod boards;
pub mod bookmarks;
pub mod itineraries;
pub mod places;
pub mod reviews;
pub mod users;

use crate::error::AppError;
use sqlx::SqlitePool;

/// DB 연결 상태 확인 (헬스체크)
pub async fn ping(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// 검색어를 `LIKE ? ESCAPE '\'`용 부분 일치 패턴으로 만듭니다.
///
/// `%`, `_`, `\`는 와일드카드가 아니라 글자 그대로 찾습니다.
pub(crate) fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("한옥"), "%한옥%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b\\c"), "%a\\_b\\\\c%");
    }
}
