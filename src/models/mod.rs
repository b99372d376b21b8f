//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `common`: 페이지네이션 등 공통 쿼리 파라미터
//! - `user`: 사용자와 인증 요청/응답
//! - `place`: 장소(관광지/음식점/숙박)
//! - `bookmark`: 장소 북마크
//! - `review`: 장소 리뷰
//! - `board`: 커뮤니티 게시글/댓글
//! - `itinerary`: 여행 일정과 일정 아이템
//! - `business`: 사업자 대시보드 집계
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Place`처럼 짧게 쓸 수 있습니다.

pub mod board;
pub mod bookmark;
pub mod business;
pub mod common;
pub mod itinerary;
pub mod place;
pub mod review;
pub mod user;

pub use board::*;
pub use bookmark::*;
pub use business::*;
pub use common::*;
pub use itinerary::*;
pub use place::*;
pub use review::*;
pub use user::*;
