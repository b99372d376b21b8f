//! # 서비스 계층
//!
//! DB에 직접 닿지 않는 비즈니스 로직을 모아둔 모듈입니다.
//! - `geo`: 좌표 간 거리 계산 (주변 장소 정렬)
//! - `itinerary`: 일정 날짜 계산, 드래그 앤 드롭 순서 재계산
//! - `tour`: 한국관광공사 Tour API 중계 클라이언트

pub mod geo;
pub mod itinerary;
pub mod tour;
