//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `JWT_SECRET`: JWT 토큰 서명에 사용할 비밀키 (필수)
//! - `HOST` / `PORT`: 서버 바인딩 주소와 포트
//! - `DATABASE_MAX_CONNECTIONS`: 연결 풀 크기
//! - `TOUR_API_KEY`: 한국관광공사 Tour API 서비스키 (없으면 프록시 비활성)
//! - `TOUR_API_BASE_URL`: Tour API 기본 주소
//! - `TOUR_API_TIMEOUT_SECS`: Tour API 요청 타임아웃(초)
//! - `STATIC_DIR`: 빌드된 프론트엔드 정적 파일 디렉토리 (선택)

use std::env;

pub const DEFAULT_TOUR_API_BASE_URL: &str = "https://apis.data.go.kr/B551011/KorService1";

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후 `AppState`로 옮겨집니다.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub database_max_connections: u32,
    /// None이면 `/tour/*` 라우트가 503을 반환합니다
    pub tour_api_key: Option<String>,
    pub tour_api_base_url: String,
    pub tour_api_timeout_secs: u64,
    pub static_dir: Option<String>,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// `DATABASE_URL`과 `JWT_SECRET`은 필수이며, 없으면 `VarError::NotPresent`를 반환합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 임의의 조회 함수로 설정을 만듭니다.
    ///
    /// 테스트에서 전역 환경변수를 건드리지 않고 설정 파싱을 검증할 수 있도록 분리했습니다.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, env::VarError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 빈 문자열은 "설정하지 않음"으로 취급합니다
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            database_url: get("DATABASE_URL").ok_or(env::VarError::NotPresent)?,
            jwt_secret: get("JWT_SECRET").ok_or(env::VarError::NotPresent)?,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            // 파싱 실패 시 기본값 사용
            port: get("PORT").and_then(|v| v.parse().ok()).unwrap_or(4000),
            database_max_connections: get("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            tour_api_key: get("TOUR_API_KEY"),
            tour_api_base_url: get("TOUR_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TOUR_API_BASE_URL.to_string()),
            tour_api_timeout_secs: get("TOUR_API_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            static_dir: get("STATIC_DIR"),
        })
    }
}
