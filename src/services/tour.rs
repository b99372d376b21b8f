//! # 한국관광공사 Tour API 클라이언트
//!
//! 공공데이터포털의 국문 관광정보 서비스(KorService1)를 그대로 중계합니다.
//! 서버는 서비스키와 공통 파라미터만 덧붙이고, 성공 응답 JSON은 가공 없이 돌려줍니다.
//!
//! ## 공통 파라미터
//! - `serviceKey`: 발급받은 인증키 (Decoding 키를 설정해야 이중 인코딩이 되지 않습니다)
//! - `MobileOS=ETC`, `MobileApp=Smartrip`, `_type=json`
//!
//! ## 실패 처리
//! | 상황 | 결과 |
//! |------|------|
//! | 서비스키 미설정 | 503 |
//! | 연결 실패/타임아웃, 2xx 아닌 상태, JSON 아닌 본문 | 502 |
//! | `resultCode`가 "0000"이 아님 | 502 (upstream 메시지 포함) |

use std::time::Duration;

use serde_json::Value;

use crate::error::AppError;

pub const MOBILE_OS: &str = "ETC";
pub const MOBILE_APP: &str = "Smartrip";
pub const SUCCESS_CODE: &str = "0000";

/// 중계하는 Tour API 오퍼레이션
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourOperation {
    /// 지역코드 조회
    AreaCode,
    /// 지역기반 관광정보 조회
    AreaBasedList,
    /// 키워드 검색 조회
    SearchKeyword,
    /// 위치기반 관광정보 조회
    LocationBasedList,
    /// 행사정보 조회
    SearchFestival,
    /// 공통정보 조회 (상세)
    DetailCommon,
}

impl TourOperation {
    pub fn path(&self) -> &'static str {
        match self {
            TourOperation::AreaCode => "areaCode1",
            TourOperation::AreaBasedList => "areaBasedList1",
            TourOperation::SearchKeyword => "searchKeyword1",
            TourOperation::LocationBasedList => "locationBasedList1",
            TourOperation::SearchFestival => "searchFestival1",
            TourOperation::DetailCommon => "detailCommon1",
        }
    }
}

/// Tour API 호출용 클라이언트
///
/// `reqwest::Client`는 내부적으로 Arc로 연결 풀을 공유하므로 clone 비용이 작습니다.
#[derive(Debug, Clone)]
pub struct TourClient {
    http: reqwest::Client,
    base_url: String,
    service_key: Option<String>,
}

impl TourClient {
    pub fn new(
        base_url: &str,
        service_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.service_key.is_some()
    }

    pub fn endpoint(&self, operation: TourOperation) -> String {
        format!("{}/{}", self.base_url, operation.path())
    }

    /// 오퍼레이션을 호출하고 upstream JSON을 그대로 반환합니다.
    pub async fn fetch(
        &self,
        operation: TourOperation,
        params: &[(&str, String)],
    ) -> Result<Value, AppError> {
        let service_key = self
            .service_key
            .as_deref()
            .ok_or_else(|| AppError::ServiceUnavailable("Tour API key is not configured".to_string()))?;

        let url = self.endpoint(operation);
        tracing::debug!(operation = operation.path(), "Calling Tour API");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("serviceKey", service_key),
                ("MobileOS", MOBILE_OS),
                ("MobileApp", MOBILE_APP),
                ("_type", "json"),
            ])
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Tour API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Tour API responded with status {}",
                status
            )));
        }

        // 인증키 오류 등은 200 + XML 본문으로 오는 경우가 있어 JSON 파싱 실패도 502로 처리합니다
        let body: Value = response
            .json()
            .await
            .map_err(|_| AppError::Upstream("Tour API returned a non-JSON response".to_string()))?;

        check_result(&body)?;
        Ok(body)
    }
}

/// 응답 JSON의 결과 코드를 확인합니다.
///
/// 정상 응답은 `response.header.resultCode`에, 일부 오류 응답은 최상위 `resultCode`에
/// 코드가 들어옵니다. 둘 다 없으면 형식을 알 수 없는 응답으로 봅니다.
pub fn check_result(body: &Value) -> Result<(), AppError> {
    let (code, message) = match body.pointer("/response/header/resultCode") {
        Some(code) => (code, body.pointer("/response/header/resultMsg")),
        None => match body.get("resultCode") {
            Some(code) => (code, body.get("resultMsg")),
            None => {
                return Err(AppError::Upstream(
                    "Tour API response has no result code".to_string(),
                ))
            }
        },
    };

    if code.as_str() == Some(SUCCESS_CODE) {
        return Ok(());
    }

    let message = message.and_then(Value::as_str).unwrap_or("unknown error");
    Err(AppError::Upstream(format!(
        "Tour API error {}: {}",
        code.as_str().map(str::to_string).unwrap_or_else(|| code.to_string()),
        message
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_joins_base_url_and_operation() {
        let client = TourClient::new(
            "https://apis.data.go.kr/B551011/KorService1/",
            None,
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(TourOperation::SearchKeyword),
            "https://apis.data.go.kr/B551011/KorService1/searchKeyword1"
        );
        assert!(!client.is_configured());
    }

    #[test]
    fn accepts_success_header() {
        let body = json!({
            "response": {
                "header": { "resultCode": "0000", "resultMsg": "OK" },
                "body": { "items": "" }
            }
        });
        assert!(check_result(&body).is_ok());
    }

    #[test]
    fn rejects_error_codes() {
        let body = json!({ "resultCode": "10", "resultMsg": "INVALID_REQUEST_PARAMETER_ERROR" });
        match check_result(&body) {
            Err(AppError::Upstream(msg)) => {
                assert!(msg.contains("INVALID_REQUEST_PARAMETER_ERROR"));
            }
            other => panic!("unexpected result: {:?}", other),
        }

        assert!(check_result(&json!({ "hello": "world" })).is_err());
    }

    #[tokio::test]
    async fn fetch_without_key_is_unavailable() {
        let client = TourClient::new("http://127.0.0.1:9", None, Duration::from_secs(1)).unwrap();
        let result = client.fetch(TourOperation::AreaCode, &[]).await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
    }
}
