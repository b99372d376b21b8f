use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::{db::users as db_users, error::AppError, models::user::User, routes::AppState};

pub const ACCESS_TOKEN_MINUTES: i64 = 15;
pub const REFRESH_TOKEN_DAYS: i64 = 7;

/// `typ` 클레임 값. access 토큰 자리에 refresh 토큰을 쓰거나 그 반대를 막습니다.
pub const ACCESS_TOKEN_TYPE: &str = "access";
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: i64,
    pub iat: i64,
    /// 같은 초에 발급된 토큰도 서로 다른 값이 되도록 넣는 고유값
    pub jti: String,
    /// "access" 또는 "refresh"
    pub typ: String,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

impl AuthUser {
    /// 토큰의 사용자를 DB에서 다시 읽습니다. 탈퇴 등으로 사라졌으면 401.
    pub async fn load(&self, pool: &SqlitePool) -> Result<User, AppError> {
        db_users::find_by_id(pool, &self.user_id)
            .await?
            .ok_or(AppError::Unauthorized("User not found".to_string()))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let claims = verify_access_token(token, &state.jwt_secret)?;

        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "missing_token",
                "Authorization token is required",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid authorization token",
            ),
            AuthError::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                "expired_token",
                "Authorization token has expired",
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

fn create_token(
    user_id: &str,
    secret: &str,
    lifetime: Duration,
    typ: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
        jti: uuid::Uuid::now_v7().to_string(),
        typ: typ.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn create_access_token(
    user_id: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    create_token(user_id, secret, Duration::minutes(ACCESS_TOKEN_MINUTES), ACCESS_TOKEN_TYPE)
}

pub fn create_refresh_token(
    user_id: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    create_token(user_id, secret, Duration::days(REFRESH_TOKEN_DAYS), REFRESH_TOKEN_TYPE)
}

fn verify_token(token: &str, secret: &str, typ: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    if token_data.claims.typ != typ {
        return Err(AuthError::InvalidToken);
    }
    Ok(token_data.claims)
}

/// API 요청용 access 토큰만 통과시킵니다.
pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    verify_token(token, secret, ACCESS_TOKEN_TYPE)
}

/// `/auth/refresh`에서만 쓰는 refresh 토큰 검증
pub fn verify_refresh_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    verify_token(token, secret, REFRESH_TOKEN_TYPE)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 리소스 소유자이거나 관리자인지 확인합니다.
pub fn ensure_owner_or_admin(user: &User, owner_id: Option<&str>) -> Result<(), AppError> {
    if user.role() == crate::models::Role::Admin || owner_id == Some(user.id.as_str()) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You do not have permission to modify this resource".to_string(),
        ))
    }
}
