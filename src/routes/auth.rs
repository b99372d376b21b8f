use crate::{
    db::users as db_users,
    error::{is_unique_violation, AppError},
    middleware::auth::{
        create_access_token, create_refresh_token, hash_token, verify_refresh_token, AuthUser,
        REFRESH_TOKEN_DAYS,
    },
    models::user::*,
    routes::{non_empty, AppState},
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use sqlx::SqlitePool;

const EXPIRES_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// access/refresh 토큰을 새로 발급하고 refresh 토큰 해시를 저장합니다.
async fn issue_tokens(pool: &SqlitePool, user: User, secret: &str) -> Result<AuthResponse, AppError> {
    let access_token = create_access_token(&user.id, secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;
    let refresh_token = create_refresh_token(&user.id, secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    let token_id = uuid::Uuid::now_v7().to_string();
    let token_hash = hash_token(&refresh_token);
    let expires_at = (Utc::now() + Duration::days(REFRESH_TOKEN_DAYS))
        .format(EXPIRES_AT_FORMAT)
        .to_string();

    db_users::store_refresh_token(pool, &token_id, &user.id, &token_hash, &expires_at).await?;

    Ok(AuthResponse {
        user: user.into(),
        access_token,
        refresh_token,
    })
}

/// 사전 중복 확인을 통과한 뒤 UNIQUE 제약에 걸린 경우도 409로 돌려줍니다.
fn conflict_on_unique(err: AppError, message: &str) -> AppError {
    match err {
        AppError::Database(ref db_err) if is_unique_violation(db_err) => {
            AppError::Conflict(message.to_string())
        }
        other => other,
    }
}

fn validate_email(email: &str) -> Result<(), AppError> {
    if !email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    Ok(())
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let username = req.username.trim();
    let email = req.email.trim();

    // Validate input
    if username.chars().count() < 3 {
        return Err(AppError::BadRequest("Username must be at least 3 characters".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest("Password must be at least 8 characters".to_string()));
    }
    validate_email(email)?;

    // 관리자 역할은 가입으로 얻을 수 없습니다
    let role = match req.role.as_deref().map(Role::parse) {
        None => Role::User,
        Some(Some(role @ (Role::User | Role::Business))) => role,
        Some(_) => {
            return Err(AppError::BadRequest(
                "Role must be either 'user' or 'business'".to_string(),
            ))
        }
    };

    if db_users::find_by_username(&state.pool, username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }
    if db_users::find_by_email(&state.pool, email).await?.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    let user_id = uuid::Uuid::now_v7().to_string();
    let user = db_users::create_user(
        &state.pool,
        &user_id,
        username,
        email,
        &password_hash,
        non_empty(req.nickname.as_deref()),
        role.as_str(),
    )
    .await
    // 사전 확인과 INSERT 사이에 같은 아이디로 가입한 경우
    .map_err(|e| conflict_on_unique(e, "Username or email already exists"))?;

    tracing::info!(user_id = %user.id, role = role.as_str(), "User registered");
    Ok(Json(issue_tokens(&state.pool, user, &state.jwt_secret).await?))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    // 아이디 또는 이메일
    let user = db_users::find_by_login(&state.pool, req.username.trim())
        .await?
        .ok_or(AppError::Unauthorized("Invalid username or password".to_string()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid username or password".to_string()))?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(issue_tokens(&state.pool, user, &state.jwt_secret).await?))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    verify_refresh_token(&req.refresh_token, &state.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    // Check if refresh token hash exists in DB
    let token_hash = hash_token(&req.refresh_token);
    let (_token_id, user_id, expires_at) = db_users::find_refresh_token(&state.pool, &token_hash)
        .await?
        .ok_or(AppError::Unauthorized("Refresh token not found or revoked".to_string()))?;

    // Rotate: 기존 토큰은 한 번 쓰면 폐기. 먼저 지운 요청만 계속 진행합니다
    if !db_users::delete_refresh_token(&state.pool, &token_hash).await? {
        return Err(AppError::Unauthorized("Refresh token not found or revoked".to_string()));
    }

    let expires = chrono::NaiveDateTime::parse_from_str(&expires_at, EXPIRES_AT_FORMAT)
        .map_err(|e| AppError::Internal(format!("Date parse error: {}", e)))?;
    if expires.and_utc() < Utc::now() {
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    let user = db_users::find_by_id(&state.pool, &user_id)
        .await?
        .ok_or(AppError::Unauthorized("User not found".to_string()))?;

    Ok(Json(issue_tokens(&state.pool, user, &state.jwt_secret).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    db_users::delete_user_refresh_tokens(&state.pool, &auth_user.user_id).await?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = db_users::find_by_id(&state.pool, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user.into()))
}

pub async fn update_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = auth_user.load(&state.pool).await?;

    let email = non_empty(req.email.as_deref());
    if let Some(email) = email {
        validate_email(email)?;
        if let Some(other) = db_users::find_by_email(&state.pool, email).await? {
            if other.id != user.id {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }
    }

    let updated = db_users::update_profile(
        &state.pool,
        &user.id,
        non_empty(req.nickname.as_deref()),
        email,
    )
    .await
    .map_err(|e| conflict_on_unique(e, "Email already exists"))?
    .ok_or(AppError::NotFound)?;

    Ok(Json(updated.into()))
}

#[cfg(test)]
mod tests {
    use super::conflict_on_unique;
    use crate::{db::users as db_users, error::AppError, middleware::auth::hash_token};
    use crate::routes::test_support::test_app;
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    async fn register_full(app: &crate::routes::test_support::TestApp, username: &str) -> Value {
        let (status, body) = app
            .post(
                "/api/v1/auth/register",
                None,
                json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "password123",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn register_login_and_me() {
        let app = test_app().await;
        let (token, user_id) = app.register("traveler", "user").await;

        let (status, me) = app.get("/api/v1/auth/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["id"], user_id.as_str());
        assert_eq!(me["role"], "user");
        assert!(me.get("password_hash").is_none());

        // 이메일로도 로그인할 수 있습니다
        let (status, body) = app
            .post(
                "/api/v1/auth/login",
                None,
                json!({ "username": "traveler@example.com", "password": "password123" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["access_token"].is_string());
    }

    #[tokio::test]
    async fn register_validates_input() {
        let app = test_app().await;

        let cases = [
            json!({ "username": "ab", "email": "a@b.c", "password": "password123" }),
            json!({ "username": "abc", "email": "a@b.c", "password": "short" }),
            json!({ "username": "abc", "email": "invalid", "password": "password123" }),
            json!({ "username": "abc", "email": "a@b.c", "password": "password123", "role": "admin" }),
        ];
        for body in cases {
            let (status, _) = app.post("/api/v1/auth/register", None, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let app = test_app().await;
        app.register("traveler", "user").await;

        let (status, body) = app
            .post(
                "/api/v1/auth/register",
                None,
                json!({ "username": "traveler", "email": "other@example.com", "password": "password123" }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "conflict");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = test_app().await;
        app.register("traveler", "user").await;

        let (status, _) = app
            .post(
                "/api/v1/auth/login",
                None,
                json!({ "username": "traveler", "password": "wrong-password" }),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn refresh_rotates_and_logout_revokes() {
        let app = test_app().await;
        let (status, body) = app
            .post(
                "/api/v1/auth/register",
                None,
                json!({ "username": "traveler", "email": "t@example.com", "password": "password123" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let first_refresh = body["refresh_token"].as_str().unwrap().to_string();

        let (status, rotated) = app
            .post("/api/v1/auth/refresh", None, json!({ "refresh_token": first_refresh }))
            .await;
        assert_eq!(status, StatusCode::OK);

        // 한 번 쓴 refresh 토큰은 재사용할 수 없습니다
        let (status, _) = app
            .post("/api/v1/auth/refresh", None, json!({ "refresh_token": first_refresh }))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let access = rotated["access_token"].as_str().unwrap();
        let second_refresh = rotated["refresh_token"].as_str().unwrap();
        let (status, _) = app.post("/api/v1/auth/logout", Some(access), json!({})).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .post("/api/v1/auth/refresh", None, json!({ "refresh_token": second_refresh }))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_token_is_rejected() {
        let app = test_app().await;
        let (status, body) = app.get("/api/v1/auth/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "missing_token");
    }

    #[tokio::test]
    async fn update_profile_changes_nickname() {
        let app = test_app().await;
        let (token, _) = app.register("traveler", "user").await;
        app.register("another", "user").await;

        let (status, me) = app
            .patch("/api/v1/auth/me", Some(&token), json!({ "nickname": "여행자" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["nickname"], "여행자");

        let (status, _) = app
            .patch(
                "/api/v1/auth/me",
                Some(&token),
                json!({ "email": "another@example.com" }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
    #[tokio::test]
    async fn refresh_token_cannot_call_the_api() {
        let app = test_app().await;
        let body = register_full(&app, "alice").await;
        let access = body["access_token"].as_str().unwrap();
        let refresh = body["refresh_token"].as_str().unwrap();

        let (status, body) = app.get("/api/v1/auth/me", Some(refresh)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "invalid_token");

        let (status, _) = app.post("/api/v1/auth/logout", Some(access), json!({})).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app
            .post(
                "/api/v1/boards",
                Some(refresh),
                json!({ "category": "free", "title": "제목", "content": "내용" }),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // access 토큰으로는 갱신할 수 없습니다
        let (status, _) = app
            .post("/api/v1/auth/refresh", None, json!({ "refresh_token": access }))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn expired_refresh_row_is_rejected_and_removed() {
        let app = test_app().await;
        let body = register_full(&app, "traveler").await;
        let refresh = body["refresh_token"].as_str().unwrap().to_string();
        let token_hash = hash_token(&refresh);

        sqlx::query("UPDATE refresh_tokens SET expires_at = '2000-01-01T00:00:00.000Z' WHERE token_hash = ?")
            .bind(&token_hash)
            .execute(&app.pool)
            .await
            .unwrap();

        let (status, body) = app
            .post("/api/v1/auth/refresh", None, json!({ "refresh_token": refresh }))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Refresh token expired");
        assert!(db_users::find_refresh_token(&app.pool, &token_hash)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn refresh_row_is_consumed_once() {
        let app = test_app().await;
        let body = register_full(&app, "traveler").await;
        let token_hash = hash_token(body["refresh_token"].as_str().unwrap());

        assert!(db_users::delete_refresh_token(&app.pool, &token_hash).await.unwrap());
        assert!(!db_users::delete_refresh_token(&app.pool, &token_hash).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_on_write_maps_to_conflict() {
        let app = test_app().await;
        let (_, alice_id) = app.register("alice", "user").await;
        app.register("bob", "user").await;

        // 사전 확인 없이 바로 UPDATE해서 UNIQUE 제약 위반을 만듭니다
        let err = db_users::update_profile(&app.pool, &alice_id, None, Some("bob@example.com"))
            .await
            .unwrap_err();
        match conflict_on_unique(err, "Email already exists") {
            AppError::Conflict(msg) => assert_eq!(msg, "Email already exists"),
            other => panic!("expected conflict, got {:?}", other),
        }

        let passthrough = conflict_on_unique(AppError::NotFound, "Email already exists");
        assert!(matches!(passthrough, AppError::NotFound));
    }
}
