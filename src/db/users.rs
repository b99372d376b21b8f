use crate::error::AppError;
use crate::models::user::User;
use sqlx::SqlitePool;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, nickname, role, created_at, updated_at";

pub async fn create_user(
    pool: &SqlitePool,
    id: &str,
    username: &str,
    email: &str,
    password_hash: &str,
    nickname: Option<&str>,
    role: &str,
) -> Result<User, AppError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, nickname, role)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(nickname)
    .bind(role)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created user".to_string()))
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE username = ?",
        USER_COLUMNS
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE email = ?",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// 아이디 또는 이메일로 사용자를 찾습니다 (로그인용).
pub async fn find_by_login(pool: &SqlitePool, login: &str) -> Result<Option<User>, AppError> {
    if let Some(user) = find_by_username(pool, login).await? {
        return Ok(Some(user));
    }
    find_by_email(pool, login).await
}

pub async fn update_profile(
    pool: &SqlitePool,
    id: &str,
    nickname: Option<&str>,
    email: Option<&str>,
) -> Result<Option<User>, AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET nickname = COALESCE(?, nickname),
            email = COALESCE(?, email),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(nickname)
    .bind(email)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id).await
}

pub async fn store_refresh_token(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    token_hash: &str,
    expires_at: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn find_refresh_token(
    pool: &SqlitePool,
    token_hash: &str,
) -> Result<Option<(String, String, String)>, AppError> {
    let row = sqlx::query_as::<_, (String, String, String)>(
        r#"
        SELECT id, user_id, expires_at
        FROM refresh_tokens
        WHERE token_hash = ?
        "#,
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// refresh 토큰 행을 지웁니다. 실제로 지운 행이 있을 때만 true.
///
/// 같은 토큰으로 동시에 갱신 요청이 와도 DELETE에 성공한 한 요청만 새 토큰을 받습니다.
pub async fn delete_refresh_token(pool: &SqlitePool, token_hash: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = ?")
        .bind(token_hash)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_user_refresh_tokens(pool: &SqlitePool, user_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
