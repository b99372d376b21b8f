//! # 커뮤니티 게시판 데이터베이스 쿼리 모듈
//!
//! ## 테이블 구조
//! - `boards`: 게시글
//! - `board_tags`: 게시글-태그 (게시글마다 태그 문자열 여러 개)
//! - `board_likes`: 게시글-사용자 좋아요 (복합 PK로 중복 방지)
//! - `comments`: 댓글
//!
//! 좋아요 수와 댓글 수는 저장하지 않고 서브쿼리로 집계합니다.

use crate::db::like_pattern;
use crate::error::AppError;
use crate::models::*;
use sqlx::{SqliteConnection, SqlitePool};

const BOARD_SELECT: &str = r#"
    SELECT b.id, b.user_id,
           COALESCE(u.nickname, u.username) AS author,
           b.category, b.title, b.content, b.view_count,
           (SELECT COUNT(*) FROM board_likes l WHERE l.board_id = b.id) AS like_count,
           (SELECT COUNT(*) FROM comments c WHERE c.board_id = b.id) AS comment_count,
           b.created_at, b.updated_at
    FROM boards b
    JOIN users u ON u.id = b.user_id
"#;

const LIST_FILTER: &str = r#"
    WHERE (? IS NULL OR b.category = ?)
      AND (? IS NULL OR EXISTS (SELECT 1 FROM board_tags t WHERE t.board_id = b.id AND t.tag = ?))
      AND (? IS NULL OR b.title LIKE ? ESCAPE '\' OR b.content LIKE ? ESCAPE '\')
"#;

#[derive(Debug, Default)]
pub struct BoardFilter<'a> {
    pub category: Option<&'a str>,
    pub tag: Option<&'a str>,
    pub keyword: Option<&'a str>,
}

/// 게시글 목록 (최신순) + 전체 개수
pub async fn list_boards(
    pool: &SqlitePool,
    filter: &BoardFilter<'_>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Board>, i64), AppError> {
    let pattern = filter.keyword.map(like_pattern);

    let sql = format!(
        "{} {} ORDER BY b.created_at DESC, b.id DESC LIMIT ? OFFSET ?",
        BOARD_SELECT, LIST_FILTER
    );
    let rows = sqlx::query_as::<_, BoardRow>(&sql)
        .bind(filter.category)
        .bind(filter.category)
        .bind(filter.tag)
        .bind(filter.tag)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM boards b {}", LIST_FILTER);
    let (total,): (i64,) = sqlx::query_as(&count_sql)
        .bind(filter.category)
        .bind(filter.category)
        .bind(filter.tag)
        .bind(filter.tag)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    let mut boards = Vec::with_capacity(rows.len());
    for row in rows {
        let tags = get_board_tags(pool, &row.id).await?;
        boards.push(Board::from_row(row, tags));
    }

    Ok((boards, total))
}

/// 좋아요·댓글처럼 게시글 본문이 필요 없는 작업의 존재 확인
pub async fn board_exists(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM boards WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

pub async fn get_board(pool: &SqlitePool, id: &str) -> Result<Option<Board>, AppError> {
    let sql = format!("{} WHERE b.id = ?", BOARD_SELECT);
    let row = sqlx::query_as::<_, BoardRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let tags = get_board_tags(pool, &row.id).await?;
            Ok(Some(Board::from_row(row, tags)))
        }
        None => Ok(None),
    }
}

pub async fn get_board_tags(pool: &SqlitePool, board_id: &str) -> Result<Vec<String>, AppError> {
    let tags: Vec<(String,)> = sqlx::query_as("SELECT tag FROM board_tags WHERE board_id = ? ORDER BY tag")
        .bind(board_id)
        .fetch_all(pool)
        .await?;

    Ok(tags.into_iter().map(|(tag,)| tag).collect())
}

/// 조회수를 1 올립니다.
pub async fn increment_view_count(pool: &SqlitePool, id: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE boards SET view_count = view_count + 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// 게시글과 태그를 하나의 트랜잭션으로 저장합니다.
pub async fn create_board(
    pool: &SqlitePool,
    user_id: &str,
    category: &str,
    title: &str,
    content: &str,
    tags: &[String],
) -> Result<Board, AppError> {
    let id = uuid::Uuid::now_v7().to_string();
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO boards (id, user_id, category, title, content) VALUES (?, ?, ?, ?, ?)")
        .bind(&id)
        .bind(user_id)
        .bind(category)
        .bind(title)
        .bind(content)
        .execute(&mut *tx)
        .await?;

    replace_tags(&mut tx, &id, tags).await?;
    tx.commit().await?;

    get_board(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created board".to_string()))
}

pub async fn update_board(
    pool: &SqlitePool,
    id: &str,
    category: Option<&str>,
    title: Option<&str>,
    content: Option<&str>,
    tags: Option<&[String]>,
) -> Result<Option<Board>, AppError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE boards
        SET category = COALESCE(?, category),
            title = COALESCE(?, title),
            content = COALESCE(?, content),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(category)
    .bind(title)
    .bind(content)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    if let Some(tags) = tags {
        replace_tags(&mut tx, id, tags).await?;
    }
    tx.commit().await?;

    get_board(pool, id).await
}

async fn replace_tags(conn: &mut SqliteConnection, board_id: &str, tags: &[String]) -> Result<(), AppError> {
    sqlx::query("DELETE FROM board_tags WHERE board_id = ?")
        .bind(board_id)
        .execute(&mut *conn)
        .await?;

    for tag in tags {
        sqlx::query("INSERT OR IGNORE INTO board_tags (board_id, tag) VALUES (?, ?)")
            .bind(board_id)
            .bind(tag)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

pub async fn delete_board(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM boards WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 좋아요를 토글하고 `(좋아요 상태, 좋아요 수)`를 반환합니다.
pub async fn toggle_like(pool: &SqlitePool, board_id: &str, user_id: &str) -> Result<(bool, i64), AppError> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM board_likes WHERE board_id = ? AND user_id = ?")
        .bind(board_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
        > 0;

    if !removed {
        sqlx::query("INSERT INTO board_likes (board_id, user_id) VALUES (?, ?)")
            .bind(board_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM board_likes WHERE board_id = ?")
        .bind(board_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok((!removed, count))
}

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.board_id, c.user_id,
           COALESCE(u.nickname, u.username) AS author,
           c.content, c.created_at
    FROM comments c
    JOIN users u ON u.id = c.user_id
"#;

/// 댓글 목록 (작성순)
pub async fn list_comments(pool: &SqlitePool, board_id: &str) -> Result<Vec<Comment>, AppError> {
    let sql = format!("{} WHERE c.board_id = ? ORDER BY c.created_at ASC, c.id ASC", COMMENT_SELECT);
    let comments = sqlx::query_as::<_, Comment>(&sql)
        .bind(board_id)
        .fetch_all(pool)
        .await?;

    Ok(comments)
}

pub async fn get_comment(pool: &SqlitePool, id: &str) -> Result<Option<Comment>, AppError> {
    let sql = format!("{} WHERE c.id = ?", COMMENT_SELECT);
    let comment = sqlx::query_as::<_, Comment>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(comment)
}

pub async fn create_comment(
    pool: &SqlitePool,
    board_id: &str,
    user_id: &str,
    content: &str,
) -> Result<Comment, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query("INSERT INTO comments (id, board_id, user_id, content) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(board_id)
        .bind(user_id)
        .bind(content)
        .execute(pool)
        .await?;

    get_comment(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created comment".to_string()))
}

pub async fn delete_comment(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
