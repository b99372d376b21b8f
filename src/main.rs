//! # Smartrip 웹 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 데이터베이스 연결 풀 생성
//! 4. 데이터베이스 마이그레이션 실행
//! 5. Tour API 클라이언트와 애플리케이션 상태 생성
//! 6. API 라우터 + 정적 파일 서빙 설정
//! 7. HTTP 서버 시작

mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;

use std::{path::Path, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use config::Config;
use routes::AppState;
use services::tour::TourClient;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅 초기화 ──
    // RUST_LOG가 없으면 smartrip, tower_http, axum을 debug 레벨로
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smartrip=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env().context("DATABASE_URL and JWT_SECRET must be set")?;
    tracing::info!("Starting Smartrip server on {}:{}", config.host, config.port);

    // ── 4단계: SQLite 연결 풀 생성 ──
    // SQLite는 외래키 검사가 연결마다 꺼져 있으므로 옵션으로 켭니다 (ON DELETE CASCADE에 필요)
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect_with(options)
        .await?;

    // ── 5단계: 마이그레이션 ──
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // ── 6단계: 애플리케이션 상태 ──
    let tour = TourClient::new(
        &config.tour_api_base_url,
        config.tour_api_key.clone(),
        Duration::from_secs(config.tour_api_timeout_secs),
    )?;
    if !tour.is_configured() {
        tracing::warn!("TOUR_API_KEY is not set; /api/v1/tour routes will answer 503");
    }

    let state = AppState {
        pool: pool.clone(),
        jwt_secret: config.jwt_secret.clone(),
        tour,
    };

    // ── 7단계: 라우터 ──
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new().nest("/api/v1", routes::api_router(state));

    // 빌드된 프론트엔드가 있으면 같은 서버에서 서빙합니다.
    // SPA이므로 찾을 수 없는 경로는 index.html로 돌려보냅니다.
    match config.static_dir.as_deref().map(Path::new) {
        Some(dir) if dir.exists() => {
            tracing::info!("Serving frontend static files from {}", dir.display());
            let serve_dir = ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html")));
            app = app.fallback_service(serve_dir);
        }
        Some(dir) => {
            tracing::warn!("Static directory {} not found, serving API only", dir.display());
        }
        None => {}
    }

    let app = app.layer(cors).layer(TraceLayer::new_for_http());

    // ── 8단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
