pub mod extract;
pub mod notify;
pub mod webhook;
pub mod websocket;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::{AppError, Result},
    state::AppState,
};

/// 构建应用路由
pub fn build_router(app_state: Arc<AppState>) -> Result<Router> {
    // 配置 CORS，仅允许前端来源并携带凭证
    let origin = app_state
        .config
        .frontend_url
        .parse::<HeaderValue>()
        .map_err(|e| AppError::Configuration(format!("Invalid FRONTEND_URL: {}", e)))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/notify", get(notify::send_test_notification))
        .nest("/api/notify", notify::router())
        .merge(webhook::router())
        .merge(websocket::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Ok(app)
}

async fn health_check() -> &'static str {
    "Notification relay is running!"
}
