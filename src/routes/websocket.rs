use axum::{
    extract::{ws::WebSocketUpgrade, Path, State},
    headers::Cookie,
    response::{Json, Response},
    routing::get,
    Router, TypedHeader,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{models::websocket::Identity, state::AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        // WebSocket连接端点
        .route("/ws", get(websocket_handler))

        // 在线状态与统计
        .route("/api/realtime/stats", get(get_realtime_stats))
        .route("/api/realtime/status/:user_id", get(get_user_status))
}

/// WebSocket连接处理器
/// 握手 Cookie 中没有身份时以匿名身份接入，不拒绝连接
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    cookies: Option<TypedHeader<Cookie>>,
) -> Response {
    let cookie_value = cookies
        .as_ref()
        .and_then(|TypedHeader(cookie)| cookie.get(&state.config.identity_cookie));
    let identity = Identity::from_cookie_value(cookie_value);

    if identity.is_anonymous() {
        warn!(
            "No '{}' cookie in handshake, connecting as {}",
            state.config.identity_cookie, identity
        );
    } else {
        info!("WebSocket upgrade request from user: {}", identity);
    }

    ws.on_upgrade(move |socket| async move {
        state.websocket_service.handle_connection(socket, identity).await;
    })
}

/// 获取实时连接统计
async fn get_realtime_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let stats = state.websocket_service.get_stats();
    debug!("Realtime stats: {:?}", stats);

    Json(serde_json::json!({
        "success": true,
        "data": stats
    }))
}

/// 获取用户在线状态
async fn get_user_status(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<serde_json::Value> {
    debug!("Getting online status for user: {}", user_id);

    let status = state.websocket_service.get_user_online_status(&user_id);

    Json(serde_json::json!({
        "success": true,
        "data": status
    }))
}
