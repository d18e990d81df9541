use axum::{
    extract::{Path, State},
    response::Json,
    routing::post,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use super::extract::JsonBody;
use crate::{models::notification::NotificationDraft, state::AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/:user_id", post(notify_user))
        .route("/all", post(notify_all))
}

/// 定向通知单个用户
async fn notify_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    JsonBody(draft): JsonBody<NotificationDraft>,
) -> Json<Value> {
    debug!("Notify request for user: {}", user_id);

    let notification = state.notification_service.notify_user(&user_id, draft);

    Json(json!({
        "success": true,
        "notification": notification
    }))
}

/// 广播通知
async fn notify_all(
    State(state): State<Arc<AppState>>,
    JsonBody(draft): JsonBody<NotificationDraft>,
) -> Json<Value> {
    let notification = state.notification_service.notify_all(draft);

    Json(json!({
        "success": true,
        "notification": notification
    }))
}

/// 广播固定内容的测试通知
pub async fn send_test_notification(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.notification_service.send_test_notification();

    Json(json!({ "success": true }))
}
