use axum::{
    extract::State,
    response::Json,
    routing::post,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::extract::JsonBody;
use crate::{
    error::Result,
    models::notification::WebhookNotificationRequest,
    state::AppState,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/webhook/new-user", post(new_user_webhook))
        .route("/api/webhook-notification", post(notification_webhook))
}

/// 新用户注册：给管理员发送邮件
async fn new_user_webhook(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let sent = state.email_service.send_new_user_alert().await?;
    info!("New user alert email sent: {}", sent.id);

    Ok(Json(json!({
        "success": true,
        "message": "Correo enviado con éxito"
    })))
}

/// 通用通知 webhook，按类型套用模板后广播
/// 请求体结构错误或模板无法渲染时返回 500
async fn notification_webhook(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<WebhookNotificationRequest>,
) -> Result<Json<Value>> {
    debug!("Webhook notification request: {:?}", request);

    let notification = state.notification_service.process_webhook(request)?;

    Ok(Json(json!({
        "success": true,
        "message": "Notificación enviada con éxito",
        "payload": notification
    })))
}
