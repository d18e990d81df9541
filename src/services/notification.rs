use crate::{
    error::{AppError, Result},
    models::notification::*,
    services::websocket::WebSocketService,
};
use serde_json::json;
use tracing::{debug, info};

const GENERIC_TITLE: &str = "Nueva notificación";
const GENERIC_MESSAGE: &str = "Tienes una nueva notificación";
const MISSING_FIELD: &str = "undefined";

/// 通知服务
/// 由调用方字段构造完整通知后交给实时通道投递
#[derive(Clone)]
pub struct NotificationService {
    websocket_service: WebSocketService,
}

/// 按通知类型渲染出的标题与正文
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationTemplate {
    pub title: String,
    pub message: String,
}

impl NotificationTemplate {
    /// 内容类通知必须携带非 null 的 data，其余类型使用通用模板
    /// data 中缺失的 title 或 author 渲染为 undefined
    pub fn render(
        notification_type: &NotificationType,
        data: Option<&NotificationData>,
    ) -> Result<Self> {
        let (title, subject) = match notification_type {
            NotificationType::NewBook => ("Nuevo libro disponible", "El libro"),
            NotificationType::NewMagazine => ("Nueva revista disponible", "La revista"),
            NotificationType::NewArticle => ("Nuevo artículo disponible", "El artículo"),
            _ => return Ok(Self::generic()),
        };

        let data = data
            .filter(|data| !data.is_null())
            .ok_or_else(|| AppError::Internal(format!("{} notification requires a data payload", notification_type)))?;
        let work_title = data
            .field_text("title")
            .unwrap_or_else(|| MISSING_FIELD.to_string());
        let author = data
            .field_text("author")
            .unwrap_or_else(|| MISSING_FIELD.to_string());

        Ok(Self {
            title: title.to_string(),
            message: format!("{} \"{}\" de {} ya está disponible", subject, work_title, author),
        })
    }

    pub fn generic() -> Self {
        Self {
            title: GENERIC_TITLE.to_string(),
            message: GENERIC_MESSAGE.to_string(),
        }
    }
}

impl NotificationService {
    pub fn new(websocket_service: WebSocketService) -> Self {
        Self { websocket_service }
    }

    /// 由部分字段构造通知
    /// 缺失的标题或正文按类型模板补全，模板无法渲染时退回通用模板
    pub fn build_from_draft(draft: NotificationDraft) -> Notification {
        let notification_type = draft.notification_type.unwrap_or_default();

        let (title, message) = match (draft.title, draft.message) {
            (Some(title), Some(message)) => (title, message),
            (title, message) => {
                let template = NotificationTemplate::render(&notification_type, draft.data.as_ref())
                    .unwrap_or_else(|e| {
                        debug!("Falling back to generic template: {}", e);
                        NotificationTemplate::generic()
                    });
                (
                    title.unwrap_or(template.title),
                    message.unwrap_or(template.message),
                )
            }
        };

        Notification::new(notification_type, title, message, draft.data)
    }

    /// 由 webhook 请求构造通知
    pub fn build_from_webhook(request: WebhookNotificationRequest) -> Result<Notification> {
        let notification_type = request.notification_type.unwrap_or_default();
        let template = NotificationTemplate::render(&notification_type, request.data.as_ref())?;

        Ok(Notification::new(
            notification_type,
            template.title,
            template.message,
            request.data,
        ))
    }

    /// 固定内容的测试通知
    pub fn test_notification() -> Notification {
        Notification::new(
            NotificationType::System,
            "Notificación de prueba",
            "Esta es una notificación de prueba",
            Some(NotificationData(json!({ "foo": "bar" }))),
        )
    }

    /// 定向发送给单个用户
    pub fn notify_user(&self, user_id: &str, draft: NotificationDraft) -> Notification {
        let notification = Self::build_from_draft(draft);
        let delivered = self.websocket_service.notify_user(user_id, &notification);
        info!(
            "Notification {} sent to user {} ({} connection(s))",
            notification.id, user_id, delivered
        );
        notification
    }

    /// 广播给所有连接
    pub fn notify_all(&self, draft: NotificationDraft) -> Notification {
        let notification = Self::build_from_draft(draft);
        self.broadcast(&notification);
        notification
    }

    pub fn send_test_notification(&self) -> Notification {
        let notification = Self::test_notification();
        self.broadcast(&notification);
        notification
    }

    /// 处理 webhook 通知，结果始终广播
    pub fn process_webhook(&self, request: WebhookNotificationRequest) -> Result<Notification> {
        if let Some(target_users) = &request.target_users {
            debug!(
                "Webhook targetUsers ({} user(s)) ignored, broadcasting to all connections",
                target_users.len()
            );
        }

        let notification = Self::build_from_webhook(request)?;
        self.broadcast(&notification);
        Ok(notification)
    }

    fn broadcast(&self, notification: &Notification) {
        let delivered = self.websocket_service.notify_all(notification);
        info!(
            "Notification {} ({}) broadcast to {} connection(s)",
            notification.id, notification.notification_type, delivered
        );
    }
}
