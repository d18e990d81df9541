use serde::{Deserialize, Deserializer, Serialize};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// 推送给客户端的通知
/// id 与 created_at 只在服务端构造时分配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "present_data", skip_serializing_if = "Option::is_none")]
    pub data: Option<NotificationData>,
}

impl Notification {
    pub fn new(
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
        data: Option<NotificationData>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            notification_type,
            title: title.into(),
            message: message.into(),
            read: false,
            created_at: Utc::now(),
            data,
        }
    }
}

/// 通知类型
/// 未识别的标签原样保留在 Other 中，非字符串标签按其 JSON 文本保留
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub enum NotificationType {
    NewUser,
    NewBook,
    NewMagazine,
    NewArticle,
    #[default]
    System,
    Other(String),
}

impl NotificationType {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationType::NewUser => "NEW_USER",
            NotificationType::NewBook => "NEW_BOOK",
            NotificationType::NewMagazine => "NEW_MAGAZINE",
            NotificationType::NewArticle => "NEW_ARTICLE",
            NotificationType::System => "SYSTEM",
            NotificationType::Other(tag) => tag,
        }
    }
}

impl From<String> for NotificationType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "NEW_USER" => NotificationType::NewUser,
            "NEW_BOOK" => NotificationType::NewBook,
            "NEW_MAGAZINE" => NotificationType::NewMagazine,
            "NEW_ARTICLE" => NotificationType::NewArticle,
            "SYSTEM" => NotificationType::System,
            _ => NotificationType::Other(tag),
        }
    }
}

impl From<Value> for NotificationType {
    fn from(value: Value) -> Self {
        match value {
            Value::String(tag) => tag.into(),
            other => NotificationType::Other(other.to_string()),
        }
    }
}

impl From<NotificationType> for String {
    fn from(notification_type: NotificationType) -> Self {
        match notification_type {
            NotificationType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 调用方附带的不透明负载，原样透传
/// 显式的 null 也保留为 Some(NotificationData(Value::Null))
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationData(pub Value);

impl NotificationData {
    /// 读取字段的文本形式，字符串不带引号
    /// 非对象负载或缺失字段返回 None
    pub fn field_text(&self, key: &str) -> Option<String> {
        match self.0.as_object()?.get(key)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl From<Value> for NotificationData {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// 字段出现即保留，包括 null
fn present_data<'de, D>(deserializer: D) -> Result<Option<NotificationData>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| Some(NotificationData(value)))
}

/// 调用方提交的部分通知字段
/// id、read、createdAt 即使提供也会被忽略
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationDraft {
    #[serde(rename = "type", default)]
    pub notification_type: Option<NotificationType>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "present_data")]
    pub data: Option<NotificationData>,
}

/// Webhook 通知请求
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookNotificationRequest {
    #[serde(rename = "type", default)]
    pub notification_type: Option<NotificationType>,
    #[serde(default, deserialize_with = "present_data")]
    pub data: Option<NotificationData>,
    #[serde(default)]
    pub target_users: Option<Vec<String>>,
}
