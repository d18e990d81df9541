use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::notification::Notification;

/// 单个实时连接的唯一标识
pub type ConnectionId = Uuid;

/// 未携带身份 Cookie 的连接所使用的身份
pub const ANONYMOUS_IDENTITY: &str = "anonymous";

/// 握手时解析出的用户身份
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self(user_id.into())
    }

    pub fn anonymous() -> Self {
        Self(ANONYMOUS_IDENTITY.to_string())
    }

    /// 从 Cookie 值解析身份，缺失或为空时退化为匿名
    pub fn from_cookie_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(user_id) if !user_id.is_empty() => Self::new(user_id),
            _ => Self::anonymous(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_IDENTITY
    }

    /// 定向投递使用的逻辑分组名
    pub fn group_name(&self) -> String {
        format!("user:{}", self.0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 服务端推送给客户端的帧
/// 线上格式: {"event": "...", "data": {...}}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    Connected {
        connection_id: ConnectionId,
        user_id: Identity,
    },
    Notification(Notification),
}

/// 实时连接统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeStats {
    pub total_connections: usize,
    pub active_users: usize,
}

/// 在线状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineStatus {
    pub user_id: String,
    pub is_online: bool,
    pub active_connections: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::NotificationType;

    #[test]
    fn test_identity_from_cookie_value() {
        assert_eq!(Identity::from_cookie_value(Some("u1")), Identity::new("u1"));
        assert!(Identity::from_cookie_value(None).is_anonymous());
        assert!(Identity::from_cookie_value(Some("")).is_anonymous());
        assert!(Identity::from_cookie_value(Some("   ")).is_anonymous());
        assert_eq!(Identity::new("u1").group_name(), "user:u1");
    }

    #[test]
    fn test_server_event_frames() {
        let connection_id = Uuid::new_v4();
        let connected = serde_json::to_value(ServerEvent::Connected {
            connection_id,
            user_id: Identity::new("u1"),
        })
        .unwrap();

        assert_eq!(connected["event"], "connected");
        assert_eq!(connected["data"]["userId"], "u1");
        assert_eq!(connected["data"]["connectionId"], connection_id.to_string());

        let notification = Notification::new(NotificationType::System, "t", "m", None);
        let frame = serde_json::to_value(ServerEvent::Notification(notification.clone())).unwrap();

        assert_eq!(frame["event"], "notification");
        assert_eq!(frame["data"]["id"], notification.id.to_string());
        assert_eq!(frame["data"]["type"], "SYSTEM");
    }
}
