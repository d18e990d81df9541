use crate::models::{
    notification::Notification,
    websocket::*,
};
use axum::extract::ws::{Message, WebSocket};
use chrono::{DateTime, Utc};
use futures::{sink::SinkExt, stream::StreamExt};
use parking_lot::RwLock;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// 单个连接的发送端，推送已序列化的 JSON 帧
pub type ConnectionSender = mpsc::UnboundedSender<String>;

/// WebSocket连接管理器
/// 维护 身份 -> 连接集合 的映射，并负责定向投递与广播
#[derive(Clone, Default)]
pub struct WebSocketService {
    state: Arc<RwLock<RegistryState>>,
}

/// 注册表状态，整体由一把锁保护
/// 注册与注销各自在一次写锁内完成
#[derive(Default)]
struct RegistryState {
    // 连接管理
    connections: HashMap<ConnectionId, ConnectionInfo>,
    // 用户到连接的映射，集合为空时条目被移除
    user_connections: HashMap<Identity, HashSet<ConnectionId>>,
    // 定向投递分组 user:{id}
    groups: HashMap<String, HashSet<ConnectionId>>,
}

/// 连接信息
#[derive(Debug, Clone)]
struct ConnectionInfo {
    identity: Identity,
    tx: ConnectionSender,
    connected_at: DateTime<Utc>,
}

impl WebSocketService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 处理新的WebSocket连接，直到传输层报告断开
    pub async fn handle_connection(&self, websocket: WebSocket, identity: Identity) {
        let (mut ws_tx, mut ws_rx) = websocket.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let connection_id = self.register(identity.clone(), tx.clone());
        info!("User connected: {} (connection: {})", identity, connection_id);

        // 发送连接确认消息
        let connected = ServerEvent::Connected {
            connection_id,
            user_id: identity.clone(),
        };
        if let Some(frame) = encode_event(&connected) {
            if tx.send(frame).is_err() {
                error!("Failed to queue connect message for {}", connection_id);
            }
        }
        drop(tx);

        // 处理发送消息任务
        let mut send_task = tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                if let Err(e) = ws_tx.send(Message::Text(frame)).await {
                    debug!("Failed to send WebSocket message to {}: {}", connection_id, e);
                    break;
                }
            }
        });

        // 处理接收消息任务，客户端消息不携带命令
        let mut receive_task = tokio::spawn(async move {
            while let Some(msg_result) = ws_rx.next().await {
                match msg_result {
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        debug!("WebSocket error for connection {}: {}", connection_id, e);
                        break;
                    }
                }
            }
        });

        tokio::select! {
            _ = &mut send_task => receive_task.abort(),
            _ = &mut receive_task => send_task.abort(),
        }

        // 清理连接
        self.unregister(connection_id);
        info!("User disconnected: {} (connection: {})", identity, connection_id);
    }

    /// 注册新连接并加入该身份的投递分组
    pub fn register(&self, identity: Identity, tx: ConnectionSender) -> ConnectionId {
        let connection_id = Uuid::new_v4();
        let group = identity.group_name();

        let mut state = self.state.write();
        state.connections.insert(
            connection_id,
            ConnectionInfo {
                identity: identity.clone(),
                tx,
                connected_at: Utc::now(),
            },
        );
        state
            .user_connections
            .entry(identity.clone())
            .or_default()
            .insert(connection_id);
        state.groups.entry(group).or_default().insert(connection_id);

        debug!("Registered connection: {} for user: {}", connection_id, identity);
        connection_id
    }

    /// 注销连接，返回其所属身份
    /// 身份的连接集合变空时整个条目被移除
    pub fn unregister(&self, connection_id: ConnectionId) -> Option<Identity> {
        let mut state = self.state.write();
        let info = state.connections.remove(&connection_id)?;

        if let Some(user_conns) = state.user_connections.get_mut(&info.identity) {
            user_conns.remove(&connection_id);
            if user_conns.is_empty() {
                state.user_connections.remove(&info.identity);
            }
        }

        let group = info.identity.group_name();
        if let Some(members) = state.groups.get_mut(&group) {
            members.remove(&connection_id);
            if members.is_empty() {
                state.groups.remove(&group);
            }
        }

        debug!(
            "Unregistered connection: {} for user: {} (connected for {}s)",
            connection_id,
            info.identity,
            (Utc::now() - info.connected_at).num_seconds()
        );
        Some(info.identity)
    }

    /// 定向投递：推送到该身份分组内的所有连接
    /// 没有在线连接时静默返回 0，不排队
    pub fn notify_user(&self, user_id: &str, notification: &Notification) -> usize {
        let Some(frame) = encode_event(&ServerEvent::Notification(notification.clone())) else {
            return 0;
        };

        let group = Identity::new(user_id).group_name();
        let state = self.state.read();
        let delivered = match state.groups.get(&group) {
            Some(members) => members
                .iter()
                .filter_map(|id| state.connections.get(id))
                .filter(|conn| conn.tx.send(frame.clone()).is_ok())
                .count(),
            None => 0,
        };

        debug!(
            "Notification {} delivered to {} connection(s) of user {}",
            notification.id, delivered, user_id
        );
        delivered
    }

    /// 广播：推送到当前所有连接，包括匿名连接
    pub fn notify_all(&self, notification: &Notification) -> usize {
        let Some(frame) = encode_event(&ServerEvent::Notification(notification.clone())) else {
            return 0;
        };

        let state = self.state.read();
        let delivered = state
            .connections
            .values()
            .filter(|conn| conn.tx.send(frame.clone()).is_ok())
            .count();

        debug!(
            "Notification {} broadcast to {} of {} connection(s)",
            notification.id,
            delivered,
            state.connections.len()
        );
        delivered
    }

    /// 某身份当前的连接集合，无条目时返回 None
    pub fn connections_of(&self, user_id: &str) -> Option<HashSet<ConnectionId>> {
        self.state
            .read()
            .user_connections
            .get(&Identity::new(user_id))
            .cloned()
    }

    /// 获取在线统计
    pub fn get_stats(&self) -> RealtimeStats {
        let state = self.state.read();
        RealtimeStats {
            total_connections: state.connections.len(),
            active_users: state.user_connections.len(),
        }
    }

    /// 获取用户在线状态
    pub fn get_user_online_status(&self, user_id: &str) -> OnlineStatus {
        let active_connections = self
            .state
            .read()
            .user_connections
            .get(&Identity::new(user_id))
            .map(HashSet::len)
            .unwrap_or(0);

        OnlineStatus {
            user_id: user_id.to_string(),
            is_online: active_connections > 0,
            active_connections,
        }
    }
}

fn encode_event(event: &ServerEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(frame) => Some(frame),
        Err(e) => {
            error!("Failed to serialize message: {}", e);
            None
        }
    }
}
