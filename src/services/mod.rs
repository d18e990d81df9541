pub mod email;
pub mod notification;
pub mod websocket;

// 重新导出常用类型
pub use email::EmailService;
pub use notification::NotificationService;
pub use websocket::WebSocketService;
