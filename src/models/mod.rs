pub mod notification;
pub mod websocket;
