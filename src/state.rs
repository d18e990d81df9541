use crate::{
    config::Config,
    error::Result,
    services::{EmailService, NotificationService, WebSocketService},
};

/// 应用程序的共享状态
/// 进程启动时构造一次，通过 State 注入到各个处理器
#[derive(Clone)]
pub struct AppState {
    /// 应用配置
    pub config: Config,

    /// 连接注册表与实时通道
    pub websocket_service: WebSocketService,

    /// 通知服务
    pub notification_service: NotificationService,

    /// 邮件服务
    pub email_service: EmailService,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let websocket_service = WebSocketService::new();
        let notification_service = NotificationService::new(websocket_service.clone());
        let email_service = EmailService::new(&config)?;

        Ok(Self {
            config,
            websocket_service,
            notification_service,
            email_service,
        })
    }
}
