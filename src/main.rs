use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracing::info;

use notify_relay::{build_router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting notification relay ({})...", config.environment);

    if config.admin_email.is_none() {
        info!("ADMIN_EMAIL not set, new-user webhook will answer 400");
    }

    let addr: SocketAddr = config.bind_address().parse()?;
    let app_state = Arc::new(AppState::new(config)?);
    let app = build_router(app_state)?;

    info!("WebSocket server listening on http://{}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
