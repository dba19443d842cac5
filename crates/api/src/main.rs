use anyhow::Context;

use bazaar_api::app::{AppInfo, build_app};
use bazaar_api::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bazaar_observability::init();

    let config = ServerConfig::from_env().context("invalid server configuration")?;
    let app = build_app(AppInfo::new(config.service_name.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        service = %config.service_name,
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
