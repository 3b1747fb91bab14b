use std::sync::Arc;

use anyhow::Context;

use chainverify_api::app::{self, services};
use chainverify_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    chainverify_observability::init(config.log_format);

    let services = services::build_services(&config.backend)
        .await
        .with_context(|| format!("failed to open {} backend", config.backend.kind()))?;
    services::spawn_event_logger(&services).context("failed to start event logger")?;

    let app = app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        backend = config.backend.kind(),
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
