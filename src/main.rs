use anyhow::Context;

use sheet_analyst::config::ServiceConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load().context("failed to load configuration")?;
    sheet_analyst::init_tracing(&config).context("failed to initialize logging")?;

    sheet_analyst::run(config).await.context("server error")?;
    tracing::info!("shutdown complete");
    Ok(())
}
