//! Municipality Mirror - Main Entry Point

use api::{init_logging, run_server, ServiceConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load()?;
    init_logging(&config)?;

    info!("=== Municipios API v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Upstream: {}", config.upstream_url);

    run_server(config).await
}
