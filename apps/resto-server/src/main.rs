//! # Resto Server Entry Point
//!
//! Configuration comes from `RESTO_*` environment variables; see
//! [`resto_server::config`].

use resto_server::{init_tracing, serve, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Resto POS server");

    let config = ServerConfig::load()?;
    info!(
        bind_addr = %config.bind_addr,
        restaurant_id = %config.restaurant_id,
        "Configuration loaded"
    );

    serve(config).await
}
