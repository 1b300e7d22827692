//! Roomcast relay server.
//!
//! Reads `ROOMCAST_BIND` and `ROOMCAST_IDLE_TIMEOUT_SECS` from the
//! environment and logs according to `RUST_LOG` (default `info`).

use roomcast::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), RoomcastError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        bind = %config.bind_addr,
        idle_timeout_secs = config.idle_timeout.as_secs(),
        "starting relay"
    );

    let server = RoomcastServer::builder().config(config).build().await?;
    server.run().await
}
