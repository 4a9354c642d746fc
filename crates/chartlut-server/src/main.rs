//! Chartlut Server — WebSocket front end for LUT synthesis.
//!
//! Accepts `GenerateLut` and `ApplyLut` JSON requests (see `ipc`) and answers
//! each with a `.cube` file, a corrected PNG, or an error.

mod config;
mod handlers;
mod ipc;
mod ws_bridge;

use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::default();
    tracing::info!(?config, "starting chartlut server");

    if let Err(e) = ws_bridge::serve(config).await {
        tracing::error!("server stopped: {e}");
        std::process::exit(1);
    }
}
