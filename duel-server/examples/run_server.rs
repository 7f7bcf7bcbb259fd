//! Example to run the duel server standalone
//!
//! Run with: cargo run -p duel-server --example run_server

use duel_engine::EngineConfig;
use duel_server::{run_server, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::default();

    println!("Starting duel server on {}:{}", config.host, config.port);
    println!("Try: curl http://localhost:{}/api/status", config.port);

    run_server(config, EngineConfig::default()).await
}
