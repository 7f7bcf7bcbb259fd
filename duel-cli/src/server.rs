//! Server command - start the duel HTTP server
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: configure_server(), start_server()
//! - Level 3: (delegated to duel-server crate)
//! - Level 4: argument validation

use std::time::Duration;

use anyhow::Result;
use clap::Args;

use duel_engine::EngineConfig;
use duel_server::{run_server, ServerConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ServerArgs {
    /// IP address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port number to listen on
    #[arg(long, default_value = "8003")]
    pub port: u16,

    /// Seconds a queue entry may wait before it is evicted
    #[arg(long, default_value = "180")]
    pub queue_ttl_secs: u64,

    /// Elo K-factor
    #[arg(long, default_value = "32")]
    pub k_factor: f64,

    /// Upper bound on any single store call
    #[arg(long, default_value = "3000")]
    pub repository_timeout_ms: u64,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run server command
///
/// 1. Configure server and engine
/// 2. Start server (blocking)
pub fn run(args: ServerArgs) -> Result<()> {
    let (config, engine_config) = configure_server(&args)?;

    tracing::info!(
        host = %config.host,
        port = config.port,
        k_factor = engine_config.k_factor,
        "Starting duel server"
    );

    start_server(config, engine_config)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Build server and engine configuration from command arguments
fn configure_server(args: &ServerArgs) -> Result<(ServerConfig, EngineConfig)> {
    validate_args(args)?;

    let config = ServerConfig {
        host: args.host.clone(),
        port: args.port,
    };
    config.addr()?;

    let ttl = ttl_from_secs(args.queue_ttl_secs)?;
    let defaults = EngineConfig::default();
    // A ttl shorter than the fresh window makes the window moot
    let fresh = ttl.min(defaults.fresh_window);
    let engine_config = defaults
        .with_queue_ttl(ttl)
        .with_fresh_window(fresh)
        .with_k_factor(args.k_factor)
        .with_repository_timeout(Duration::from_millis(args.repository_timeout_ms));

    Ok((config, engine_config))
}

/// Start the server (blocking)
fn start_server(config: ServerConfig, engine_config: EngineConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async { run_server(config, engine_config).await })
}

// ============================================================================
// LEVEL 4 - VALIDATION
// ============================================================================

fn validate_args(args: &ServerArgs) -> Result<()> {
    if !args.k_factor.is_finite() || args.k_factor <= 0.0 {
        anyhow::bail!("--k-factor must be a positive number, got {}", args.k_factor);
    }
    if args.queue_ttl_secs == 0 {
        anyhow::bail!("--queue-ttl-secs must be at least 1");
    }
    if args.repository_timeout_ms == 0 {
        anyhow::bail!("--repository-timeout-ms must be at least 1");
    }
    Ok(())
}

fn ttl_from_secs(secs: u64) -> Result<chrono::Duration> {
    let secs = i64::try_from(secs).map_err(|_| anyhow::anyhow!("--queue-ttl-secs is too large"))?;
    chrono::Duration::try_seconds(secs)
        .ok_or_else(|| anyhow::anyhow!("--queue-ttl-secs is too large"))
}

// ============================================================================
// TESTS
// ============================================================================
