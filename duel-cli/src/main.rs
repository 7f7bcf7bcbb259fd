//! Duel CLI - Command-line interface
//!
//! Commands:
//! - serve: Start the duel HTTP server
//! - resolve: Resolve one duel and print its log
//! - simulate: Sweep a seed range and summarize outcomes
//! - rate: Apply one Elo update

mod hero_args;
mod rate;
mod resolve_cmd;
mod server;
mod simulate;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "duel")]
#[command(about = "Seeded duel resolver, matchmaking server and rating tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve(server::ServerArgs),
    /// Resolve one duel
    Resolve(resolve_cmd::ResolveArgs),
    /// Resolve many duels over consecutive seeds
    Simulate(simulate::SimulateArgs),
    /// Apply one rating update
    Rate(rate::RateArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => server::run(args),
        Commands::Resolve(args) => resolve_cmd::run(args),
        Commands::Simulate(args) => simulate::run(args),
        Commands::Rate(args) => rate::run(args),
    }
}
