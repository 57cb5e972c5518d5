//! Corpscope CLI - Command-line interface
//!
//! Provides command-line access to the Corpscope server and registry.

mod commands;

use clap::Parser;
use corpscope_core::tracing_setup::init_tracing;

#[derive(Parser)]
#[command(name = "corpscope")]
#[command(about = "Company research aggregator")]
struct Cli {
    /// Console log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Environment file is optional; real env vars win either way
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_level, None)?;

    commands::handle_command(cli.command).await?;

    Ok(())
}
