//! CLI command implementations

use clap::Subcommand;
use corpscope_core::{CorpscopeConfig, RegistryIndex};
use corpscope_web::run_server;
use serde_json::json;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Port to bind, overrides the PORT environment variable
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Resolve a company name against the registry dataset
    Lookup {
        /// Company name, matched after suffix and whitespace normalization
        name: String,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve { port } => serve(port).await,
        Commands::Lookup { name } => lookup(&name),
    }
}

/// Start the API server with environment-derived configuration.
async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = CorpscopeConfig::from_env();
    if let Some(port) = port {
        config.server.port = port;
    }

    run_server(config)
        .await
        .map_err(|e| anyhow::anyhow!("server failed: {e}"))
}

/// Resolve one name against the dataset and print the result as JSON.
fn lookup(name: &str) -> anyhow::Result<()> {
    let config = CorpscopeConfig::from_env();
    let registry = RegistryIndex::load(&config.registry.dataset_path);

    let result = match registry.lookup(name) {
        Some(entry) => json!({
            "status": "000",
            "corp_code": entry.code,
            "corp_name": entry.original_name,
        }),
        None => json!({
            "status": "404",
            "message": "일치하는 기업을 찾을 수 없습니다.",
        }),
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
