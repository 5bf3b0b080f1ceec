//! Kingdoms - Dedicated Server

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kingdoms_server::{ServerConfig, ServerError};

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "kingdoms_server", about = "Kingdoms dedicated game server")]
struct Cli {
    /// Path to a RON server configuration file.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Port override.
    #[arg(long)]
    port: Option<u16>,

    /// World seed override.
    #[arg(long)]
    seed: Option<u64>,
}

fn load_config(cli: &Cli) -> Result<ServerConfig, ServerError> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| ServerError::Config {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            ron::from_str(&text).map_err(|e| ServerError::Config {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        }
        None => ServerConfig::default(),
    };

    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(seed) = cli.seed {
        config.game.seed = seed;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Kingdoms Dedicated Server");

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    kingdoms_server::run(config).await
}
