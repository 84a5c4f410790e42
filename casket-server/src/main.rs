mod config;
mod server;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crate::config::Config;
use crate::server::run_server;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "casket")]
#[command(about = "Content-addressed blob storage over HTTP")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Server {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.yaml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "casket=info,casket_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server { config } => {
            tracing::info!("Starting Casket server with config: {}", config);

            let cfg = Config::from_file(&config)
                .with_context(|| format!("failed to load config from {}", config))?;

            tracing::info!(
                "Bind: {}, Root: {:?}, Algorithm: {}, Sync: {}",
                cfg.server.bind_addr,
                cfg.storage.root,
                cfg.storage.algorithm.name(),
                cfg.storage.sync
            );

            run_server(cfg).await.context("server error")?;
        }
    }

    Ok(())
}
