use anyhow::Result;
use assignme::{core::ConfigManager, start_web_server};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "assignme")]
#[command(about = "CV analysis and job matching API")]
struct Cli {
    /// Overrides PORT / ROCKET_PORT and the config file
    #[arg(long)]
    port: Option<u16>,

    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging first
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(true),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("assignme=info,rocket::server=off")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ConfigManager::load(&cli.config)?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    info!("Server: http://0.0.0.0:{}", config.port);

    start_web_server(config).await
}
