use clap::Parser;
use minesweeper_server::{config::Args, server};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Args::parse().into_config();
    info!("Starting Minesweeper server with {:?}", config);

    if let Err(e) = server::run(config).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server stopped");
    Ok(())
}
