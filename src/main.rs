use clap::Parser;
use tracing_subscriber::EnvFilter;

use proto_gather::cli::{run, Cli};

#[tokio::main]
async fn main() {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing for the CLI.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    let cli = Cli::parse();
    tracing::info!("CLI arguments parsed, invoking run");
    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "CLI exited with error");
        eprintln!("[ERROR] Assembly failed: {}", e);
        std::process::exit(1);
    }
    tracing::info!("CLI completed successfully");
}
