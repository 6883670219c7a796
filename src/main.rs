//! docbridge binary entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use docbridge::cli::{Cli, Commands};
use docbridge::config::BridgeConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = BridgeConfig::from_env();

    let result = match cli.command {
        Commands::Chat(args) => docbridge::cli::chat::run(&config, args).await,
        Commands::Serve(args) => {
            if let Some(port) = args.port {
                config = config.with_port(port);
            }
            docbridge::server::run(&config).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
