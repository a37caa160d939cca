use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use queue_cli::cli::Cli;
use queue_cli::commands;
use queue_cli::types::Environment;
use queue_facade::QueueFacade;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let environment = Environment::from_env();

    // Logs go to stderr so stdout only carries command output.
    // Use JSON format for staging/production, regular format for development
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.default_log_filter()));
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    info!("Running queue-cli in {:?} environment", environment);

    let (queue_service, credentials) = environment.queue_service().await?;
    let facade = QueueFacade::new(Arc::new(queue_service), Arc::new(credentials))
    .with_receive_options(environment.receive_options());

    match commands::run(&facade, cli.command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {}", e);
            Err(e)
        }
    }
}
