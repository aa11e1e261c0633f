//! tutorchat - course tutor chat
//!
#![doc = "Main entry point for the tutorchat application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tutorchat::cli::{Cli, Commands};
use tutorchat::commands;
use tutorchat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { model } => {
            if let Some(m) = &model {
                tracing::debug!("Using model override: {}", m);
            }
            commands::chat::run_chat(config, model).await?;
            Ok(())
        }
        Commands::Ask { prompt, model } => {
            commands::ask::run_ask(config, prompt, model).await?;
            Ok(())
        }
        Commands::Models { json } => {
            let active = config.default_model_id()?;
            commands::models::list_models(json, Some(active))?;
            Ok(())
        }
        Commands::Serve { .. } => {
            tracing::info!("Starting HTTP server");
            commands::serve::run_serve(config).await?;
            Ok(())
        }
        Commands::Auth { key } => {
            commands::auth::store_api_key(&key)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so streamed replies on stdout stay clean.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "tutorchat=debug"
    } else {
        "tutorchat=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
