use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sqlal::{
    cmd::dry_run, config::AppConfig, paths::default_config_path, supervisor::Supervisor,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file. Defaults to the platform config
    /// directory.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the monitoring loop (default).
    Run,
    /// Evaluates every enabled query once and prints what would be sent.
    Check,
    /// Writes the default configuration file if none exists.
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_supervisor(config_path).await?,
        Commands::Check => dry_run::execute(&config_path).await?,
        Commands::Init => {
            if config_path.exists() {
                tracing::info!(path = %config_path.display(), "Configuration already exists.");
            } else {
                AppConfig::write_default(&config_path)?;
            }
        }
    }

    Ok(())
}

async fn run_supervisor(config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    if !config_path.exists() {
        AppConfig::write_default(&config_path)?;
        tracing::info!(
            path = %config_path.display(),
            "No configuration found. A default one was created; edit it and start again."
        );
        return Ok(());
    }

    tracing::debug!(path = %config_path.display(), "Loading application configuration...");
    let config = AppConfig::load(&config_path)?;
    tracing::info!(
        queries = config.queries.len(),
        enabled = config.enabled_queries().count(),
        "Configuration loaded."
    );

    let supervisor = Supervisor::builder().config(config).connect().await?.build()?;

    tracing::info!("Supervisor initialized, starting monitoring...");
    supervisor.run().await?;

    Ok(())
}
