//! tusk command-line uploader entry point.

mod app;
mod cli;
mod config;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{App, Commands};
use crate::config::Config;

fn main() -> anyhow::Result<()> {
    let args = App::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => config::config_path()?,
    };
    let config = Config::load(&config_path)?;

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        "configuration loaded"
    );

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        match args.cmd {
            Commands::Upload(upload) => app::upload(&config, upload).await,
            Commands::List => app::list(&config).await,
            Commands::Clear => app::clear(&config).await,
            Commands::Init => {
                config.save(&config_path)?;
                println!("{}", config_path.display());
                Ok(())
            }
        }
    })
}
