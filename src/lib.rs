pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::split_scheme_list;
use crate::providers::amfi_provider::AmfiProvider;
use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

pub enum AppCommand {
    /// Comma separated list of scheme names to look up
    Nav { schemes: String },
    Returns {
        holdings_path: PathBuf,
        output_path: Option<PathBuf>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load_or_default()?,
    };
    debug!("Loaded config: {config:#?}");

    let feed_provider = AmfiProvider::from_config(&config.providers.amfi);

    match command {
        AppCommand::Nav { schemes } => {
            let schemes = split_scheme_list(&schemes)?;
            cli::nav::run(&schemes, &feed_provider).await
        }
        AppCommand::Returns {
            holdings_path,
            output_path,
        } => {
            cli::returns::run(
                &holdings_path,
                output_path.as_deref(),
                &feed_provider,
                &config.columns,
            )
            .await
        }
    }
}
