use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use mfnav::cli::export::DEFAULT_EXPORT_FILE;
use mfnav::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Look up the current NAV of schemes and print the results as JSON
    Nav {
        /// Comma separated scheme names, e.g. "SBI Bluechip Direct Growth, HDFC Top 100"
        schemes: String,
    },
    /// Compute CAGR and returns for the holdings in a CSV file
    Returns {
        /// CSV file with one investment per row
        holdings: PathBuf,
        /// Write the enriched rows to a CSV file
        #[arg(short, long, num_args = 0..=1, default_missing_value = DEFAULT_EXPORT_FILE)]
        output: Option<PathBuf>,
    },
}

impl From<Commands> for mfnav::AppCommand {
    fn from(cmd: Commands) -> mfnav::AppCommand {
        match cmd {
            Commands::Nav { schemes } => mfnav::AppCommand::Nav { schemes },
            Commands::Returns { holdings, output } => mfnav::AppCommand::Returns {
                holdings_path: holdings,
                output_path: output,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => mfnav::cli::setup::setup(),
        Some(cmd) => mfnav::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
