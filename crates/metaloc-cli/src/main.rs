use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod check;
mod import;
mod search;

use search::SearchArgs;

#[derive(Debug, Parser)]
#[command(name = "metaloc")]
#[command(about = "MetaLocator bulk importer and location search client")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(
        long,
        global = true,
        env = "METALOC_CONFIG_PATH",
        default_value = metaloc_core::DEFAULT_CONFIG_PATH
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Upload locations from a CSV file to the bulk endpoint
    Import {
        /// CSV file to import (defaults to `csv_file` from the config)
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Records per request; values above 200 are capped
        #[arg(long)]
        batch_size: Option<usize>,
        /// Seconds to wait between batches
        #[arg(long)]
        delay: Option<f64>,
        /// Read and batch the CSV without sending anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Search the configured interface by postal code, radius and keyword
    Search(SearchArgs),
    /// Validate the configuration and the import CSV without network access
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = metaloc_core::load_app_config_from_env(&cli.config);
    let fallback_filter = config
        .as_ref()
        .map_or("info", metaloc_core::AppConfig::default_log_filter);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback_filter))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Import {
            csv,
            batch_size,
            delay,
            dry_run,
        } => {
            let config = config?;
            import::run_import(
                &config,
                &import::ImportOverrides {
                    csv,
                    batch_size,
                    delay,
                },
                dry_run,
            )
            .await?;
        }
        Commands::Search(args) => {
            let config = config?;
            search::run_search(&config, &args).await?;
        }
        Commands::Check => check::run_check(&cli.config, config)?,
    }

    Ok(())
}
