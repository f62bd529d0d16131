//! Meeting Workbook Crawler CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use apostila::{
    error::Result,
    models::Config,
    pipeline::{self, RunStatus},
    storage::{LocalStorage, ScheduleStorage},
    utils::http::HttpSource,
};
use clap::{Parser, Subcommand};

/// apostila - Meeting Workbook Crawler
#[derive(Parser, Debug)]
#[command(
    name = "apostila",
    version,
    about = "Extracts the weekly meeting schedule from the yearly workbook index"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the year index and save the schedule
    Crawl {
        /// Output file (default: output.path from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Year index URL (default: site.index_url from config)
        #[arg(long)]
        index_url: Option<String>,
    },

    /// Validate the configuration file
    Validate,

    /// Show the saved schedule
    Info {
        /// Schedule file (default: output.path from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    log::debug!("Configuration: {}", cli.config.display());

    match cli.command {
        Command::Crawl { output, index_url } => {
            if let Some(path) = output {
                config.output.path = path.display().to_string();
            }
            if let Some(url) = index_url {
                config.site.index_url = url;
            }
            config.validate()?;

            log::info!("Crawler starting...");
            let storage = LocalStorage::new(&config.output.path);
            let source = HttpSource::from_config(&config.crawler)?;

            match pipeline::run_crawler(Arc::new(config), source, &storage).await {
                Ok(RunStatus::Saved { count, location }) => {
                    log::info!("Saved {} week(s) to {}", count, location);
                }
                Ok(RunStatus::Empty) => {
                    log::error!("No data was extracted. The site may be unavailable.");
                    return Ok(ExitCode::from(2));
                }
                Err(e) => {
                    log::error!("Fatal error: {}", e);
                    return Err(e);
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Info { output } => {
            let path = output.unwrap_or_else(|| PathBuf::from(&config.output.path));
            let storage = LocalStorage::new(&path);

            match storage.load_schedule().await? {
                Some(weeks) => {
                    log::info!("{}: {} week(s)", path.display(), weeks.len());
                    for week in &weeks {
                        log::info!(
                            "    {} | {} sections, {} parts, {} min",
                            week.title,
                            week.sections.len(),
                            week.part_count(),
                            week.total_minutes()
                        );
                    }
                }
                None => log::info!("No schedule found at {}", path.display()),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
