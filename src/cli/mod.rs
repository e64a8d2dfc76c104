//! Command-line interface.

mod crawl;
mod tasks;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::error;

use crate::config::{OutputSettings, Settings};
use crate::logging;
use crate::models::TaskType;
use crate::pipeline::Criterion;

#[derive(Parser)]
#[command(name = "taskcrawl")]
#[command(about = "Fetch a page for a task type and export its records to CSV, JSON and SQLite")]
#[command(version)]
pub struct Cli {
    /// Config file path (default: $TASKCRAWL_CONFIG or ./taskcrawl.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory for CSV and JSON exports (overrides config)
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// SQLite database file (overrides config)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl one task type
    Crawl {
        /// Task type (news, books, music, movies, vpn)
        #[arg(value_enum)]
        task_type: TaskType,
        /// Target URL (default: the task type's configured URL)
        #[arg(short, long)]
        url: Option<String>,
        /// Crawl depth (accepted for compatibility; only the target page is fetched)
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        depth: u32,
        /// Total fetch attempts (default: from config)
        #[arg(long)]
        max_retries: Option<u32>,
        /// Keep only records whose FIELD contains TEXT (repeatable)
        #[arg(short, long = "filter", value_name = "FIELD=TEXT", value_parser = Criterion::parse)]
        filters: Vec<Criterion>,
    },

    /// Crawl every task type concurrently using default URLs
    CrawlAll {
        /// Total fetch attempts per task (default: from config)
        #[arg(long)]
        max_retries: Option<u32>,
    },

    /// List task types with their default URLs and storage schema
    Tasks,
}

impl Cli {
    /// Load settings and apply command-line overrides.
    fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        if let Some(dir) = &self.output_dir {
            settings.output.dir = dir.clone();
        }
        if let Some(database) = &self.database {
            settings.output.database = database.clone();
        }
        Ok(settings)
    }
}

/// Load settings and install logging. When the configuration cannot be
/// loaded the failure is logged to `fallback_log` instead.
fn startup(cli: &Cli, fallback_log: &Path) -> anyhow::Result<Settings> {
    match cli.settings() {
        Ok(settings) => {
            logging::init(&settings.output.log_file, cli.verbose)?;
            Ok(settings)
        }
        Err(e) => {
            logging::init(fallback_log, cli.verbose)?;
            error!("Failed to load configuration: {:#}", e);
            Err(e)
        }
    }
}

/// Parse arguments, set up logging and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = startup(&cli, &OutputSettings::default().log_file)?;

    match cli.command {
        Commands::Crawl {
            task_type,
            url,
            depth,
            max_retries,
            filters,
        } => {
            crawl::cmd_crawl(&settings, task_type, url, depth, max_retries, filters).await
        }
        Commands::CrawlAll { max_retries } => crawl::cmd_crawl_all(&settings, max_retries).await,
        Commands::Tasks => tasks::cmd_tasks(&settings),
    }
}
