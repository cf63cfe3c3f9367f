//! ANN Encyclopedia Mirror CLI
//!
//! Two-stage synchronization: `report` refreshes the category index
//! listings, `update` fetches missing or outdated encyclopedia entries.

use std::path::PathBuf;

use ann_mirror::{
    error::Result,
    models::{Category, Config},
    pipeline::{self, UpdateKind, UpdateOptions},
    storage::LocalStore,
};
use clap::{Parser, Subcommand};

/// ann-mirror - ANN Encyclopedia Mirror
#[derive(Parser, Debug)]
#[command(
    name = "ann-mirror",
    version,
    about = "Mirrors the Anime News Network encyclopedia metadata into a local JSON store"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "mirror.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Refresh category report listings
    Report {
        /// Retrieve the report for one category; all categories when omitted
        #[arg(short, long, value_enum)]
        category: Option<Category>,

        /// Path to output reports directory
        #[arg(short, long, default_value = "reports")]
        output_directory: PathBuf,
    },

    /// Fetch missing or outdated encyclopedia entries
    Update {
        /// Encyclopedia category to update
        #[arg(short, long, value_enum)]
        category: Category,

        /// Update missing or outdated encyclopedia entries
        #[arg(short = 't', long, value_enum, default_value_t = UpdateKind::Missing)]
        entry_type: UpdateKind,

        /// Batch amount of entries to update
        #[arg(short, long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=50))]
        batch_size: u8,

        /// Amount of days after which an entry counts as outdated
        #[arg(short, long, default_value_t = 30)]
        days: u32,

        /// Path to input encyclopedia directory
        #[arg(short, long, default_value = "encyclopedia")]
        input_directory: PathBuf,

        /// Path to output encyclopedia directory
        #[arg(short, long, default_value = "encyclopedia")]
        output_directory: PathBuf,

        /// Path to reports directory
        #[arg(long, default_value = "reports")]
        reports_directory: PathBuf,

        /// Path to the per-category keyword blacklist directory
        #[arg(long, default_value = "blacklists")]
        blacklist_directory: PathBuf,
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
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    config.validate()?;

    match cli.command {
        Command::Report {
            category,
            output_directory,
        } => {
            let store = LocalStore::new(&output_directory);
            pipeline::run_reports(&config, &store, category)?;
        }

        Command::Update {
            category,
            entry_type,
            batch_size,
            days,
            input_directory,
            output_directory,
            reports_directory,
            blacklist_directory,
        } => {
            let reports = LocalStore::new(&reports_directory);
            let input = LocalStore::new(&input_directory);
            let output = LocalStore::new(&output_directory);

            let options = UpdateOptions {
                category,
                kind: entry_type,
                batch_size: usize::from(batch_size),
                threshold_days: days,
            };
            pipeline::run_update(
                &config,
                &reports,
                &input,
                &output,
                &blacklist_directory,
                &options,
            )?;
        }
    }

    log::info!("Done!");

    Ok(())
}
