//! combine-stats - merge a directory of per-item JSON stats files
//!
//! Reads every file in the input directory, parses it as JSON and writes one
//! object mapping each file name (minus a trailing `.json`) to its contents.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any I/O, parse, config or argument error

mod aggregate;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod scanner;

use aggregate::AggregateOptions;
use anyhow::{bail, Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use models::RunSummary;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    let outcome = run(&args);

    // The single place a failure reaches stderr
    if let Err(ref e) = outcome {
        eprintln!("{}", failure_message(e));
    }

    std::process::exit(exit_code(&outcome));
}

/// Validate, load config, start logging and execute the requested action.
///
/// Returns the run summary when a combined document was written.
fn run(args: &Args) -> Result<Option<RunSummary>> {
    args.validate().map_err(anyhow::Error::msg)?;

    // Handle --init-config early (no logging needed)
    if args.init_config {
        handle_init_config(Path::new(CONFIG_FILE_NAME))?;
        return Ok(None);
    }

    // Config decides the default verbosity, so it is read before logging starts
    let mut config = load_config(args)?;
    config.merge_with_args(args);

    init_logging(args, &config);

    info!("combine-stats v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    execute(args, &config)
}

/// Run the aggregation (or the dry run) for a merged configuration.
fn execute(args: &Args, config: &Config) -> Result<Option<RunSummary>> {
    debug!("Effective config: {:?}", config);

    let mut options = AggregateOptions::from(config);
    options.show_progress = !args.quiet;

    if args.dry_run {
        handle_dry_run(&options)?;
        return Ok(None);
    }

    let summary = aggregate::aggregate_with(&options)?;
    info!("Done: {}", summary);
    Ok(Some(summary))
}

/// Process exit code for a run outcome.
fn exit_code<T>(outcome: &Result<T>) -> i32 {
    match outcome {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

/// Message printed on stderr for a failed run, including every cause.
fn failure_message(error: &anyhow::Error) -> String {
    format!("Error: {:#}", error)
}

/// Handle --init-config: generate a default .combine-stats.toml.
fn handle_init_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!(
            "{} already exists. Remove it first or edit it manually.",
            path.display()
        );
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Created {} with default settings.", path.display());
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Handle --dry-run: list entries and their keys, write nothing.
fn handle_dry_run(options: &AggregateOptions) -> Result<()> {
    if let Err(e) = scanner::ensure_output_outside(&options.input_dir, &options.output_file) {
        eprintln!("Warning: {}", e);
    }

    let entries = scanner::list_entries(&options.input_dir)?;

    if entries.is_empty() {
        println!("No entries in {}.", options.input_dir.display());
    } else {
        println!(
            "{} entries in {} would be combined:",
            entries.len(),
            options.input_dir.display()
        );
        for entry in &entries {
            println!("  {} -> {:?}", entry.file_name, entry.key);
        }
    }

    let collisions = scanner::colliding_keys(&entries);
    if !collisions.is_empty() {
        println!(
            "Keys shared by several files (last in the list wins): {}",
            collisions.join(", ")
        );
    }

    println!("Output would be written to {}.", options.output_file.display());
    Ok(())
}

/// Load configuration from an explicit path, the default location, or
/// built-in defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    Ok(Config::load_default()?.unwrap_or_default())
}
