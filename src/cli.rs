//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// combine-stats - merge per-item JSON stats into one document
///
/// Reads every file in the input directory, parses it as JSON and writes a
/// single object keyed by file name (minus a trailing `.json`).
///
/// Examples:
///   combine-stats
///   combine-stats --input-dir baseline_stats --output baseline_stats.json
///   combine-stats -i runs/2024 -o runs/2024.json --pretty
///   combine-stats --dry-run
///   combine-stats --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory of per-item JSON stats files
    ///
    /// Defaults to the config file's `input_dir`, or `baseline_stats`.
    #[arg(short, long, value_name = "DIR", env = "COMBINE_STATS_INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Output file for the combined document
    ///
    /// Created if absent, replaced if present. Defaults to the config
    /// file's `output_file`, or `baseline_stats.json`.
    #[arg(short, long, value_name = "FILE", env = "COMBINE_STATS_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .combine-stats.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Pretty-print the combined document
    #[arg(long)]
    pub pretty: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only, no progress bar)
    #[arg(short, long)]
    pub quiet: bool,

    /// List the entries and the keys they map to without writing output
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .combine-stats.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref output) = self.output {
            if output.as_os_str().is_empty() {
                return Err("Output path must not be empty".to_string());
            }
            if output.is_dir() {
                return Err(format!(
                    "Output path is a directory: {}",
                    output.display()
                ));
            }
        }

        if let Some(ref input_dir) = self.input_dir {
            if input_dir.as_os_str().is_empty() {
                return Err("Input directory must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the config file's `general.verbose`; `--quiet`
    /// still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
