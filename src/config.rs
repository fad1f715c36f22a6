//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.combine-stats.toml` files.

use crate::aggregate::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_FILE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".combine-stats.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Input/output locations and logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory of per-item stats files.
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Combined document destination.
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_file: default_output_file(),
            verbose: false,
        }
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from(DEFAULT_INPUT_DIR)
}

fn default_output_file() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

/// Output formatting settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print the combined document.
    #[serde(default)]
    pub pretty: bool,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments (and their environment variables) take precedence over
    /// config file settings; unset arguments leave the file's values alone.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input_dir) = args.input_dir {
            self.general.input_dir = input_dir.clone();
        }
        if let Some(ref output) = args.output {
            self.general.output_file = output.clone();
        }

        // Flags only ever switch settings on
        if args.pretty {
            self.output.pretty = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.input_dir, Path::new("baseline_stats"));
        assert_eq!(config.general.output_file, Path::new("baseline_stats.json"));
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
input_dir = "stats/raw"
verbose = true

[output]
pretty = true
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.input_dir, Path::new("stats/raw"));
        assert_eq!(config.general.output_file, Path::new("baseline_stats.json"));
        assert!(config.general.verbose);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.general.input_dir, Path::new("baseline_stats"));
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_load_reports_path_on_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[general\ninput_dir = 1").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.toml"));
    }

    #[test]
    fn test_merge_with_args() {
        let mut config: Config = toml::from_str(
            r#"
[general]
input_dir = "from_file"
output_file = "from_file.json"
"#,
        )
        .unwrap();

        let args = Args::parse_from(["combine-stats", "--output", "cli.json", "--pretty"]);
        config.merge_with_args(&args);

        assert_eq!(config.general.input_dir, Path::new("from_file"));
        assert_eq!(config.general.output_file, Path::new("cli.json"));
        assert!(config.output.pretty);
    }

    #[cfg(unix)]
    #[test]
    fn test_merge_keeps_non_utf8_paths() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let input = PathBuf::from(OsStr::from_bytes(b"stats\xff"));
        let output = PathBuf::from(OsStr::from_bytes(b"out\xfe.json"));

        let mut args = Args::parse_from(["combine-stats"]);
        args.input_dir = Some(input.clone());
        args.output = Some(output.clone());

        let mut config = Config::default();
        config.merge_with_args(&args);

        assert_eq!(config.general.input_dir, input);
        assert_eq!(config.general.output_file, output);
        assert_eq!(config.general.input_dir.as_os_str().as_bytes(), b"stats\xff");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("baseline_stats"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.general.output_file, Path::new("baseline_stats.json"));
    }
}
