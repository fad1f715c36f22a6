//! The aggregation pipeline: list, read, parse, combine, write.

use crate::error::{AggregateError, Result};
use crate::models::{CombinedStats, Entry, RunSummary};
use crate::report;
use crate::scanner::{self, ScannedEntry};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Input and output locations used when nothing else is configured.
pub const DEFAULT_INPUT_DIR: &str = "baseline_stats";
pub const DEFAULT_OUTPUT_FILE: &str = "baseline_stats.json";

/// Options for a single aggregation run.
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Directory whose entries are combined.
    pub input_dir: PathBuf,
    /// File the combined document is written to.
    pub output_file: PathBuf,
    /// Pretty-print the output instead of compact JSON.
    pub pretty: bool,
    /// Show a progress bar while reading entries.
    pub show_progress: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            pretty: false,
            show_progress: false,
        }
    }
}

impl From<&crate::config::Config> for AggregateOptions {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            input_dir: config.general.input_dir.clone(),
            output_file: config.general.output_file.clone(),
            pretty: config.output.pretty,
            show_progress: false,
        }
    }
}

/// Combine `input_dir` into `output_file` with compact output.
#[allow(dead_code)] // Entry point for library callers; the binary uses aggregate_with
pub fn aggregate(input_dir: &Path, output_file: &Path) -> Result<RunSummary> {
    aggregate_with(&AggregateOptions {
        input_dir: input_dir.to_path_buf(),
        output_file: output_file.to_path_buf(),
        ..AggregateOptions::default()
    })
}

/// Run the whole pipeline.
///
/// The output file is only touched after every entry has been read and
/// parsed; the first error aborts the run.
pub fn aggregate_with(options: &AggregateOptions) -> Result<RunSummary> {
    scanner::ensure_output_outside(&options.input_dir, &options.output_file)?;

    let entries = scanner::list_entries(&options.input_dir)?;
    info!(
        "Found {} entries in {}",
        entries.len(),
        options.input_dir.display()
    );

    let progress = progress_bar(entries.len(), options.show_progress);
    let combined = combine(&entries, &progress);
    progress.finish_and_clear();
    let (stats, overwritten) = combined?;
    if stats.is_empty() {
        warn!("No entries found; writing an empty object");
    }
    debug!("Keys: {:?}", stats.keys().collect::<Vec<_>>());

    let bytes_written = report::write_stats(&stats, &options.output_file, options.pretty)?;
    info!(
        "Wrote {} keys to {}",
        stats.len(),
        options.output_file.display()
    );

    Ok(RunSummary {
        files_read: entries.len(),
        keys_written: stats.len(),
        overwritten,
        output: options.output_file.clone(),
        bytes_written,
    })
}

/// Read and parse a single listed entry.
pub fn read_entry(entry: &ScannedEntry) -> Result<Entry> {
    let content = fs::read_to_string(&entry.path).map_err(|source| AggregateError::ReadEntry {
        path: entry.path.clone(),
        source,
    })?;

    let value = serde_json::from_str(&content).map_err(|source| AggregateError::Parse {
        path: entry.path.clone(),
        source,
    })?;

    Ok(Entry {
        key: entry.key.clone(),
        value,
    })
}

/// Fold entries into a combined mapping in listing order.
///
/// Returns the mapping together with every key whose value was replaced by
/// a later entry.
pub fn combine(
    entries: &[ScannedEntry],
    progress: &ProgressBar,
) -> Result<(CombinedStats, Vec<String>)> {
    let mut stats = CombinedStats::new();
    let mut overwritten = Vec::new();

    for scanned in entries {
        progress.set_message(scanned.file_name.clone());
        debug!("Reading {}", scanned.path.display());

        let entry = read_entry(scanned)?;
        let key = entry.key.clone();
        if stats.insert(entry).is_some() {
            warn!(
                "Key {:?} from {} replaces an earlier entry",
                key, scanned.file_name
            );
            overwritten.push(key);
        }

        progress.inc(1);
    }

    Ok((stats, overwritten))
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    /// A scratch workspace with a `stats` input directory and an output path
    /// beside it.
    struct Workspace {
        dir: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            fs::create_dir(dir.path().join("stats")).unwrap();
            Self { dir }
        }

        fn input(&self) -> PathBuf {
            self.dir.path().join("stats")
        }

        fn output(&self) -> PathBuf {
            self.dir.path().join("stats.json")
        }

        fn add(&self, name: &str, content: &str) {
            fs::write(self.input().join(name), content).unwrap();
        }

        fn run(&self) -> Result<RunSummary> {
            aggregate(&self.input(), &self.output())
        }

        fn read_output(&self) -> Value {
            let text = fs::read_to_string(self.output()).unwrap();
            serde_json::from_str(&text).unwrap()
        }
    }

    #[test]
    fn test_one_entry_per_file() {
        let ws = Workspace::new();
        ws.add("a.json", r#"{"x": 1}"#);
        ws.add("b", "42");
        ws.add("c.json", r#"[1, "two", null, true]"#);
        ws.add("d.json", r#""text""#);

        let summary = ws.run().unwrap();

        assert_eq!(summary.files_read, 4);
        assert_eq!(summary.keys_written, 4);
        assert!(summary.overwritten.is_empty());
        assert_eq!(
            ws.read_output(),
            json!({
                "a": {"x": 1},
                "b": 42,
                "c": [1, "two", null, true],
                "d": "text"
            })
        );
    }

    #[test]
    fn test_empty_directory_writes_empty_object() {
        let ws = Workspace::new();
        ws.run().unwrap();
        assert_eq!(fs::read_to_string(ws.output()).unwrap(), "{}");
    }

    #[test]
    fn test_colliding_keys_last_write_wins() {
        let ws = Workspace::new();
        ws.add("c", r#""plain""#);
        ws.add("c.json", r#""suffixed""#);

        let summary = ws.run().unwrap();

        // "c" sorts before "c.json", so the suffixed file is processed last.
        assert_eq!(summary.files_read, 2);
        assert_eq!(summary.keys_written, 1);
        assert_eq!(summary.overwritten, vec!["c".to_string()]);
        assert_eq!(ws.read_output(), json!({"c": "suffixed"}));
    }

    #[test]
    fn test_invalid_json_leaves_no_output() {
        let ws = Workspace::new();
        ws.add("a.json", r#"{"x": 1}"#);
        ws.add("bad.json", "not json");

        let err = ws.run().unwrap_err();

        assert!(matches!(err, AggregateError::Parse { ref path, .. } if path.ends_with("bad.json")));
        assert!(!ws.output().exists());
    }

    #[test]
    fn test_invalid_json_keeps_previous_output() {
        let ws = Workspace::new();
        fs::write(ws.output(), "previous").unwrap();
        ws.add("bad.json", "{");

        assert!(ws.run().is_err());
        assert_eq!(fs::read_to_string(ws.output()).unwrap(), "previous");
    }

    #[test]
    fn test_subdirectory_entry_fails() {
        let ws = Workspace::new();
        fs::create_dir(ws.input().join("nested")).unwrap();

        let err = ws.run().unwrap_err();
        assert!(matches!(err, AggregateError::ReadEntry { .. }));
        assert!(!ws.output().exists());
    }

    #[test]
    fn test_missing_input_dir() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.json");

        let err = aggregate(&dir.path().join("absent"), &output).unwrap_err();
        assert!(matches!(err, AggregateError::ListDir { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_output_inside_input_rejected() {
        let ws = Workspace::new();
        ws.add("a.json", "1");

        let output = ws.input().join("combined.json");
        let err = aggregate(&ws.input(), &output).unwrap_err();
        assert!(matches!(err, AggregateError::OutputInsideInput { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let ws = Workspace::new();
        ws.add("zeta.json", r#"{"b": 2, "a": 1}"#);
        ws.add("alpha.json", r#"[3, 2, 1]"#);
        ws.add("mid", "0.5");

        ws.run().unwrap();
        let first = fs::read(ws.output()).unwrap();
        ws.run().unwrap();
        let second = fs::read(ws.output()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_pretty_output() {
        let ws = Workspace::new();
        ws.add("a.json", r#"{"x": 1}"#);

        let summary = aggregate_with(&AggregateOptions {
            input_dir: ws.input(),
            output_file: ws.output(),
            pretty: true,
            show_progress: false,
        })
        .unwrap();

        let text = fs::read_to_string(ws.output()).unwrap();
        assert!(text.contains('\n'));
        assert_eq!(summary.bytes_written, text.len());
        assert_eq!(ws.read_output(), json!({"a": {"x": 1}}));
    }

    #[test]
    fn test_read_entry() {
        let ws = Workspace::new();
        ws.add("a.json", r#"{"x": 1}"#);

        let scanned = ScannedEntry {
            path: ws.input().join("a.json"),
            file_name: "a.json".to_string(),
            key: "a".to_string(),
        };
        let entry = read_entry(&scanned).unwrap();
        assert_eq!(entry.key, "a");
        assert_eq!(entry.value, json!({"x": 1}));
    }
}
