//! Error types for the aggregation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while combining a stats directory.
///
/// Every variant carries the path it concerns so the message printed on
/// failure points at the offending file.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The input directory could not be listed.
    #[error("Failed to list input directory {}: {source}", .path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An entry in the input directory could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    ReadEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An entry did not contain valid JSON.
    #[error("Failed to parse {} as JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The combined mapping could not be serialized.
    #[error("Failed to serialize combined stats: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The output file could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file would be listed as one of the inputs.
    #[error(
        "Output file {} is inside input directory {}",
        .output.display(),
        .input.display()
    )]
    OutputInsideInput { input: PathBuf, output: PathBuf },
}

/// Result alias used by the pipeline modules.
pub type Result<T> = std::result::Result<T, AggregateError>;
