//! Input directory listing.
//!
//! Lists every entry directly inside the stats directory, in lexicographic
//! file name order, and derives the key each entry is stored under.

use crate::error::{AggregateError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Suffix removed from file names to form keys.
pub const JSON_SUFFIX: &str = ".json";

/// A listed entry of the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedEntry {
    /// Full path to the entry.
    pub path: PathBuf,
    /// File name as listed.
    pub file_name: String,
    /// Key the parsed contents are stored under.
    pub key: String,
}

/// Remove a single trailing `.json` from a file name.
pub fn strip_key(name: &str) -> &str {
    name.strip_suffix(JSON_SUFFIX).unwrap_or(name)
}

/// List all entries directly inside `dir`.
///
/// A file name that is not valid UTF-8 is an error, since it cannot become a
/// key. Nothing is filtered: hidden files, files without the `.json` suffix and
/// subdirectories are all returned, and a subdirectory fails later when it
/// is read. Entries are sorted by file name, which fixes the order used to
/// resolve colliding keys.
pub fn list_entries(dir: &Path) -> Result<Vec<ScannedEntry>> {
    let metadata = fs::metadata(dir).map_err(|source| AggregateError::ListDir {
        path: dir.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(AggregateError::ListDir {
            path: dir.to_path_buf(),
            source: io::Error::other("not a directory"),
        });
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| AggregateError::ListDir {
            path: dir.to_path_buf(),
            source: io::Error::from(e),
        })?;

        // Keys are JSON strings; a lossy conversion could merge distinct names
        let file_name = match entry.file_name().to_str() {
            Some(name) => name.to_string(),
            None => {
                return Err(AggregateError::ListDir {
                    path: entry.path().to_path_buf(),
                    source: io::Error::new(
                        io::ErrorKind::InvalidData,
                        "file name is not valid UTF-8",
                    ),
                })
            }
        };
        let key = strip_key(&file_name).to_string();
        debug!("Listed {} -> key {:?}", file_name, key);

        entries.push(ScannedEntry {
            path: entry.into_path(),
            file_name,
            key,
        });
    }

    Ok(entries)
}

/// Keys that more than one entry maps to, each reported once.
pub fn colliding_keys(entries: &[ScannedEntry]) -> Vec<String> {
    let mut seen = std::collections::BTreeMap::<&str, usize>::new();
    for entry in entries {
        *seen.entry(entry.key.as_str()).or_default() += 1;
    }
    seen.into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(key, _)| key.to_string())
        .collect()
}

/// Reject an output path that would itself be listed as an input.
///
/// Only the output's parent directory matters since listing is not
/// recursive. Paths are canonicalized so `./stats` and `stats/../stats`
/// compare equal; an output whose parent does not exist yet cannot be
/// inside the input directory.
pub fn ensure_output_outside(input_dir: &Path, output: &Path) -> Result<()> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let (Ok(input), Ok(parent)) = (fs::canonicalize(input_dir), fs::canonicalize(parent)) else {
        return Ok(());
    };

    if input == parent {
        return Err(AggregateError::OutputInsideInput {
            input: input_dir.to_path_buf(),
            output: output.to_path_buf(),
        });
    }

    Ok(())
}
