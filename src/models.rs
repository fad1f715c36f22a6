//! Data models for the stats combiner.
//!
//! Parsed file contents are kept as `serde_json::Value` so any JSON shape
//! passes through unchanged.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

/// A single parsed stats file, keyed by its stripped file name.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// File name with one trailing `.json` removed.
    pub key: String,
    /// Parsed file contents.
    pub value: Value,
}

/// The combined mapping from stripped key to parsed contents.
///
/// Serializes as a plain JSON object. Keys are kept in lexicographic order,
/// so two runs over the same inputs produce identical output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CombinedStats {
    entries: Map<String, Value>,
}

impl CombinedStats {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the value it replaced if the key was
    /// already present.
    pub fn insert(&mut self, entry: Entry) -> Option<Value> {
        self.entries.insert(entry.key, entry.value)
    }

    /// Look up a key.
    #[allow(dead_code)] // Accessor for library callers
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries have been inserted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over keys in serialization order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of files read and parsed.
    pub files_read: usize,
    /// Number of keys in the written document.
    pub keys_written: usize,
    /// Keys whose earlier value was replaced by a later file.
    pub overwritten: Vec<String>,
    /// Destination that was written.
    pub output: PathBuf,
    /// Size of the written document in bytes.
    pub bytes_written: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files -> {} keys ({} bytes) in {}",
            self.files_read,
            self.keys_written,
            self.bytes_written,
            self.output.display()
        )?;
        if !self.overwritten.is_empty() {
            write!(f, ", overwritten: {}", self.overwritten.join(", "))?;
        }
        Ok(())
    }
}
