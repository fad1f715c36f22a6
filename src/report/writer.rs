//! Combined document writer.
//!
//! Renders the combined mapping to JSON text and replaces the output file
//! in one step, so a failed run never leaves a truncated document behind.

use crate::error::{AggregateError, Result};
use crate::models::CombinedStats;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

/// Render the combined mapping as JSON text.
pub fn render(stats: &CombinedStats, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(stats)?
    } else {
        serde_json::to_string(stats)?
    };
    Ok(text)
}

/// Write `contents` as the complete contents of `path`.
///
/// The text goes to a temporary file next to the destination, which is then
/// renamed over it. The destination is created if absent and replaced if
/// present; on any failure it is left as it was. A symlinked destination is
/// written through to its target, and an existing file keeps its mode.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let write_err = |source: std::io::Error| AggregateError::Write {
        path: path.to_path_buf(),
        source,
    };

    let target = resolve_target(path);
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut file = staging_file(dir).map_err(write_err)?;
    debug!("Staging output in {}", file.path().display());

    if let Ok(existing) = fs::metadata(&target) {
        fs::set_permissions(file.path(), existing.permissions()).map_err(write_err)?;
    }

    file.write_all(contents.as_bytes()).map_err(write_err)?;
    file.flush().map_err(write_err)?;
    file.persist(&target).map_err(|e| write_err(e.error))?;

    Ok(())
}

/// Follow a symlinked destination to the file it points at. Dangling links
/// and plain paths are returned unchanged.
fn resolve_target(path: &Path) -> PathBuf {
    let is_link = fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    if is_link {
        if let Ok(resolved) = fs::canonicalize(path) {
            return resolved;
        }
    }
    path.to_path_buf()
}

/// Temporary file created with the same default mode a plain
/// `File::create` gets (0o666 less the umask).
fn staging_file(dir: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".combine-stats").suffix(".tmp");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }

    builder.tempfile_in(dir)
}

/// Render and write the combined mapping, returning the number of bytes
/// written.
pub fn write_stats(stats: &CombinedStats, path: &Path, pretty: bool) -> Result<usize> {
    let text = render(stats, pretty)?;
    write_atomic(path, &text)?;
    Ok(text.len())
}
