//! Whole-file persistence

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Replace the file at `path` with `contents` via a uniquely named sibling
/// temp file and a rename
///
/// Readers see either the previous file or the new one, never a partial write.
/// A symlink at `path` is kept and the file it points to is replaced. The temp
/// file is removed if any step fails.
pub fn atomic_write(path: &Path, contents: &str) -> Result<()> {
    let target = resolve_target(path);
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in: {}", dir.display()))?;
    temp.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write to temp file: {}", temp.path().display()))?;
    temp.as_file()
        .sync_all()
        .with_context(|| format!("failed to sync temp file: {}", temp.path().display()))?;

    if let Ok(metadata) = fs::metadata(&target) {
        if let Err(err) = fs::set_permissions(temp.path(), metadata.permissions()) {
            debug!(path = %target.display(), "could not copy file mode: {}", err);
        }
    }

    temp.persist(&target)
        .with_context(|| format!("failed to rename temp file to: {}", target.display()))?;

    Ok(())
}

/// The file a write to `path` should replace; symlinks are followed
fn resolve_target(path: &Path) -> PathBuf {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_symlink() => {
            fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}
