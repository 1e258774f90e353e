//! Whole-tree directory copies

use crate::StorageError;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Copy every file under `source` into `destination`, overwriting existing files
///
/// Returns the number of files copied. `destination` is created if needed.
pub fn copy_tree_blocking(source: &Path, destination: &Path) -> Result<u64, StorageError> {
    fs::create_dir_all(destination)?;

    let mut copied = 0u64;

    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(|e| {
            StorageError::Io(
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
            )
        })?;

        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::copy(entry.path(), &target)?;
        copied += 1;
    }

    tracing::debug!(
        "Copied {} files from {} to {}",
        copied,
        source.display(),
        destination.display()
    );
    Ok(copied)
}

/// Async wrapper running [`copy_tree_blocking`] on the blocking pool
pub async fn copy_tree(source: PathBuf, destination: PathBuf) -> Result<u64, StorageError> {
    tokio::task::spawn_blocking(move || copy_tree_blocking(&source, &destination))
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
}
