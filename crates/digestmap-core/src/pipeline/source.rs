//! Path source - lists the regular files directly under a root.

use std::fs;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::error::DigestError;

/// Spawn the path source on the blocking pool.
///
/// The returned handle resolves once, with the source's completion status.
/// Dropping `tx` when the task ends closes the path stream.
pub fn spawn_path_source(
    root: PathBuf,
    tx: mpsc::Sender<PathBuf>,
    cancel: CancellationToken,
) -> JoinHandle<Result<usize, DigestError>> {
    tokio::task::spawn_blocking(move || source_paths(&root, &tx, &cancel))
}

/// Emit every regular file directly under `root`, or `root` itself if it
/// is a regular file. Returns the number of paths emitted.
///
/// Subdirectories are never entered; symlinks inside the root are skipped.
/// A symlink given as the root itself is followed, like `stat`.
///
/// # Errors
/// Returns [`DigestError::Stat`] if the root cannot be inspected,
/// [`DigestError::Enumerate`] if listing fails, and
/// [`DigestError::Cancelled`] if cancellation is observed (or all
/// consumers are gone) before enumeration finishes.
pub fn source_paths(
    root: &Path,
    tx: &mpsc::Sender<PathBuf>,
    cancel: &CancellationToken,
) -> Result<usize, DigestError> {
    let metadata = fs::metadata(root).map_err(|source| DigestError::Stat {
        path: root.to_path_buf(),
        source,
    })?;

    if metadata.is_file() {
        emit(root.to_path_buf(), tx, cancel)?;
        debug!(root = %root.display(), "Path source: root is a single file");
        return Ok(1);
    }

    let mut emitted = 0;
    let entries = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false);

    for entry in entries {
        let entry = entry.map_err(|source| DigestError::Enumerate {
            path: root.to_path_buf(),
            source,
        })?;

        if !entry.file_type().is_file() {
            trace!(path = %entry.path().display(), "Skipping non-regular entry");
            continue;
        }

        emit(entry.into_path(), tx, cancel)?;
        emitted += 1;
    }

    debug!(root = %root.display(), emitted, "Path source complete");
    Ok(emitted)
}

fn emit(
    path: PathBuf,
    tx: &mpsc::Sender<PathBuf>,
    cancel: &CancellationToken,
) -> Result<(), DigestError> {
    if cancel.is_cancelled() {
        debug!("Path source cancelled");
        return Err(DigestError::Cancelled);
    }

    // Workers only drop the receiver once cancelled
    tx.blocking_send(path).map_err(|_| {
        debug!("Path source: workers gone");
        DigestError::Cancelled
    })
}
