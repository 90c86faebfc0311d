//! Pipeline module: Concurrent fingerprinting of a root
//!
//! ```text
//! Path source ──bounded──▶ Workers (N) ──unbounded──▶ Aggregator
//!  (blocking)               (async + blocking I/O)      (caller task)
//! ```
//!
//! Every stage receives the run's [`CancellationToken`] explicitly. The
//! aggregator cancels it on the first fatal error; the run cancels it on
//! exit so no stage outlives the call.

mod aggregator;
mod config;
mod source;
mod worker;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::digest::Fingerprint;
use crate::error::DigestError;

pub use aggregator::Aggregator;
pub use config::{PipelineConfig, DEFAULT_PATH_BUFFER, DEFAULT_WORKERS};
pub use source::{source_paths, spawn_path_source};
pub use worker::{digest_worker, relative_path, WorkerPool};

/// Relative path → lowercase hex fingerprint
pub type ResultMap = HashMap<String, String>;

/// Outcome of digesting one sourced path
#[derive(Debug)]
pub struct FileResult {
    /// Path relative to the root, or the root itself for a single file
    pub relative_path: String,
    /// The fingerprint, or why it could not be computed
    pub outcome: Result<Fingerprint, DigestError>,
}

impl FileResult {
    /// Create a new file result
    #[must_use]
    pub fn new(relative_path: impl Into<String>, outcome: Result<Fingerprint, DigestError>) -> Self {
        Self {
            relative_path: relative_path.into(),
            outcome,
        }
    }
}

/// Fingerprint every regular file directly under `root`.
///
/// If `root` is a regular file, the map holds one entry keyed by `root`
/// as given. Files that cannot be read for lack of permission are left
/// out.
///
/// # Errors
/// Returns the first fatal error: the root cannot be inspected or listed,
/// a file fails to open or read for a reason other than permissions, or a
/// worker panics. No partial map is returned.
pub async fn digest_root(root: &Path, config: &PipelineConfig) -> Result<ResultMap, DigestError> {
    let cancel = CancellationToken::new();
    let _cancel_on_exit = cancel.clone().drop_guard();

    let root = root.to_path_buf();
    debug!(root = %root.display(), workers = config.workers, "Starting fingerprint run");

    let (path_tx, path_rx) = mpsc::channel(config.path_buffer.max(1));
    let (result_tx, result_rx) = mpsc::unbounded_channel();

    let source = spawn_path_source(root.clone(), path_tx, cancel.clone());
    let pool = WorkerPool::spawn(
        config.workers.max(1),
        Arc::new(root),
        path_rx,
        result_tx,
        &cancel,
    );

    let map = Aggregator::new(cancel.clone()).drain(result_rx).await?;
    let emitted = pool.join().await?;
    let sourced = source.await??;

    debug!(sourced, emitted, entries = map.len(), "Fingerprint run complete");
    Ok(map)
}

/// Blocking form of [`digest_root`] with the default configuration.
///
/// Builds its own multi-threaded runtime, so it must not be called from
/// inside one.
///
/// # Errors
/// Returns [`DigestError::Runtime`] if the runtime cannot be built, and
/// otherwise whatever [`digest_root`] returns.
pub fn parse(root: &Path) -> Result<ResultMap, DigestError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(DigestError::Runtime)?;

    runtime.block_on(digest_root(root, &PipelineConfig::default()))
}

#[cfg(test)]
mod tests;
