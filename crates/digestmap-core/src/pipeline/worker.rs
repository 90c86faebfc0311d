//! Worker pool - claims paths and digests them.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::FileResult;
use crate::digest::{digest_file, Fingerprint};
use crate::error::DigestError;

/// A fixed set of digest workers sharing one path receiver
pub struct WorkerPool {
    workers: JoinSet<usize>,
}

impl WorkerPool {
    /// Spawn `worker_count` workers draining `rx`.
    ///
    /// Each worker holds its own clone of `tx`, so the result stream closes
    /// exactly when the last worker exits.
    pub fn spawn(
        worker_count: usize,
        root: Arc<PathBuf>,
        rx: mpsc::Receiver<PathBuf>,
        tx: mpsc::UnboundedSender<FileResult>,
        cancel: &CancellationToken,
    ) -> Self {
        let rx = Arc::new(Mutex::new(rx));
        let mut workers = JoinSet::new();

        for worker_id in 0..worker_count {
            workers.spawn(digest_worker(
                worker_id,
                root.clone(),
                rx.clone(),
                tx.clone(),
                cancel.clone(),
            ));
        }

        Self { workers }
    }

    /// Wait for every worker to exit and return the number of results emitted.
    ///
    /// # Errors
    /// Returns [`DigestError::Worker`] if any worker panicked.
    pub async fn join(mut self) -> Result<usize, DigestError> {
        let mut emitted = 0;
        let mut failure = None;

        while let Some(joined) = self.workers.join_next().await {
            match joined {
                Ok(count) => emitted += count,
                Err(e) => {
                    warn!(error = %e, "Digest worker failed");
                    failure.get_or_insert(DigestError::Worker(e));
                }
            }
        }

        failure.map_or(Ok(emitted), Err)
    }
}

/// Digest worker - pulls paths until the stream ends or the run is cancelled.
///
/// Cancellation is checked before claiming a path and again before
/// emitting a result; a digest already in flight runs to completion and
/// its result is dropped.
pub async fn digest_worker(
    worker_id: usize,
    root: Arc<PathBuf>,
    rx: Arc<Mutex<mpsc::Receiver<PathBuf>>>,
    tx: mpsc::UnboundedSender<FileResult>,
    cancel: CancellationToken,
) -> usize {
    trace!(worker_id, "Digest worker starting");
    let mut emitted = 0;

    loop {
        let next = {
            let mut rx_guard = rx.lock().await;
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    trace!(worker_id, emitted, "Digest worker cancelled");
                    break;
                }
                path = rx_guard.recv() => path,
            }
        };

        let Some(path) = next else {
            trace!(worker_id, emitted, "Digest worker: input exhausted");
            break;
        };

        let outcome = digest_blocking(path.clone()).await;
        let relative_path = relative_path(&root, &path);

        if cancel.is_cancelled() {
            trace!(worker_id, path = %path.display(), "Dropping result after cancellation");
            break;
        }

        trace!(worker_id, path = %relative_path, ok = outcome.is_ok(), "Digested file");
        if tx.send(FileResult::new(relative_path, outcome)).is_err() {
            trace!(worker_id, "Digest worker: aggregator gone");
            break;
        }
        emitted += 1;
    }

    emitted
}

/// Run the digester on the blocking pool
async fn digest_blocking(path: PathBuf) -> Result<Fingerprint, DigestError> {
    match tokio::task::spawn_blocking(move || digest_file(&path)).await {
        Ok(outcome) => outcome,
        Err(e) => Err(DigestError::Worker(e)),
    }
}

/// Path of `path` relative to `root`.
///
/// Falls back to `root` verbatim when `path` is the root itself (the
/// single-file case) or is not under it.
///
/// Keys are UTF-8: invalid sequences become U+FFFD, so two non-UTF-8
/// names that differ only in those bytes map to the same key and the
/// later result replaces the earlier one.
#[must_use]
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = match path.strip_prefix(root) {
        Ok(relative) if path != root => relative,
        _ => root,
    };

    let key = relative.to_string_lossy();
    if let Cow::Owned(_) = key {
        debug!(path = %path.display(), key = %key, "Non-UTF-8 file name, result key is lossy");
    }
    key.into_owned()
}
