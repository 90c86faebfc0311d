//! Result aggregator - merges worker results and enforces fail-fast.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{FileResult, ResultMap};
use crate::error::DigestError;

/// Accumulates results into a [`ResultMap`]
///
/// Permission-denied results are dropped. The first other error is kept
/// as the run's error and cancels the run.
#[derive(Debug)]
pub struct Aggregator {
    map: ResultMap,
    fatal: Option<DigestError>,
    skipped: usize,
    cancel: CancellationToken,
}

impl Aggregator {
    /// Create an aggregator that cancels `cancel` on the first fatal error
    #[must_use]
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            map: ResultMap::new(),
            fatal: None,
            skipped: 0,
            cancel,
        }
    }

    /// Merge one result
    pub fn record(&mut self, result: FileResult) {
        let FileResult {
            relative_path,
            outcome,
        } = result;

        match outcome {
            Ok(fingerprint) => {
                self.map.insert(relative_path, fingerprint.to_hex());
            }
            Err(e) if e.is_permission_denied() => {
                debug!(path = %relative_path, error = %e, "Permission denied, skipping");
                self.skipped += 1;
            }
            Err(e) => {
                if self.fatal.is_some() {
                    debug!(path = %relative_path, error = %e, "Additional error after cancellation");
                    return;
                }
                warn!(path = %relative_path, error = %e, "Fatal error, cancelling run");
                self.fatal = Some(e);
                self.cancel.cancel();
            }
        }
    }

    /// Number of permission-denied results dropped so far
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Whether a fatal error has been recorded
    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.fatal.is_some()
    }

    /// Consume results until every sender is gone, then finish.
    ///
    /// # Errors
    /// Returns the first fatal error recorded.
    pub async fn drain(
        mut self,
        mut rx: mpsc::UnboundedReceiver<FileResult>,
    ) -> Result<ResultMap, DigestError> {
        while let Some(result) = rx.recv().await {
            self.record(result);
        }
        self.finish()
    }

    /// Return the map, or the fatal error if one was recorded.
    ///
    /// The partially built map is discarded on failure.
    ///
    /// # Errors
    /// Returns the first fatal error recorded.
    pub fn finish(self) -> Result<ResultMap, DigestError> {
        debug!(
            entries = self.map.len(),
            skipped = self.skipped,
            failed = self.fatal.is_some(),
            "Aggregation complete"
        );
        match self.fatal {
            Some(e) => Err(e),
            None => Ok(self.map),
        }
    }
}
