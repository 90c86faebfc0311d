//! Error types for fingerprinting runs

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fingerprinting a root
///
/// Only permission-denied failures on individual files are absorbed by a
/// run; every other variant ends it.
#[derive(Debug, Error)]
pub enum DigestError {
    /// The root could not be inspected
    #[error("cannot stat {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file could not be opened
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// I/O failure while reading a file's chunks
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Listing the root directory failed
    #[error("cannot list {}: {source}", path.display())]
    Enumerate {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A stage observed cancellation before it finished
    #[error("walk cancelled")]
    Cancelled,

    /// The async runtime could not be started
    #[error("cannot start runtime: {0}")]
    Runtime(#[source] io::Error),

    /// A worker or blocking digest task panicked
    #[error("worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl DigestError {
    /// Whether the underlying I/O failure was a permission error
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        let kind = match self {
            Self::Stat { source, .. } | Self::Open { source, .. } | Self::Read { source, .. } => {
                Some(source.kind())
            }
            Self::Enumerate { source, .. } => source.io_error().map(io::Error::kind),
            Self::Cancelled | Self::Runtime(_) | Self::Worker(_) => None,
        };
        kind == Some(io::ErrorKind::PermissionDenied)
    }

    /// Whether this error ends the whole run when a worker reports it
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !self.is_permission_denied()
    }
}
