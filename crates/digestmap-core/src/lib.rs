//! digestmap-core: Concurrent chunked content fingerprints
//!
//! Computes a fingerprint for every regular file directly inside a
//! directory (or for a single file) using a fixed pool of workers, and
//! returns a map from relative path to hex-encoded fingerprint.
//!
//! # Pipeline
//!
//! ```text
//! Path source → Workers (N) → Aggregator
//!   bounded      unbounded     ResultMap
//! ```
//!
//! A single [`CancellationToken`](tokio_util::sync::CancellationToken) is
//! threaded through every stage. The first fatal error cancels the run;
//! permission-denied files are skipped.

pub mod digest;
pub mod error;
pub mod pipeline;

// Re-export commonly used types
pub use digest::{digest_file, digest_reader, Fingerprint, CHUNK_SIZE};
pub use error::DigestError;
pub use pipeline::{digest_root, parse, FileResult, PipelineConfig, ResultMap};
