//! Digest module: Chunked content fingerprints
//!
//! Files are read in fixed-size chunks, each chunk is hashed, and the
//! concatenated hex digests are hashed again to form the fingerprint.

mod chunked;
mod fingerprint;

pub use chunked::{digest_file, digest_reader, CHUNK_SIZE};
pub use fingerprint::Fingerprint;
