//! Chunk-hash-of-hashes digester

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use md5::{Digest, Md5};

use super::Fingerprint;
use crate::error::DigestError;

/// Size of the read buffer; every fingerprint depends on it
pub const CHUNK_SIZE: usize = 1024;

/// Compute the fingerprint of a byte stream
///
/// Every successful read hashes the *whole* buffer and appends the hex
/// digest to an accumulator; the fingerprint is the hash of that
/// accumulator. The buffer is reused without clearing, so a short final
/// read also hashes bytes left over from the previous one. Existing
/// fingerprints depend on this quirk, so it must not be "fixed".
///
/// # Errors
/// Returns the first read error other than [`io::ErrorKind::Interrupted`].
pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<Fingerprint> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut accumulator = Vec::new();

    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let chunk = Md5::digest(buf);
                accumulator.extend_from_slice(hex::encode(chunk).as_bytes());
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    Ok(Md5::digest(&accumulator).into())
}

/// Open a file and compute its fingerprint
///
/// The file handle is released on every return path.
///
/// # Errors
/// Returns [`DigestError::Open`] if the file cannot be opened and
/// [`DigestError::Read`] if reading fails partway.
pub fn digest_file(path: &Path) -> Result<Fingerprint, DigestError> {
    let file = File::open(path).map_err(|source| DigestError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    digest_reader(file).map_err(|source| DigestError::Read {
        path: path.to_path_buf(),
        source,
    })
}
