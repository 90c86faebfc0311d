//! Fixed-size fingerprint value

use std::fmt;

use md5::digest::Output;
use md5::Md5;

/// Length of a fingerprint in bytes
pub const FINGERPRINT_LEN: usize = 16;

/// Opaque fingerprint of one file's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Lowercase hex encoding, as printed and stored in result maps
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw fingerprint bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }
}

impl From<Output<Md5>> for Fingerprint {
    fn from(output: Output<Md5>) -> Self {
        Self(output.into())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
