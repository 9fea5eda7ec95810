//! Incremental digest registry keyed by algorithm name.
//!
//! Names are matched case-insensitively and ignore `-`/`_`, so "SHA-256",
//! "sha256" and "Sha_256" all resolve to the same accumulator. Unknown names
//! fail up front, before any I/O a caller might be about to start.

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::{Result, TransferError};

/// Algorithm names accepted by [`DigestAccumulator::new`], in canonical form.
pub const ALGORITHMS: &[&str] = &["md5", "sha1", "sha256", "sha384", "sha512", "blake3"];

/// Incremental hash state for one transfer.
///
/// Created fresh per transfer, updated once per chunk in chunk order,
/// finalized exactly once.
pub struct DigestAccumulator {
    inner: Inner,
}

enum Inner {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
    Blake3(Box<blake3::Hasher>),
}

impl DigestAccumulator {
    /// Create an accumulator for the named algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::UnsupportedDigestAlgorithm`] if the name is
    /// not in the registry.
    pub fn new(algorithm: &str) -> Result<Self> {
        let normalized: String = algorithm
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        let inner = match normalized.as_str() {
            "md5" => Inner::Md5(Md5::new()),
            "sha1" => Inner::Sha1(Sha1::new()),
            "sha256" => Inner::Sha256(Sha256::new()),
            "sha384" => Inner::Sha384(Sha384::new()),
            "sha512" => Inner::Sha512(Sha512::new()),
            "blake3" => Inner::Blake3(Box::new(blake3::Hasher::new())),
            _ => {
                return Err(TransferError::UnsupportedDigestAlgorithm(
                    algorithm.to_string(),
                ));
            }
        };
        Ok(Self { inner })
    }

    /// Feed bytes into the hash state.
    pub fn update(&mut self, bytes: &[u8]) {
        match &mut self.inner {
            Inner::Md5(h) => h.update(bytes),
            Inner::Sha1(h) => h.update(bytes),
            Inner::Sha256(h) => h.update(bytes),
            Inner::Sha384(h) => h.update(bytes),
            Inner::Sha512(h) => h.update(bytes),
            Inner::Blake3(h) => {
                h.update(bytes);
            }
        }
    }

    /// Finalize and render the digest as lowercase hex, two digits per byte.
    #[must_use]
    pub fn finalize_hex(self) -> String {
        match self.inner {
            Inner::Md5(h) => hex::encode(h.finalize()),
            Inner::Sha1(h) => hex::encode(h.finalize()),
            Inner::Sha256(h) => hex::encode(h.finalize()),
            Inner::Sha384(h) => hex::encode(h.finalize()),
            Inner::Sha512(h) => hex::encode(h.finalize()),
            Inner::Blake3(h) => h.finalize().to_hex().to_string(),
        }
    }
}

impl std::fmt::Debug for DigestAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.inner {
            Inner::Md5(_) => "md5",
            Inner::Sha1(_) => "sha1",
            Inner::Sha256(_) => "sha256",
            Inner::Sha384(_) => "sha384",
            Inner::Sha512(_) => "sha512",
            Inner::Blake3(_) => "blake3",
        };
        f.debug_struct("DigestAccumulator")
            .field("algorithm", &name)
            .finish()
    }
}
