// src/miner/hasher.rs
//! Proof-of-work hash function seam
//!
//! Workers treat the hash as an opaque pure function over the full work
//! buffer. [`Blake2Hasher`] is the reference implementation shipped with the
//! crate; a chain-specific function plugs in behind [`PowHasher`].

use blake2::{Blake2s256, Digest};

/// Common interface for proof-of-work hash functions
pub trait PowHasher: Send + Sync {
    /// Hashes `input` into a 32-byte digest
    fn hash(&self, input: &[u8]) -> [u8; 32];

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Blake2s-256 reference hasher
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake2Hasher;

impl PowHasher for Blake2Hasher {
    fn hash(&self, input: &[u8]) -> [u8; 32] {
        Blake2s256::digest(input).into()
    }

    fn name(&self) -> &'static str {
        "blake2s256"
    }
}
