// src/miner/work.rs
//! Per-worker work buffer
//!
//! Layout of the 48-byte buffer (offsets from the start):
//!
//! ```text
//!  0          low nibble = format version (must be 1)
//!  36..48     salt region, 12 bytes
//!    43..47   big-endian u32 nonce
//!    47       worker id
//! ```
//!
//! The salt is written once per worker; the nonce and id are laid over it,
//! leaving bytes 36..43 of random salt per worker.

use crate::utils::error::MinerError;
use rand::RngCore;

/// Total length of a work buffer in bytes
pub const WORK_SIZE: usize = 48;

/// The only format version this miner understands
pub const SUPPORTED_VERSION: u8 = 1;

/// Length of the trailing salt region
pub const SALT_LEN: usize = 12;

const SALT_OFFSET: usize = WORK_SIZE - SALT_LEN;
const NONCE_OFFSET: usize = WORK_SIZE - 5;
const ID_OFFSET: usize = WORK_SIZE - 1;

/// Fixed-size buffer a worker mutates and hashes
///
/// Owned by exactly one worker; the salt and id are fixed for the worker's
/// lifetime, the rest is reloaded from every new job template.
#[derive(Debug, Clone)]
pub struct WorkBuffer {
    bytes: [u8; WORK_SIZE],
    salt: [u8; SALT_LEN],
    worker_id: u8,
}

impl WorkBuffer {
    /// Creates a buffer for `worker_id` with an explicit salt
    pub fn new(worker_id: u8, salt: [u8; SALT_LEN]) -> Self {
        WorkBuffer {
            bytes: [0u8; WORK_SIZE],
            salt,
            worker_id,
        }
    }

    /// Creates a buffer for `worker_id` with a fresh random salt
    pub fn with_random_salt(worker_id: u8) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut salt);
        Self::new(worker_id, salt)
    }

    /// Decodes a hex job blob into the buffer
    ///
    /// Checks length and format version, then stamps the salt and worker id.
    /// On error the buffer content is unspecified and must be reloaded
    /// before hashing.
    pub fn load_hex(&mut self, blob: &str) -> Result<(), MinerError> {
        if blob.len() != WORK_SIZE * 2 {
            return Err(MinerError::InvalidWork(format!(
                "blob is {} hex chars, expected {}",
                blob.len(),
                WORK_SIZE * 2
            )));
        }
        hex::decode_to_slice(blob, &mut self.bytes)?;
        self.finish_load()
    }

    /// Loads an already decoded blob
    pub fn load(&mut self, blob: &[u8]) -> Result<(), MinerError> {
        if blob.len() != WORK_SIZE {
            return Err(MinerError::InvalidWork(format!(
                "blob is {} bytes, expected {}",
                blob.len(),
                WORK_SIZE
            )));
        }
        self.bytes.copy_from_slice(blob);
        self.finish_load()
    }

    fn finish_load(&mut self) -> Result<(), MinerError> {
        let version = self.bytes[0] & 0x0f;
        if version != SUPPORTED_VERSION {
            return Err(MinerError::InvalidWork(format!(
                "unsupported work version {}",
                version
            )));
        }
        self.bytes[SALT_OFFSET..].copy_from_slice(&self.salt);
        self.bytes[ID_OFFSET] = self.worker_id;
        Ok(())
    }

    /// Writes the nonce big-endian at its fixed offset
    #[inline]
    pub fn set_nonce(&mut self, nonce: u32) {
        self.bytes[NONCE_OFFSET..ID_OFFSET].copy_from_slice(&nonce.to_be_bytes());
    }

    /// Nonce currently in the buffer
    pub fn nonce(&self) -> u32 {
        let mut be = [0u8; 4];
        be.copy_from_slice(&self.bytes[NONCE_OFFSET..ID_OFFSET]);
        u32::from_be_bytes(be)
    }

    /// Worker id stamped into the last byte
    pub fn worker_id(&self) -> u8 {
        self.worker_id
    }

    /// Raw buffer handed to the hash function
    pub fn as_bytes(&self) -> &[u8; WORK_SIZE] {
        &self.bytes
    }

    /// Lowercase hex of the full buffer, as submitted
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}
