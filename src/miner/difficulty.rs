// src/miner/difficulty.rs
//! Difficulty comparison
//!
//! A digest is read as a 256-bit little-endian unsigned integer and accepted
//! when it is strictly below `2^256 / difficulty`. Difficulty 1 therefore
//! accepts every digest, and a difficulty of `2^256 - 1` accepts only zero.

use crate::utils::error::MinerError;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::str::FromStr;

/// Parsed difficulty with its precomputed acceptance bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difficulty {
    value: BigUint,
    bound: BigUint,
}

impl Difficulty {
    /// Builds a difficulty from an integer value
    ///
    /// # Errors
    /// `DifficultyError` for zero, which has no finite bound.
    pub fn new(value: BigUint) -> Result<Self, MinerError> {
        if value.is_zero() {
            return Err(MinerError::DifficultyError("difficulty is zero".into()));
        }
        let bound = (BigUint::one() << 256u32) / &value;
        Ok(Difficulty { value, bound })
    }

    /// Numeric difficulty
    pub fn value(&self) -> &BigUint {
        &self.value
    }

    /// Whether `digest` meets this difficulty
    pub fn accepts(&self, digest: &[u8; 32]) -> bool {
        BigUint::from_bytes_le(digest) < self.bound
    }
}

impl FromStr for Difficulty {
    type Err = MinerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MinerError::DifficultyError(format!(
                "'{}' is not a decimal integer",
                s
            )));
        }
        let value = BigUint::parse_bytes(trimmed.as_bytes(), 10).ok_or_else(|| {
            MinerError::DifficultyError(format!("'{}' is not a decimal integer", s))
        })?;
        Difficulty::new(value)
    }
}

/// Checks `digest` against a decimal difficulty string
///
/// Pure helper around [`Difficulty`]; parse failures are returned, never
/// folded into an accept or reject.
pub fn check_pow(digest: &[u8; 32], difficulty: &str) -> Result<bool, MinerError> {
    Ok(difficulty.parse::<Difficulty>()?.accepts(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_DIGEST: &str =
        "115792089237316195423570985008687907853269984665640564039457584007913129639935";

    fn digest_from_u64(v: u64) -> [u8; 32] {
        let mut d = [0u8; 32];
        d[..8].copy_from_slice(&v.to_le_bytes());
        d
    }

    #[test]
    fn test_difficulty_one_accepts_everything() {
        assert!(check_pow(&[0xff; 32], "1").unwrap());
        assert!(check_pow(&[0x00; 32], "1").unwrap());
        assert!(check_pow(&digest_from_u64(12345), "1").unwrap());
    }

    #[test]
    fn test_max_difficulty_accepts_only_zero() {
        assert!(check_pow(&[0u8; 32], MAX_DIGEST).unwrap());
        assert!(!check_pow(&digest_from_u64(1), MAX_DIGEST).unwrap());
        assert!(!check_pow(&[0xff; 32], MAX_DIGEST).unwrap());
    }

    #[test]
    fn test_digest_is_little_endian() {
        // 2^256 / 2^248 = 256: value 255 passes, value 256 does not.
        let diff: Difficulty = (BigUint::one() << 248u32).to_string().parse().unwrap();
        assert!(diff.accepts(&digest_from_u64(255)));
        assert!(!diff.accepts(&digest_from_u64(256)));

        let mut high_byte_set = [0u8; 32];
        high_byte_set[31] = 1;
        assert!(!diff.accepts(&high_byte_set));
    }

    #[test]
    fn test_harder_difficulty_shrinks_accepted_range() {
        let difficulties = ["1", "2", "3", "1000", "65536", "99999999999999999999"];
        let digests: Vec<[u8; 32]> = [0u64, 1, 7, 1 << 40, u64::MAX]
            .iter()
            .map(|&v| {
                let mut d = digest_from_u64(v);
                d[31] = (v % 251) as u8;
                d
            })
            .chain([[0xffu8; 32], [0x80; 32], [0x01; 32]])
            .collect();

        for pair in difficulties.windows(2) {
            let easy: Difficulty = pair[0].parse().unwrap();
            let hard: Difficulty = pair[1].parse().unwrap();
            for d in &digests {
                if hard.accepts(d) {
                    assert!(easy.accepts(d), "{} accepts but {} rejects", pair[1], pair[0]);
                }
            }
        }
    }

    #[test]
    fn test_parse_errors_are_hard_errors() {
        for bad in ["", "  ", "-5", "12a", "1.5", "0x10", "0"] {
            assert!(
                matches!(check_pow(&[0; 32], bad), Err(MinerError::DifficultyError(_))),
                "'{}' should fail to parse",
                bad
            );
        }
    }

    #[test]
    fn test_whitespace_tolerated() {
        let d: Difficulty = " 42 ".parse().unwrap();
        assert_eq!(d.value(), &BigUint::from(42u32));
    }
}
