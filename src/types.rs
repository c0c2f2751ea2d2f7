//! Core types and data structures

use num_bigint::BigUint;
use std::fmt;

use crate::error::{Result, VoteCryptoError};

/// Smallest modulus size accepted for key generation.
pub const MIN_KEY_BITS: u64 = 512;

/// Settings key holding the serialized public key.
pub const PUBLIC_ELECTION_KEY: &str = "public_election_key";
/// Settings key holding the serialized private key.
pub const PRIVATE_ELECTION_KEY: &str = "private_election_key";
/// Settings key holding the election state (`open` or `closed`).
pub const ELECTION_STATE: &str = "election_state";
/// Settings key counting how many times the election has been opened.
pub const ELECTION_OPENINGS: &str = "election_openings";

/// Paillier ciphertext
///
/// `exponent` tracks fixed-point scaling of the plaintext. Votes are always
/// integers, so every ciphertext produced here carries exponent 0; the field
/// exists so stored ciphertexts keep the full `{ciphertext, exponent}` shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ciphertext {
    pub(crate) c: BigUint,
    pub(crate) exponent: i64,
}

impl Ciphertext {
    /// Create a new ciphertext with exponent 0
    pub fn new(c: BigUint) -> Self {
        Ciphertext { c, exponent: 0 }
    }

    /// Create a ciphertext with an explicit exponent
    pub fn with_exponent(c: BigUint, exponent: i64) -> Self {
        Ciphertext { c, exponent }
    }

    /// Get the raw ciphertext value in Z*_{n^2}
    pub fn value(&self) -> &BigUint {
        &self.c
    }

    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.c.to_bytes_be().len()
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ciphertext({} bytes, exponent {})",
            self.size_bytes(),
            self.exponent
        )
    }
}

/// Configuration for key generation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaillierConfig {
    /// Bit length of the modulus n; each prime gets half
    pub key_bits: u64,
    /// Number of Miller-Rabin rounds for primality testing
    pub primality_rounds: usize,
    /// Fresh prime pairs tried before key generation gives up
    pub max_keygen_attempts: usize,
    /// Random candidates tried per prime before giving up
    pub max_prime_candidates: usize,
}

impl Default for PaillierConfig {
    fn default() -> Self {
        PaillierConfig {
            key_bits: 2048,
            primality_rounds: 64,
            max_keygen_attempts: 10,
            max_prime_candidates: 100_000,
        }
    }
}

impl PaillierConfig {
    /// Default configuration with a different modulus size
    pub fn with_key_bits(key_bits: u64) -> Self {
        PaillierConfig {
            key_bits,
            ..Default::default()
        }
    }

    /// Check that the configuration can produce a usable key
    pub fn validate(&self) -> Result<()> {
        if self.key_bits < MIN_KEY_BITS || self.key_bits % 2 != 0 {
            return Err(VoteCryptoError::InvalidKeySize(self.key_bits));
        }
        if self.primality_rounds == 0 {
            return Err(VoteCryptoError::InvalidParameter(
                "primality_rounds must be positive".to_string(),
            ));
        }
        if self.max_keygen_attempts == 0 || self.max_prime_candidates == 0 {
            return Err(VoteCryptoError::InvalidParameter(
                "attempt limits must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
