//! Error types for the vote encryption library

use thiserror::Error;

use crate::policy::DenialReason;

pub type Result<T> = std::result::Result<T, VoteCryptoError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoteCryptoError {
    #[error("Key generation denied: {}", .reason.message())]
    KeyGenerationDenied { reason: DenialReason },

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Invalid key size: {0} bits (must be an even number of at least 512)")]
    InvalidKeySize(u64),

    #[error("No modular inverse exists")]
    NoInverse,

    #[error("Cannot combine ciphertexts with exponents {left} and {right}")]
    MismatchedExponent { left: i64, right: i64 },

    #[error("Malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    #[error("Malformed key: {0}")]
    MalformedKey(String),

    #[error("Private key does not belong to this public key")]
    KeyMismatch,

    #[error("Plaintext out of range for modulus")]
    PlaintextOutOfRange,

    #[error("Empty list provided for batch operation")]
    EmptyBatch,

    #[error("Invalid ballot: {0}")]
    InvalidBallot(String),

    #[error("Voter {0} has already voted")]
    AlreadyVoted(u64),

    #[error("Election keys have not been generated")]
    KeysNotGenerated,

    #[error("Election keys or state changed while new keys were being generated")]
    KeyGenerationConflict,

    #[error("Votes cannot be cast while the election is closed")]
    ElectionClosed,

    #[error("Results cannot be tallied while the election is open")]
    ElectionStillOpen,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Settings store error: {0}")]
    Settings(String),
}

impl VoteCryptoError {
    /// Whether the request layer should turn this error into a message for
    /// the user rather than treating it as an operational failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            VoteCryptoError::KeyGenerationDenied { .. }
                | VoteCryptoError::MalformedCiphertext(_)
                | VoteCryptoError::InvalidBallot(_)
                | VoteCryptoError::AlreadyVoted(_)
                | VoteCryptoError::KeysNotGenerated
                | VoteCryptoError::KeyGenerationConflict
                | VoteCryptoError::ElectionClosed
                | VoteCryptoError::ElectionStillOpen
        )
    }
}
