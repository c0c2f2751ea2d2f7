//! # Paillier Vote Encryption Library
//!
//! This library encrypts election ballots under the additively homomorphic
//! Paillier cryptosystem, so per-candidate totals can be computed without
//! decrypting any individual vote:
//! - Key generation from two random primes (g = n + 1)
//! - Encryption of 0/1 votes and homomorphic addition of ciphertexts
//! - Decryption of aggregated tallies only
//! - A policy guard that freezes keys once an election opens or votes exist
//! - Canonical JSON encoding of ciphertexts and keys
//!
//! ## Example
//!
//! ```rust
//! use paillier_vote::{HomomorphicOperations, KeyPair, Paillier};
//!
//! // Generate keys
//! let keypair = KeyPair::generate(512).unwrap();
//! let paillier = Paillier::new(keypair.public_key.clone());
//!
//! // Encrypt three ballots for one candidate
//! let ballots: Vec<_> = [true, false, true]
//!     .iter()
//!     .map(|vote| paillier.encrypt_vote(*vote).unwrap())
//!     .collect();
//!
//! // Fold them into a single encrypted total
//! let total = paillier.aggregate(&ballots).unwrap();
//!
//! // Only the total is ever decrypted
//! assert_eq!(keypair.private_key.decrypt_u64(&total).unwrap(), 2);
//! ```

pub mod ballot;
pub mod decryption;
pub mod encryption;
pub mod error;
pub mod homomorphic;
pub mod key_manager;
pub mod keys;
pub mod policy;
pub mod serialization;
pub mod settings;
pub mod tally;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use ballot::{Ballot, Candidate, CandidateId, MemoryVoteStore, VoteRecord, VoteStore, VoterId};
pub use encryption::Paillier;
pub use error::{Result, VoteCryptoError};
pub use homomorphic::HomomorphicOperations;
pub use key_manager::KeyManager;
pub use keys::{KeyPair, PrivateKey, PublicKey};
pub use policy::{DenialReason, ElectionState, ElectionStatus, KeyPolicy};
pub use serialization::{
    deserialize_ciphertext, deserialize_private_key, deserialize_public_key,
    serialize_ciphertext, serialize_private_key, serialize_public_key,
};
pub use settings::{MemorySettings, SettingsStore};
pub use tally::{tally_candidate, tally_election, CandidateResult, ElectionResults, PositionResults};
pub use types::{
    Ciphertext, PaillierConfig, ELECTION_OPENINGS, ELECTION_STATE, MIN_KEY_BITS,
    PRIVATE_ELECTION_KEY, PUBLIC_ELECTION_KEY,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
