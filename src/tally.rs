//! Homomorphic tallying of stored votes
//!
//! Individual vote ciphertexts are never decrypted. Each candidate's
//! ciphertexts are folded into a single encryption of the total, and only
//! that aggregate is decrypted.

use std::collections::BTreeMap;

use crate::ballot::{Candidate, CandidateId, VoteStore};
use crate::encryption::Paillier;
use crate::error::{Result, VoteCryptoError};
use crate::homomorphic::HomomorphicOperations;
use crate::keys::{PrivateKey, PublicKey};
use crate::serialization::deserialize_ciphertext;
use crate::types::Ciphertext;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateResult {
    pub candidate_id: CandidateId,
    pub total_votes: u64,
}

/// Totals for every candidate standing for one position
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionResults {
    pub position: String,
    pub level: u16,
    pub candidates: Vec<CandidateResult>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElectionResults {
    /// Ordered by position level, then position name
    pub positions: Vec<PositionResults>,
}

impl ElectionResults {
    pub fn total_for(&self, candidate_id: CandidateId) -> Option<u64> {
        self.positions
            .iter()
            .flat_map(|p| p.candidates.iter())
            .find(|c| c.candidate_id == candidate_id)
            .map(|c| c.total_votes)
    }
}

/// Sum one candidate's serialized votes
///
/// No votes means a total of zero; nothing is decrypted in that case.
pub fn tally_candidate(
    ciphertexts: &[String],
    public_key: &PublicKey,
    private_key: &PrivateKey,
) -> Result<u64> {
    if !private_key.matches(public_key) {
        return Err(VoteCryptoError::KeyMismatch);
    }
    if ciphertexts.is_empty() {
        return Ok(0);
    }

    let parsed = ciphertexts
        .iter()
        .map(|s| deserialize_ciphertext(s))
        .collect::<Result<Vec<Ciphertext>>>()?;

    let engine = Paillier::new(public_key.clone());
    let sum = engine.aggregate(&parsed)?;
    private_key.decrypt_u64(&sum)
}

/// Tally every candidate from the vote store, grouped by position
pub fn tally_election<V: VoteStore + ?Sized>(
    candidates: &[Candidate],
    store: &V,
    public_key: &PublicKey,
    private_key: &PrivateKey,
) -> Result<ElectionResults> {
    let mut positions: BTreeMap<(u16, String), Vec<CandidateResult>> = BTreeMap::new();

    for candidate in candidates {
        let ciphertexts = store.ciphertexts_for(candidate.id)?;
        let total_votes = tally_candidate(&ciphertexts, public_key, private_key)?;

        positions
            .entry((candidate.position_level, candidate.position.clone()))
            .or_default()
            .push(CandidateResult {
                candidate_id: candidate.id,
                total_votes,
            });
    }

    tracing::info!(candidates = candidates.len(), "tallied election");

    Ok(ElectionResults {
        positions: positions
            .into_iter()
            .map(|((level, position), candidates)| PositionResults {
                position,
                level,
                candidates,
            })
            .collect(),
    })
}
