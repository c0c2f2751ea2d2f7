//! Ballot encryption and the vote record store

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::encryption::Paillier;
use crate::error::{Result, VoteCryptoError};
use crate::serialization::serialize_ciphertext;

pub type VoterId = u64;
pub type CandidateId = u64;

/// A candidate standing for a position
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub id: CandidateId,
    pub position: String,
    /// Positions are listed in ascending level order
    pub position_level: u16,
}

impl Candidate {
    pub fn new(id: CandidateId, position: impl Into<String>, position_level: u16) -> Self {
        Candidate {
            id,
            position: position.into(),
            position_level,
        }
    }
}

/// One encrypted 0/1 for a (voter, candidate) pair
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteRecord {
    pub voter_id: VoterId,
    pub candidate_id: CandidateId,
    /// Serialized ciphertext, see [`crate::serialization`]
    pub ciphertext: String,
}

/// Persistence for vote records
pub trait VoteStore: Send + Sync {
    /// Whether any vote has been recorded for the active election
    fn has_votes(&self) -> Result<bool>;

    fn has_voted(&self, voter_id: VoterId) -> Result<bool>;

    /// Store all records or none of them
    fn record(&self, records: Vec<VoteRecord>) -> Result<()>;

    fn ciphertexts_for(&self, candidate_id: CandidateId) -> Result<Vec<String>>;
}

#[derive(Debug, Default)]
struct VoteTable {
    records: Vec<VoteRecord>,
    voters: HashSet<VoterId>,
    ciphertexts: HashSet<String>,
    by_candidate: HashMap<CandidateId, Vec<usize>>,
}

/// In-process vote store
///
/// Enforces one record per (voter, candidate) pair, one ballot per voter and
/// unique ciphertexts across the election.
#[derive(Debug, Default)]
pub struct MemoryVoteStore {
    table: RwLock<VoteTable>,
}

impl MemoryVoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.table.read().map_err(|_| poisoned())?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned() -> VoteCryptoError {
    VoteCryptoError::Settings("vote store lock poisoned".to_string())
}

impl VoteStore for MemoryVoteStore {
    fn has_votes(&self) -> Result<bool> {
        Ok(!self.is_empty()?)
    }

    fn has_voted(&self, voter_id: VoterId) -> Result<bool> {
        let table = self.table.read().map_err(|_| poisoned())?;
        Ok(table.voters.contains(&voter_id))
    }

    fn record(&self, records: Vec<VoteRecord>) -> Result<()> {
        let mut table = self.table.write().map_err(|_| poisoned())?;

        let mut pairs = HashSet::new();
        let mut ciphertexts = HashSet::new();
        for record in &records {
            if table.voters.contains(&record.voter_id) {
                return Err(VoteCryptoError::AlreadyVoted(record.voter_id));
            }
            if !pairs.insert((record.voter_id, record.candidate_id)) {
                return Err(VoteCryptoError::InvalidBallot(format!(
                    "duplicate record for candidate {}",
                    record.candidate_id
                )));
            }
            if table.ciphertexts.contains(&record.ciphertext)
                || !ciphertexts.insert(record.ciphertext.as_str())
            {
                return Err(VoteCryptoError::InvalidBallot(
                    "duplicate ciphertext".to_string(),
                ));
            }
        }

        for record in records {
            let index = table.records.len();
            table.voters.insert(record.voter_id);
            table.ciphertexts.insert(record.ciphertext.clone());
            table
                .by_candidate
                .entry(record.candidate_id)
                .or_default()
                .push(index);
            table.records.push(record);
        }
        Ok(())
    }

    fn ciphertexts_for(&self, candidate_id: CandidateId) -> Result<Vec<String>> {
        let table = self.table.read().map_err(|_| poisoned())?;
        Ok(table
            .by_candidate
            .get(&candidate_id)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| table.records[i].ciphertext.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// A voter's approve selections, one entry per approved candidate
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ballot {
    pub voter_id: VoterId,
    pub selected: Vec<CandidateId>,
}

impl Ballot {
    pub fn new(voter_id: VoterId, selected: Vec<CandidateId>) -> Self {
        Ballot { voter_id, selected }
    }

    /// Check selections against the candidate list
    ///
    /// Rejects duplicate selections and ids that match no candidate.
    pub fn validate(&self, candidates: &[Candidate]) -> Result<()> {
        let known: HashSet<CandidateId> = candidates.iter().map(|c| c.id).collect();
        let mut seen = HashSet::new();

        for id in &self.selected {
            if !seen.insert(*id) {
                return Err(VoteCryptoError::InvalidBallot(format!(
                    "candidate {} selected more than once",
                    id
                )));
            }
            if !known.contains(id) {
                return Err(VoteCryptoError::InvalidBallot(format!(
                    "candidate {} does not exist",
                    id
                )));
            }
        }
        Ok(())
    }

    /// Encrypt the ballot into one record per candidate
    ///
    /// Unselected candidates get an encrypted 0, so the set of records
    /// carries no information about the voter's choices.
    pub fn encrypt(&self, engine: &Paillier, candidates: &[Candidate]) -> Result<Vec<VoteRecord>> {
        self.validate(candidates)?;
        let selected: HashSet<CandidateId> = self.selected.iter().copied().collect();

        candidates
            .iter()
            .map(|candidate| -> Result<VoteRecord> {
                let ct = engine.encrypt_vote(selected.contains(&candidate.id))?;
                Ok(VoteRecord {
                    voter_id: self.voter_id,
                    candidate_id: candidate.id,
                    ciphertext: serialize_ciphertext(&ct),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPair;
    use crate::serialization::deserialize_ciphertext;

    fn candidates() -> Vec<Candidate> {
        vec![
            Candidate::new(1, "President", 1),
            Candidate::new(2, "President", 1),
            Candidate::new(3, "Treasurer", 2),
        ]
    }

    fn record(voter_id: VoterId, candidate_id: CandidateId, ct: &str) -> VoteRecord {
        VoteRecord {
            voter_id,
            candidate_id,
            ciphertext: ct.to_string(),
        }
    }

    #[test]
    fn test_ballot_validation() {
        let candidates = candidates();
        assert!(Ballot::new(1, vec![1, 3]).validate(&candidates).is_ok());
        assert!(Ballot::new(1, vec![]).validate(&candidates).is_ok());
        assert!(matches!(
            Ballot::new(1, vec![1, 1]).validate(&candidates),
            Err(VoteCryptoError::InvalidBallot(_))
        ));
        assert!(matches!(
            Ballot::new(1, vec![9]).validate(&candidates),
            Err(VoteCryptoError::InvalidBallot(_))
        ));
    }

    #[test]
    fn test_ballot_encrypts_every_candidate() {
        let keypair = KeyPair::generate(512).unwrap();
        let engine = Paillier::new(keypair.public_key.clone());

        let records = Ballot::new(7, vec![2]).encrypt(&engine, &candidates()).unwrap();
        assert_eq!(records.len(), 3);

        let plaintexts: Vec<(CandidateId, u64)> = records
            .iter()
            .map(|r| {
                let ct = deserialize_ciphertext(&r.ciphertext).unwrap();
                (r.candidate_id, keypair.private_key.decrypt_u64(&ct).unwrap())
            })
            .collect();
        assert_eq!(plaintexts, vec![(1, 0), (2, 1), (3, 0)]);
        assert!(records.iter().all(|r| r.voter_id == 7));
    }

    #[test]
    fn test_store_rejects_second_ballot() {
        let store = MemoryVoteStore::new();
        assert!(!store.has_votes().unwrap());

        store.record(vec![record(1, 1, "a"), record(1, 2, "b")]).unwrap();
        assert!(store.has_votes().unwrap());
        assert!(store.has_voted(1).unwrap());
        assert!(!store.has_voted(2).unwrap());

        assert_eq!(
            store.record(vec![record(1, 3, "c")]),
            Err(VoteCryptoError::AlreadyVoted(1))
        );
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_store_is_all_or_nothing() {
        let store = MemoryVoteStore::new();
        store.record(vec![record(1, 1, "a")]).unwrap();

        // Second record reuses a stored ciphertext
        let result = store.record(vec![record(2, 1, "b"), record(2, 2, "a")]);
        assert!(matches!(result, Err(VoteCryptoError::InvalidBallot(_))));
        assert!(!store.has_voted(2).unwrap());

        let result = store.record(vec![record(3, 1, "x"), record(3, 1, "y")]);
        assert!(matches!(result, Err(VoteCryptoError::InvalidBallot(_))));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_ciphertexts_for_candidate() {
        let store = MemoryVoteStore::new();
        store.record(vec![record(1, 1, "a"), record(1, 2, "b")]).unwrap();
        store.record(vec![record(2, 1, "c"), record(2, 2, "d")]).unwrap();

        assert_eq!(store.ciphertexts_for(1).unwrap(), vec!["a", "c"]);
        assert_eq!(store.ciphertexts_for(2).unwrap(), vec!["b", "d"]);
        assert!(store.ciphertexts_for(3).unwrap().is_empty());
    }
}
