//! Election key lifecycle on top of the settings and vote stores

use std::sync::Arc;

use crate::ballot::{Ballot, Candidate, VoteStore};
use crate::encryption::Paillier;
use crate::error::{Result, VoteCryptoError};
use crate::keys::{KeyPair, PrivateKey, PublicKey};
use crate::policy::{ElectionState, ElectionStatus, KeyPolicy};
use crate::serialization::{
    deserialize_private_key, deserialize_public_key, serialize_private_key, serialize_public_key,
};
use crate::settings::SettingsStore;
use crate::tally::{tally_election, ElectionResults};
use crate::types::{
    PaillierConfig, ELECTION_OPENINGS, ELECTION_STATE, PRIVATE_ELECTION_KEY, PUBLIC_ELECTION_KEY,
};

/// Coordinates key generation, vote casting and tallying for one election
#[derive(Debug)]
pub struct KeyManager<S: SettingsStore, V: VoteStore> {
    settings: Arc<S>,
    votes: Arc<V>,
}

impl<S: SettingsStore, V: VoteStore> Clone for KeyManager<S, V> {
    fn clone(&self) -> Self {
        KeyManager {
            settings: Arc::clone(&self.settings),
            votes: Arc::clone(&self.votes),
        }
    }
}

impl<S: SettingsStore, V: VoteStore> KeyManager<S, V> {
    pub fn new(settings: Arc<S>, votes: Arc<V>) -> Self {
        KeyManager { settings, votes }
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn votes(&self) -> &V {
        &self.votes
    }

    /// Open voting; requires election keys to exist
    ///
    /// Every opening bumps [`ELECTION_OPENINGS`] in the same write as the
    /// state, which invalidates any key generation already in flight.
    pub fn open_election(&self) -> Result<()> {
        self.public_key()?;

        loop {
            let openings = self.settings.get(ELECTION_OPENINGS)?;
            let count = parse_openings(openings.as_deref())? + 1;

            let guards = [(ELECTION_OPENINGS, openings.as_deref())];
            let updates = [
                (ELECTION_STATE, ElectionState::Open.as_str().to_string()),
                (ELECTION_OPENINGS, count.to_string()),
            ];
            if self.settings.compare_and_set(&guards, &updates)? {
                tracing::info!(opening = count, "election opened");
                return Ok(());
            }
        }
    }

    pub fn close_election(&self) -> Result<()> {
        self.settings
            .set(ELECTION_STATE, ElectionState::Closed.as_str())?;
        tracing::info!("election closed");
        Ok(())
    }

    /// Generate and persist a new election key pair
    ///
    /// Both keys are written in one compare-and-set guarded on the public
    /// key, the election state and the opening count read before the policy
    /// check. If the election was opened (and possibly closed again) or the
    /// keys were replaced during the slow generation, the new pair is
    /// discarded with [`VoteCryptoError::KeyGenerationConflict`].
    pub fn generate_election_keys(&self, config: &PaillierConfig) -> Result<PublicKey> {
        let snapshot = self.lifecycle_snapshot()?;
        KeyPolicy::evaluate(snapshot.state()?, self.votes_present()?)?;

        let keypair = KeyPair::generate_with_config(config)?;

        // Ballots admitted before the snapshot may have landed meanwhile
        KeyPolicy::request_keygen(self)?;
        let updates = [
            (PUBLIC_ELECTION_KEY, serialize_public_key(&keypair.public_key)),
            (PRIVATE_ELECTION_KEY, serialize_private_key(&keypair.private_key)),
        ];
        if !self.settings.compare_and_set(&snapshot.guards(), &updates)? {
            tracing::warn!("election settings changed during generation, discarding new pair");
            return Err(VoteCryptoError::KeyGenerationConflict);
        }

        tracing::info!(bits = keypair.bit_size(), "stored new election keys");
        Ok(keypair.public_key)
    }

    fn lifecycle_snapshot(&self) -> Result<LifecycleSnapshot> {
        Ok(LifecycleSnapshot {
            public_key: self.settings.get(PUBLIC_ELECTION_KEY)?,
            state: self.settings.get(ELECTION_STATE)?,
            openings: self.settings.get(ELECTION_OPENINGS)?,
        })
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        let stored = self
            .settings
            .get(PUBLIC_ELECTION_KEY)?
            .ok_or(VoteCryptoError::KeysNotGenerated)?;
        deserialize_public_key(&stored)
    }

    pub fn private_key(&self) -> Result<PrivateKey> {
        let stored = self
            .settings
            .get(PRIVATE_ELECTION_KEY)?
            .ok_or(VoteCryptoError::KeysNotGenerated)?;
        deserialize_private_key(&stored)
    }

    /// Encryption engine for the current election key
    pub fn engine(&self) -> Result<Paillier> {
        Ok(Paillier::new(self.public_key()?))
    }

    /// Encrypt a ballot and record it
    pub fn cast_ballot(&self, ballot: &Ballot, candidates: &[Candidate]) -> Result<()> {
        if self.election_state()? != ElectionState::Open {
            return Err(VoteCryptoError::ElectionClosed);
        }
        if self.votes.has_voted(ballot.voter_id)? {
            return Err(VoteCryptoError::AlreadyVoted(ballot.voter_id));
        }

        let records = ballot.encrypt(&self.engine()?, candidates)?;
        self.votes.record(records)?;
        tracing::debug!(voter = ballot.voter_id, "recorded ballot");
        Ok(())
    }

    /// Decrypt per-candidate totals; refused while the election is open
    pub fn tally(&self, candidates: &[Candidate]) -> Result<ElectionResults> {
        if self.election_state()? == ElectionState::Open {
            return Err(VoteCryptoError::ElectionStillOpen);
        }

        let public_key = self.public_key()?;
        let private_key = self.private_key()?;
        tally_election(candidates, self.votes.as_ref(), &public_key, &private_key)
    }
}

/// Raw settings a key commit must find unchanged
struct LifecycleSnapshot {
    public_key: Option<String>,
    state: Option<String>,
    openings: Option<String>,
}

impl LifecycleSnapshot {
    fn state(&self) -> Result<ElectionState> {
        self.state
            .as_deref()
            .unwrap_or(ElectionState::Closed.as_str())
            .parse()
    }

    fn guards(&self) -> [(&str, Option<&str>); 3] {
        [
            (PUBLIC_ELECTION_KEY, self.public_key.as_deref()),
            (ELECTION_STATE, self.state.as_deref()),
            (ELECTION_OPENINGS, self.openings.as_deref()),
        ]
    }
}

fn parse_openings(raw: Option<&str>) -> Result<u64> {
    match raw {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| {
            VoteCryptoError::Settings(format!(
                "invalid {} value `{}`",
                ELECTION_OPENINGS, value
            ))
        }),
    }
}

impl<S: SettingsStore, V: VoteStore> ElectionStatus for KeyManager<S, V> {
    fn election_state(&self) -> Result<ElectionState> {
        self.settings
            .get_or(ELECTION_STATE, ElectionState::Closed.as_str())?
            .parse()
    }

    fn votes_present(&self) -> Result<bool> {
        self.votes.has_votes()
    }
}
