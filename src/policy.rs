//! Gate on when election keys may be (re)generated
//!
//! Keys may only change while the election is closed and no vote has been
//! recorded, so every ballot of an election is encrypted under one key and a
//! new key can never be used to reinterpret ballots already cast.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, VoteCryptoError};

/// Election state as stored in the settings store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElectionState {
    Open,
    Closed,
}

impl ElectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElectionState::Open => "open",
            ElectionState::Closed => "closed",
        }
    }
}

impl fmt::Display for ElectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElectionState {
    type Err = VoteCryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "open" => Ok(ElectionState::Open),
            "closed" => Ok(ElectionState::Closed),
            other => Err(VoteCryptoError::Settings(format!(
                "unknown election state `{}`",
                other
            ))),
        }
    }
}

/// Which condition blocked key generation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DenialReason {
    ElectionOpen,
    VotesExist,
    Both,
}

impl DenialReason {
    /// Stable reason code for the request layer
    pub fn code(&self) -> &'static str {
        match self {
            DenialReason::ElectionOpen => "election_open",
            DenialReason::VotesExist => "votes_exist",
            DenialReason::Both => "both",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DenialReason::ElectionOpen => "the election is still open",
            DenialReason::VotesExist => "votes have already been cast",
            DenialReason::Both => "the election is still open and votes have already been cast",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Read access to the facts the policy depends on
pub trait ElectionStatus {
    fn election_state(&self) -> Result<ElectionState>;

    fn votes_present(&self) -> Result<bool>;
}

/// Stateless key-generation policy
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyPolicy;

impl KeyPolicy {
    /// Allow key generation iff the election is closed and no votes exist
    pub fn evaluate(state: ElectionState, votes_present: bool) -> Result<()> {
        let reason = match (state, votes_present) {
            (ElectionState::Closed, false) => return Ok(()),
            (ElectionState::Open, false) => DenialReason::ElectionOpen,
            (ElectionState::Closed, true) => DenialReason::VotesExist,
            (ElectionState::Open, true) => DenialReason::Both,
        };

        tracing::warn!(reason = reason.code(), "key generation denied");
        Err(VoteCryptoError::KeyGenerationDenied { reason })
    }

    /// Read the current status and evaluate it
    pub fn request_keygen<S: ElectionStatus + ?Sized>(status: &S) -> Result<()> {
        Self::evaluate(status.election_state()?, status.votes_present()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(ElectionState, bool);

    impl ElectionStatus for Fixed {
        fn election_state(&self) -> Result<ElectionState> {
            Ok(self.0)
        }

        fn votes_present(&self) -> Result<bool> {
            Ok(self.1)
        }
    }

    fn denial(state: ElectionState, votes: bool) -> Option<&'static str> {
        match KeyPolicy::request_keygen(&Fixed(state, votes)) {
            Ok(()) => None,
            Err(VoteCryptoError::KeyGenerationDenied { reason }) => Some(reason.code()),
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }

    #[test_log::test]
    fn test_policy_truth_table() {
        assert_eq!(denial(ElectionState::Closed, false), None);
        assert_eq!(denial(ElectionState::Open, false), Some("election_open"));
        assert_eq!(denial(ElectionState::Closed, true), Some("votes_exist"));
        assert_eq!(denial(ElectionState::Open, true), Some("both"));
    }

    #[test]
    fn test_status_errors_propagate() {
        struct Broken;

        impl ElectionStatus for Broken {
            fn election_state(&self) -> Result<ElectionState> {
                Err(VoteCryptoError::Settings("unavailable".into()))
            }

            fn votes_present(&self) -> Result<bool> {
                Ok(false)
            }
        }

        assert_eq!(
            KeyPolicy::request_keygen(&Broken),
            Err(VoteCryptoError::Settings("unavailable".into()))
        );
    }

    #[test]
    fn test_election_state_parsing() {
        assert_eq!("open".parse::<ElectionState>().unwrap(), ElectionState::Open);
        assert_eq!("closed".parse::<ElectionState>().unwrap(), ElectionState::Closed);
        assert!("Open".parse::<ElectionState>().is_err());
        assert_eq!(ElectionState::Closed.to_string(), "closed");
    }
}
