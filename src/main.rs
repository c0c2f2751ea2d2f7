use std::sync::Arc;

use paillier_vote::{
    Ballot, Candidate, ElectionStatus, KeyManager, MemorySettings, MemoryVoteStore,
    PaillierConfig, Result, VoteCryptoError,
};
use tracing_subscriber::EnvFilter;

// Example usage
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Paillier Encrypted Election Demo ===\n");

    let manager = KeyManager::new(
        Arc::new(MemorySettings::new()),
        Arc::new(MemoryVoteStore::new()),
    );
    let config = PaillierConfig::with_key_bits(1024);

    let candidates = vec![
        Candidate::new(1, "President", 1),
        Candidate::new(2, "President", 1),
        Candidate::new(3, "Secretary", 2),
        Candidate::new(4, "Secretary", 2),
    ];

    // ========== KEY GENERATION ==========
    println!("--- Key Generation ---");
    let public_key = manager.generate_election_keys(&config)?;
    println!("Generated {}", public_key);
    println!("Election state: {}", manager.election_state()?);

    // ========== VOTING ==========
    println!("\n--- Voting ---");
    manager.open_election()?;

    let ballots = [
        Ballot::new(100, vec![1, 3]),
        Ballot::new(101, vec![2, 3]),
        Ballot::new(102, vec![1, 4]),
        Ballot::new(103, vec![1]),
    ];
    for ballot in &ballots {
        manager.cast_ballot(ballot, &candidates)?;
        println!("✓ Ballot cast by voter {}", ballot.voter_id);
    }

    // Rejected submissions
    for (label, ballot) in [
        ("double vote", Ballot::new(100, vec![2])),
        ("duplicate candidate", Ballot::new(104, vec![2, 2])),
        ("unknown candidate", Ballot::new(105, vec![9])),
    ] {
        match manager.cast_ballot(&ballot, &candidates) {
            Err(err) if err.is_user_facing() => println!("✗ Rejected {}: {}", label, err),
            other => other?,
        }
    }

    // ========== KEY POLICY ==========
    println!("\n--- Key Policy ---");
    match manager.generate_election_keys(&config) {
        Err(VoteCryptoError::KeyGenerationDenied { reason }) => {
            println!("Key regeneration denied ({}): {}", reason.code(), reason.message())
        }
        other => {
            other?;
        }
    }

    // ========== TALLY ==========
    println!("\n--- Tally ---");
    manager.close_election()?;
    let results = manager.tally(&candidates)?;

    for position in &results.positions {
        println!("{}:", position.position);
        for candidate in &position.candidates {
            println!(
                "  candidate {}: {} votes",
                candidate.candidate_id, candidate.total_votes
            );
        }
    }

    Ok(())
}
