//! Core Paillier encryption operations

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{thread_rng, CryptoRng, RngCore};

use crate::error::{Result, VoteCryptoError};
use crate::keys::PublicKey;
use crate::types::Ciphertext;
use crate::utils::{mod_exp, random_coprime};

/// Paillier encryption engine bound to one election's public key
///
/// Holds only immutable key material, so a shared reference can encrypt from
/// many threads at once.
#[derive(Clone, Debug)]
pub struct Paillier {
    pub public_key: PublicKey,
}

impl Paillier {
    pub fn new(public_key: PublicKey) -> Self {
        Paillier { public_key }
    }

    /// Encrypt a plaintext using the thread-local CSPRNG
    pub fn encrypt(&self, plaintext: &BigUint) -> Result<Ciphertext> {
        self.encrypt_with_rng(plaintext, &mut thread_rng())
    }

    /// Encrypt a single approve (1) or disapprove (0) vote
    pub fn encrypt_vote(&self, approve: bool) -> Result<Ciphertext> {
        let plaintext = if approve {
            BigUint::one()
        } else {
            BigUint::zero()
        };
        self.encrypt(&plaintext)
    }

    /// Encrypt with blinding factor drawn from `rng`
    pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
        &self,
        plaintext: &BigUint,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        self.check_plaintext(plaintext)?;
        let r = random_coprime(&self.public_key.n, rng)?;
        self.encrypt_with_randomness(plaintext, &r)
    }

    /// Encrypt with a caller-chosen blinding factor r (for known-answer tests)
    ///
    /// c = g^m * r^n mod n^2
    pub fn encrypt_with_randomness(&self, plaintext: &BigUint, r: &BigUint) -> Result<Ciphertext> {
        self.check_plaintext(plaintext)?;

        let n = &self.public_key.n;
        if r.is_zero() || r >= n || !r.gcd(n).is_one() {
            return Err(VoteCryptoError::InvalidParameter(
                "blinding factor must be a unit in [1, n)".to_string(),
            ));
        }

        let n_squared = &self.public_key.n_squared;
        // g = n + 1, so g^m = 1 + m*n mod n^2
        let g_m = (BigUint::one() + plaintext * n) % n_squared;
        let r_n = mod_exp(r, n, n_squared);

        Ok(Ciphertext::new((g_m * r_n) % n_squared))
    }

    /// Produce a fresh encryption of the same plaintext
    pub fn rerandomize(&self, ciphertext: &Ciphertext) -> Result<Ciphertext> {
        self.check_ciphertext(ciphertext)?;

        let r = random_coprime(&self.public_key.n, &mut thread_rng())?;
        let n_squared = &self.public_key.n_squared;
        let r_n = mod_exp(&r, &self.public_key.n, n_squared);

        Ok(Ciphertext::with_exponent(
            (&ciphertext.c * r_n) % n_squared,
            ciphertext.exponent,
        ))
    }

    fn check_plaintext(&self, plaintext: &BigUint) -> Result<()> {
        if plaintext >= &self.public_key.n {
            return Err(VoteCryptoError::PlaintextOutOfRange);
        }
        Ok(())
    }

    /// Reject ciphertext values that cannot be elements of Z*_{n^2}
    pub(crate) fn check_ciphertext(&self, ciphertext: &Ciphertext) -> Result<()> {
        if ciphertext.c.is_zero() || ciphertext.c >= self.public_key.n_squared {
            return Err(VoteCryptoError::MalformedCiphertext(
                "value outside [1, n^2)".to_string(),
            ));
        }
        Ok(())
    }
}
