//! Homomorphic operations on ciphertexts

use num_bigint::BigUint;
use num_traits::One;

use crate::encryption::Paillier;
use crate::error::{Result, VoteCryptoError};
use crate::types::Ciphertext;
use crate::utils::mod_exp;

/// Trait for additively homomorphic operations
pub trait HomomorphicOperations {
    /// Enc(a) + Enc(b) = Enc(a + b), without the private key
    fn homomorphic_add(&self, ct1: &Ciphertext, ct2: &Ciphertext) -> Result<Ciphertext>;

    /// Enc(a) + b for a known constant b
    fn homomorphic_add_plain(&self, ct: &Ciphertext, scalar: &BigUint) -> Result<Ciphertext>;

    /// Enc(a) * k for a known constant k
    fn homomorphic_scalar_mul(&self, ct: &Ciphertext, scalar: &BigUint) -> Result<Ciphertext>;

    /// Fold many ciphertexts into one encrypting their sum
    fn aggregate(&self, ciphertexts: &[Ciphertext]) -> Result<Ciphertext>;
}

impl HomomorphicOperations for Paillier {
    fn homomorphic_add(&self, ct1: &Ciphertext, ct2: &Ciphertext) -> Result<Ciphertext> {
        if ct1.exponent != ct2.exponent {
            return Err(VoteCryptoError::MismatchedExponent {
                left: ct1.exponent,
                right: ct2.exponent,
            });
        }
        self.check_ciphertext(ct1)?;
        self.check_ciphertext(ct2)?;

        let c = (&ct1.c * &ct2.c) % &self.public_key.n_squared;
        Ok(Ciphertext::with_exponent(c, ct1.exponent))
    }

    fn homomorphic_add_plain(&self, ct: &Ciphertext, scalar: &BigUint) -> Result<Ciphertext> {
        self.check_ciphertext(ct)?;
        let n = &self.public_key.n;
        let n_squared = &self.public_key.n_squared;

        // Deterministic Enc(b) = g^b = 1 + b*n; the sum keeps ct's randomness
        let g_b = (BigUint::one() + (scalar % n) * n) % n_squared;
        Ok(Ciphertext::with_exponent(
            (&ct.c * g_b) % n_squared,
            ct.exponent,
        ))
    }

    fn homomorphic_scalar_mul(&self, ct: &Ciphertext, scalar: &BigUint) -> Result<Ciphertext> {
        self.check_ciphertext(ct)?;
        let c = mod_exp(&ct.c, scalar, &self.public_key.n_squared);
        Ok(Ciphertext::with_exponent(c, ct.exponent))
    }

    fn aggregate(&self, ciphertexts: &[Ciphertext]) -> Result<Ciphertext> {
        let (first, rest) = ciphertexts
            .split_first()
            .ok_or(VoteCryptoError::EmptyBatch)?;

        self.check_ciphertext(first)?;
        rest.iter()
            .try_fold(first.clone(), |acc, ct| self.homomorphic_add(&acc, ct))
    }
}
