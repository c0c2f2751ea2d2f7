//! Decryption of tallied ciphertexts
//!
//! Nothing here can tell whether a ciphertext was produced under the public
//! key paired with this private key; a foreign ciphertext decrypts to an
//! unrelated value. Callers track key association out of band.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::error::{Result, VoteCryptoError};
use crate::keys::PrivateKey;
use crate::types::Ciphertext;
use crate::utils::{l_function, mod_exp};

impl PrivateKey {
    /// Recover the plaintext: m = L(c^lambda mod n^2) * mu mod n
    pub fn decrypt(&self, ciphertext: &Ciphertext) -> Result<BigUint> {
        let n = &self.public_key.n;
        let n_squared = &self.public_key.n_squared;

        if ciphertext.exponent != 0 {
            return Err(VoteCryptoError::MismatchedExponent {
                left: ciphertext.exponent,
                right: 0,
            });
        }
        if ciphertext.c.is_zero() || &ciphertext.c >= n_squared {
            return Err(VoteCryptoError::MalformedCiphertext(
                "value outside [1, n^2)".to_string(),
            ));
        }

        let u = l_function(&mod_exp(&ciphertext.c, &self.lambda, n_squared), n);
        Ok((u * &self.mu) % n)
    }

    /// Decrypt a vote count, which must fit in a u64
    pub fn decrypt_u64(&self, ciphertext: &Ciphertext) -> Result<u64> {
        self.decrypt(ciphertext)?
            .to_u64()
            .ok_or(VoteCryptoError::PlaintextOutOfRange)
    }
}
