//! Key generation and management

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use rand::{thread_rng, CryptoRng, RngCore};
use std::fmt;

use crate::error::{Result, VoteCryptoError};
use crate::types::{PaillierConfig, MIN_KEY_BITS};
use crate::utils::{generate_prime, l_function, lcm, mod_exp, mod_inverse};

/// Paillier public key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub(crate) n: BigUint,         // Modulus p*q
    pub(crate) g: BigUint,         // Generator, always n + 1
    pub(crate) n_squared: BigUint, // Ciphertext modulus
}

impl PublicKey {
    /// Create a public key for modulus `n` with the standard generator n + 1
    pub fn new(n: BigUint) -> Self {
        let g = &n + BigUint::one();
        let n_squared = &n * &n;
        PublicKey { n, g, n_squared }
    }

    /// Rebuild a public key from stored components
    ///
    /// Unlike [`PublicKey::new`], this refuses moduli below [`MIN_KEY_BITS`].
    pub fn from_parts(n: BigUint, g: BigUint) -> Result<Self> {
        if n.bits() < MIN_KEY_BITS {
            return Err(VoteCryptoError::MalformedKey(format!(
                "modulus has {} bits, at least {} required",
                n.bits(),
                MIN_KEY_BITS
            )));
        }
        let key = PublicKey::new(n);
        if key.g != g {
            return Err(VoteCryptoError::MalformedKey(
                "generator must equal n + 1".to_string(),
            ));
        }
        key.validate()?;
        Ok(key)
    }

    /// Get the modulus n
    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// Get the generator g
    pub fn generator(&self) -> &BigUint {
        &self.g
    }

    /// Get n^2, the modulus ciphertexts live under
    pub fn modulus_squared(&self) -> &BigUint {
        &self.n_squared
    }

    /// Get the bit size of the modulus
    pub fn bit_size(&self) -> u64 {
        self.n.bits()
    }

    /// Largest plaintext this key can encrypt
    pub fn max_plaintext(&self) -> BigUint {
        &self.n - BigUint::one()
    }

    /// Validate the public key
    pub fn validate(&self) -> Result<()> {
        if self.n <= BigUint::one() || self.n.is_even() {
            return Err(VoteCryptoError::MalformedKey(
                "modulus n must be an odd integer > 1".to_string(),
            ));
        }

        if self.g != &self.n + BigUint::one() || self.n_squared != &self.n * &self.n {
            return Err(VoteCryptoError::MalformedKey(
                "derived components do not match n".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({} bits)", self.bit_size())
    }
}

/// Paillier private key
///
/// Holds the factorization of n along with the derived decryption constants
/// `lambda = lcm(p-1, q-1)` and `mu = L(g^lambda mod n^2)^-1 mod n`.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pub(crate) p: BigUint,
    pub(crate) q: BigUint,
    pub(crate) lambda: BigUint,
    pub(crate) mu: BigUint,
    pub(crate) public_key: PublicKey,
}

impl PrivateKey {
    /// Derive a private key from the two prime factors of n
    pub fn from_primes(p: BigUint, q: BigUint) -> Result<Self> {
        let one = BigUint::one();
        if p <= one || q <= one {
            return Err(VoteCryptoError::InvalidParameter(
                "prime factors must be greater than 1".to_string(),
            ));
        }
        if p == q {
            return Err(VoteCryptoError::InvalidParameter(
                "prime factors must be distinct".to_string(),
            ));
        }

        let public_key = PublicKey::new(&p * &q);
        let p_minus_1 = &p - &one;
        let q_minus_1 = &q - &one;

        if !public_key.n.gcd(&(&p_minus_1 * &q_minus_1)).is_one() {
            return Err(VoteCryptoError::InvalidParameter(
                "gcd(pq, (p-1)(q-1)) must be 1".to_string(),
            ));
        }

        let lambda = lcm(&p_minus_1, &q_minus_1);
        let g_lambda = mod_exp(&public_key.g, &lambda, &public_key.n_squared);
        let mu = mod_inverse(&l_function(&g_lambda, &public_key.n), &public_key.n)?;

        Ok(PrivateKey {
            p,
            q,
            lambda,
            mu,
            public_key,
        })
    }

    /// The public key this private key decrypts for
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn lambda(&self) -> &BigUint {
        &self.lambda
    }

    pub fn mu(&self) -> &BigUint {
        &self.mu
    }

    /// Check whether this key belongs to `public_key`
    pub fn matches(&self, public_key: &PublicKey) -> bool {
        &self.public_key == public_key
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bits", &self.public_key.bit_size())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(***)")
    }
}

/// Paillier key pair
#[derive(Clone, Debug)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub private_key: PrivateKey,
}

impl KeyPair {
    /// Generate a new key pair whose modulus has `bit_size` bits
    ///
    /// # Example
    ///
    /// ```rust
    /// use paillier_vote::KeyPair;
    ///
    /// let keypair = KeyPair::generate(512).expect("Failed to generate keys");
    /// assert_eq!(keypair.public_key.bit_size(), 512);
    /// ```
    pub fn generate(bit_size: u64) -> Result<Self> {
        Self::generate_with_config(&PaillierConfig::with_key_bits(bit_size))
    }

    /// Generate a key pair using the thread-local CSPRNG
    pub fn generate_with_config(config: &PaillierConfig) -> Result<Self> {
        Self::generate_with_rng(config, &mut thread_rng())
    }

    /// Generate a key pair from an explicit cryptographic RNG
    ///
    /// Prime pairs that fail the Paillier conditions are discarded and fresh
    /// primes drawn, up to `config.max_keygen_attempts` times.
    pub fn generate_with_rng<R: RngCore + CryptoRng>(
        config: &PaillierConfig,
        rng: &mut R,
    ) -> Result<Self> {
        config.validate()?;
        let prime_bits = config.key_bits / 2;

        for attempt in 1..=config.max_keygen_attempts {
            let p = generate_prime(prime_bits, config, rng)?;
            let q = generate_prime(prime_bits, config, rng)?;

            if p == q {
                tracing::debug!(attempt, "drew equal primes, retrying");
                continue;
            }

            match Self::from_primes(p, q) {
                Ok(keypair) if keypair.bit_size() == config.key_bits => {
                    tracing::info!(bits = config.key_bits, attempt, "generated Paillier key pair");
                    return Ok(keypair);
                }
                Ok(keypair) => {
                    tracing::debug!(attempt, bits = keypair.bit_size(), "modulus has wrong size, retrying");
                }
                Err(err @ (VoteCryptoError::NoInverse | VoteCryptoError::InvalidParameter(_))) => {
                    tracing::debug!(attempt, %err, "prime pair rejected, retrying");
                }
                Err(err) => return Err(err),
            }
        }

        tracing::error!(
            attempts = config.max_keygen_attempts,
            "key generation retry budget exhausted"
        );
        Err(VoteCryptoError::KeyGeneration(format!(
            "no valid prime pair after {} attempts",
            config.max_keygen_attempts
        )))
    }

    /// Create a key pair from known prime factors
    pub fn from_primes(p: BigUint, q: BigUint) -> Result<Self> {
        let private_key = PrivateKey::from_primes(p, q)?;
        let public_key = private_key.public_key.clone();
        public_key.validate()?;

        Ok(KeyPair {
            public_key,
            private_key,
        })
    }

    /// Get the bit size of the keys
    pub fn bit_size(&self) -> u64 {
        self.public_key.bit_size()
    }
}

impl fmt::Display for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair({} bits)", self.bit_size())
    }
}
