//! Number theory helpers: modular arithmetic, primality and randomness
//!
//! Every function that consumes randomness takes an `R: RngCore + CryptoRng`
//! so a non-cryptographic generator cannot be passed in by accident.

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rand::{CryptoRng, RngCore};

use crate::error::{Result, VoteCryptoError};
use crate::types::PaillierConfig;

const SMALL_PRIMES: [u32; 24] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Bound on draws in `random_coprime` before the modulus is declared unusable
const MAX_COPRIME_DRAWS: usize = 1000;

/// Modular exponentiation: base^exp mod modulus
pub fn mod_exp(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exp, modulus)
}

/// Modular inverse via the extended Euclidean algorithm
///
/// Fails with [`VoteCryptoError::NoInverse`] when `gcd(a, m) != 1`.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Result<BigUint> {
    if m.is_zero() {
        return Err(VoteCryptoError::NoInverse);
    }

    let m_int = BigInt::from(m.clone());
    let (gcd, x, _) = extended_gcd(&BigInt::from(a.clone()), &m_int);

    if gcd != BigInt::one() {
        return Err(VoteCryptoError::NoInverse);
    }

    let mut x = x % &m_int;
    if x.is_negative() {
        x += &m_int;
    }

    x.to_biguint().ok_or(VoteCryptoError::NoInverse)
}

/// Extended Euclidean algorithm (BigInt for the negative intermediate values)
fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let quotient = &old_r / &r;

        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);

        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);

        let next_t = &old_t - &quotient * &t;
        old_t = std::mem::replace(&mut t, next_t);
    }

    (old_r, old_s, old_t)
}

/// Least common multiple
pub fn lcm(a: &BigUint, b: &BigUint) -> BigUint {
    a.lcm(b)
}

/// Paillier's L function: L(x) = (x - 1) / n, floor division
///
/// `x` must be at least 1, which holds for any power of a unit mod n^2.
pub fn l_function(x: &BigUint, n: &BigUint) -> BigUint {
    debug_assert!(!x.is_zero());
    (x - BigUint::one()) / n
}

/// Uniform random integer in [0, bound)
pub fn random_below<R: RngCore + CryptoRng>(bound: &BigUint, rng: &mut R) -> BigUint {
    rng.gen_biguint_below(bound)
}

/// Uniform random r in [1, n) with gcd(r, n) = 1
pub fn random_coprime<R: RngCore + CryptoRng>(n: &BigUint, rng: &mut R) -> Result<BigUint> {
    if n <= &BigUint::one() {
        return Err(VoteCryptoError::InvalidParameter(
            "modulus must be greater than 1".to_string(),
        ));
    }

    for _ in 0..MAX_COPRIME_DRAWS {
        let r = rng.gen_biguint_range(&BigUint::one(), n);
        if r.gcd(n).is_one() {
            return Ok(r);
        }
    }

    Err(VoteCryptoError::InvalidParameter(format!(
        "no unit found modulo n after {} draws",
        MAX_COPRIME_DRAWS
    )))
}

/// Miller-Rabin primality test with `rounds` random witnesses
///
/// Each round of a composite passes with probability at most 1/4, so 64
/// rounds bound false positives by 2^-128.
pub fn is_probable_prime<R: RngCore + CryptoRng>(n: &BigUint, rounds: usize, rng: &mut R) -> bool {
    let two = BigUint::from(2u32);

    if n < &two {
        return false;
    }
    if n == &two {
        return true;
    }
    if n.is_even() {
        return false;
    }

    for small in SMALL_PRIMES {
        let small = BigUint::from(small);
        if n == &small {
            return true;
        }
        if (n % &small).is_zero() {
            return false;
        }
    }

    let n_minus_1 = n - BigUint::one();
    let (s, d) = factor_powers_of_two(&n_minus_1);

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_1);
        let mut x = mod_exp(&a, &d, n);

        if x.is_one() || x == n_minus_1 {
            continue;
        }

        for _ in 1..s {
            x = mod_exp(&x, &two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

/// Factor out powers of 2: n = 2^s * d with d odd
pub fn factor_powers_of_two(n: &BigUint) -> (u64, BigUint) {
    let s = n.trailing_zeros().unwrap_or(0);
    (s, n >> s)
}

/// Generate a random prime of exactly `bit_size` bits
///
/// The two top bits are forced so that the product of two such primes has
/// exactly `2 * bit_size` bits.
pub fn generate_prime<R: RngCore + CryptoRng>(
    bit_size: u64,
    config: &PaillierConfig,
    rng: &mut R,
) -> Result<BigUint> {
    if bit_size < 2 {
        return Err(VoteCryptoError::InvalidKeySize(bit_size));
    }

    let top_bits = BigUint::from(3u32) << (bit_size - 2);

    for attempt in 1..=config.max_prime_candidates {
        let mut candidate = rng.gen_biguint(bit_size);
        candidate |= &top_bits;
        candidate |= BigUint::one();

        if is_probable_prime(&candidate, config.primality_rounds, rng) {
            tracing::debug!(bit_size, attempt, "found probable prime");
            return Ok(candidate);
        }
    }

    Err(VoteCryptoError::KeyGeneration(format!(
        "no {}-bit prime found after {} candidates",
        bit_size, config.max_prime_candidates
    )))
}
