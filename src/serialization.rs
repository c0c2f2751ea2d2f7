//! Canonical JSON encoding of ciphertexts and keys
//!
//! Big integers are written as decimal strings so no JSON consumer can
//! silently truncate them:
//!
//! ```text
//! {"ciphertext": "<c>", "exponent": "<e>"}
//! {"g": "<g>", "n": "<n>"}
//! {"p": "<p>", "q": "<q>"}
//! ```

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoteCryptoError};
use crate::keys::{PrivateKey, PublicKey};
use crate::types::{Ciphertext, MIN_KEY_BITS};

#[derive(Serialize, Deserialize)]
struct CiphertextRecord {
    ciphertext: String,
    exponent: String,
}

#[derive(Serialize, Deserialize)]
struct PublicKeyRecord {
    g: String,
    n: String,
}

#[derive(Serialize, Deserialize)]
struct PrivateKeyRecord {
    p: String,
    q: String,
}

fn to_json<T: Serialize>(record: &T) -> String {
    serde_json::to_string(record).expect("records of plain string fields always serialize")
}

fn parse_uint(field: &str, value: &str) -> std::result::Result<BigUint, String> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("field `{}` is not a decimal integer", field));
    }
    value
        .parse::<BigUint>()
        .map_err(|e| format!("field `{}`: {}", field, e))
}

pub fn serialize_ciphertext(ciphertext: &Ciphertext) -> String {
    to_json(&CiphertextRecord {
        ciphertext: ciphertext.c.to_str_radix(10),
        exponent: ciphertext.exponent.to_string(),
    })
}

/// Parse a stored ciphertext, failing with
/// [`VoteCryptoError::MalformedCiphertext`] on missing or non-integer fields
pub fn deserialize_ciphertext(s: &str) -> Result<Ciphertext> {
    let record: CiphertextRecord = serde_json::from_str(s).map_err(|e| {
        tracing::warn!(error = %e, "rejected malformed ciphertext");
        VoteCryptoError::MalformedCiphertext(e.to_string())
    })?;

    let c = parse_uint("ciphertext", &record.ciphertext)
        .map_err(VoteCryptoError::MalformedCiphertext)?;
    let exponent = record.exponent.parse::<i64>().map_err(|_| {
        VoteCryptoError::MalformedCiphertext("field `exponent` is not an integer".to_string())
    })?;

    Ok(Ciphertext::with_exponent(c, exponent))
}

pub fn serialize_public_key(key: &PublicKey) -> String {
    to_json(&PublicKeyRecord {
        g: key.g.to_str_radix(10),
        n: key.n.to_str_radix(10),
    })
}

pub fn deserialize_public_key(s: &str) -> Result<PublicKey> {
    let record: PublicKeyRecord =
        serde_json::from_str(s).map_err(|e| VoteCryptoError::MalformedKey(e.to_string()))?;

    let g = parse_uint("g", &record.g).map_err(VoteCryptoError::MalformedKey)?;
    let n = parse_uint("n", &record.n).map_err(VoteCryptoError::MalformedKey)?;
    PublicKey::from_parts(n, g)
}

pub fn serialize_private_key(key: &PrivateKey) -> String {
    to_json(&PrivateKeyRecord {
        p: key.p.to_str_radix(10),
        q: key.q.to_str_radix(10),
    })
}

/// Parse a stored private key; lambda and mu are re-derived from p and q
pub fn deserialize_private_key(s: &str) -> Result<PrivateKey> {
    let record: PrivateKeyRecord =
        serde_json::from_str(s).map_err(|e| VoteCryptoError::MalformedKey(e.to_string()))?;

    let p = parse_uint("p", &record.p).map_err(VoteCryptoError::MalformedKey)?;
    let q = parse_uint("q", &record.q).map_err(VoteCryptoError::MalformedKey)?;
    if (&p * &q).bits() < MIN_KEY_BITS {
        return Err(VoteCryptoError::MalformedKey(format!(
            "modulus below {} bits",
            MIN_KEY_BITS
        )));
    }
    PrivateKey::from_primes(p, q).map_err(|e| VoteCryptoError::MalformedKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::Paillier;
    use crate::keys::KeyPair;

    #[test]
    fn test_deserialize_documented_format() {
        let ct = deserialize_ciphertext(r#"{"ciphertext": "123", "exponent": "0"}"#).unwrap();
        assert_eq!(ct, Ciphertext::new(123u32.into()));
    }

    #[test]
    fn test_serialize_uses_decimal_strings() {
        let ct = Ciphertext::with_exponent(BigUint::from(u128::MAX) * 10u32, -3);
        assert_eq!(
            serialize_ciphertext(&ct),
            r#"{"ciphertext":"3402823669209384634633746074317682114550","exponent":"-3"}"#
        );
    }

    #[test]
    fn test_malformed_ciphertexts() {
        let bad = [
            "{}",
            "",
            "not json",
            r#"{"ciphertext": "123"}"#,
            r#"{"exponent": "0"}"#,
            r#"{"ciphertext": 123, "exponent": "0"}"#,
            r#"{"ciphertext": "12a", "exponent": "0"}"#,
            r#"{"ciphertext": "-5", "exponent": "0"}"#,
            r#"{"ciphertext": "", "exponent": "0"}"#,
            r#"{"ciphertext": "123", "exponent": "zero"}"#,
        ];
        for s in bad {
            assert!(
                matches!(
                    deserialize_ciphertext(s),
                    Err(VoteCryptoError::MalformedCiphertext(_))
                ),
                "{s:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_ciphertext_round_trip() {
        let keypair = KeyPair::generate(512).unwrap();
        let engine = Paillier::new(keypair.public_key.clone());
        let ct = engine.encrypt_vote(true).unwrap();

        let restored = deserialize_ciphertext(&serialize_ciphertext(&ct)).unwrap();
        assert_eq!(restored, ct);
        assert_eq!(keypair.private_key.decrypt_u64(&restored).unwrap(), 1);
    }

    #[test]
    fn test_key_round_trip() {
        let keypair = KeyPair::generate(512).unwrap();

        let public = deserialize_public_key(&serialize_public_key(&keypair.public_key)).unwrap();
        assert_eq!(public, keypair.public_key);

        let private =
            deserialize_private_key(&serialize_private_key(&keypair.private_key)).unwrap();
        assert_eq!(private, keypair.private_key);
    }

    #[test]
    fn test_public_key_format() {
        let keypair = KeyPair::from_primes(17u32.into(), 19u32.into()).unwrap();
        assert_eq!(
            serialize_public_key(&keypair.public_key),
            r#"{"g":"324","n":"323"}"#
        );
        assert_eq!(
            serialize_private_key(&keypair.private_key),
            r#"{"p":"17","q":"19"}"#
        );
        assert!(deserialize_public_key(r#"{"n":"323"}"#).is_err());
        assert!(deserialize_public_key(r#"{"g":"324","n":"32x"}"#).is_err());
    }

    #[test]
    fn test_stored_keys_below_minimum_size_are_rejected() {
        for stored in [r#"{"g":"324","n":"323"}"#, r#"{"g":"5","n":"323"}"#] {
            assert!(matches!(
                deserialize_public_key(stored),
                Err(VoteCryptoError::MalformedKey(_))
            ));
        }
        for stored in [r#"{"p":"17","q":"19"}"#, r#"{"p":"17","q":"17"}"#] {
            assert!(matches!(
                deserialize_private_key(stored),
                Err(VoteCryptoError::MalformedKey(_))
            ));
        }
    }

    #[test]
    fn test_private_key_with_repeated_prime_is_rejected() {
        let keypair = KeyPair::generate(512).unwrap();
        let p = keypair.private_key.p.to_str_radix(10);
        let stored = format!(r#"{{"p":"{}","q":"{}"}}"#, p, p);
        assert!(matches!(
            deserialize_private_key(&stored),
            Err(VoteCryptoError::MalformedKey(_))
        ));
    }
}
