//! Poseidon ciphertexts: authenticated ECDH encryption of field-element
//! vectors under a recipient public key.
//!
//! The sender samples an ephemeral scalar `s`, derives the shared point
//! `K = s · pk` and the auth key `s · Base8`, and adds a Poseidon keystream
//! seeded by `[K.x, K.y, nonce]` to the plaintext. The recipient re-derives
//! `K` from the auth key with their secret scalar. The same schedule is
//! what the circuit's decryption gadget checks, so the ephemeral scalar is
//! kept for the witness.

use ark_ec::CurveGroup;
use ark_ed_on_bn254::{EdwardsAffine, EdwardsProjective};
use ark_ff::{UniformRand, Zero};
use ark_std::rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EercError;
use crate::field::{Fq, Fr};
use crate::jubjub::{mul_base8, nonzero_scalar, validate_point};
use crate::poseidon::keystream;

/// Number of field elements in the fixed on-wire PCT tuple:
/// `cipher[0..4] ‖ authKey.x ‖ authKey.y ‖ nonce`.
pub const PCT_WIRE_LEN: usize = 7;

/// Ciphertext block width; plaintexts are zero-padded up to a multiple.
pub const PCT_BLOCK: usize = 4;

/// A Poseidon ciphertext with the witness material that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoseidonCiphertext {
    #[serde(with = "crate::crypto_serde::fq_vec_dec")]
    pub cipher: Vec<Fq>,
    #[serde(with = "crate::crypto_serde::point_dec")]
    pub auth_key: EdwardsAffine,
    #[serde(with = "crate::crypto_serde::fq_dec")]
    pub nonce: Fq,
    #[serde(with = "crate::crypto_serde::fr_dec")]
    pub encryption_random: Fr,
}

impl PoseidonCiphertext {
    /// The fixed 7-element wire tuple. Only defined for single-block
    /// ciphertexts (amount and balance PCTs).
    pub fn to_wire(&self) -> Result<[Fq; PCT_WIRE_LEN], EercError> {
        if self.cipher.len() != PCT_BLOCK {
            return Err(EercError::Serialization(format!(
                "wire form requires a {PCT_BLOCK}-element cipher, got {}",
                self.cipher.len()
            )));
        }
        Ok([
            self.cipher[0],
            self.cipher[1],
            self.cipher[2],
            self.cipher[3],
            self.auth_key.x,
            self.auth_key.y,
            self.nonce,
        ])
    }

    /// The first four cipher elements as a fixed array for witness fields.
    pub fn cipher_block(&self) -> Result<[Fq; PCT_BLOCK], EercError> {
        self.cipher
            .get(..PCT_BLOCK)
            .and_then(|slice| <[Fq; PCT_BLOCK]>::try_from(slice).ok())
            .ok_or_else(|| {
                EercError::Serialization("cipher shorter than one block".into())
            })
    }
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(PCT_BLOCK) * PCT_BLOCK
}

/// Encrypts `message` (1 ≤ length, each element in `F_p`) to `pk`.
pub fn encrypt<R: Rng>(
    message: &[Fq],
    pk: &EdwardsAffine,
    rng: &mut R,
) -> Result<PoseidonCiphertext, EercError> {
    if message.is_empty() {
        return Err(EercError::Serialization("empty plaintext".into()));
    }
    validate_point(pk)?;

    let s = nonzero_scalar(rng);
    let shared = (EdwardsProjective::from(*pk) * s).into_affine();
    let auth_key = mul_base8(s).into_affine();
    let nonce = Fq::rand(rng);

    let width = padded_len(message.len());
    let stream = keystream([shared.x, shared.y, nonce], width);
    let cipher = (0..width)
        .map(|i| message.get(i).copied().unwrap_or_else(Fq::zero) + stream[i])
        .collect();

    Ok(PoseidonCiphertext {
        cipher,
        auth_key,
        nonce,
        encryption_random: s,
    })
}

/// Decrypts `length` plaintext elements. The plaintext length travels
/// out-of-band; block padding is discarded here.
pub fn decrypt(
    ciphertext: &PoseidonCiphertext,
    sk: Fr,
    length: usize,
) -> Result<Vec<Fq>, EercError> {
    decrypt_parts(
        &ciphertext.cipher,
        &ciphertext.auth_key,
        ciphertext.nonce,
        sk,
        length,
    )
}

/// Decrypts the fixed 7-element wire tuple.
pub fn decrypt_wire(wire: &[Fq; PCT_WIRE_LEN], sk: Fr, length: usize) -> Result<Vec<Fq>, EercError> {
    let auth_key = EdwardsAffine::new_unchecked(wire[4], wire[5]);
    decrypt_parts(&wire[..PCT_BLOCK], &auth_key, wire[6], sk, length)
}

/// Core decryption over the raw parts.
pub fn decrypt_parts(
    cipher: &[Fq],
    auth_key: &EdwardsAffine,
    nonce: Fq,
    sk: Fr,
    length: usize,
) -> Result<Vec<Fq>, EercError> {
    if sk.is_zero() {
        return Err(EercError::MissingKey);
    }
    if length == 0 || length > cipher.len() || cipher.len() % PCT_BLOCK != 0 {
        return Err(EercError::Serialization(format!(
            "cipher of {} elements cannot carry {length} plaintext elements",
            cipher.len()
        )));
    }
    validate_point(auth_key)?;

    let shared = (EdwardsProjective::from(*auth_key) * sk).into_affine();
    let stream = keystream([shared.x, shared.y, nonce], cipher.len());
    Ok(cipher
        .iter()
        .zip(stream)
        .take(length)
        .map(|(c, k)| *c - k)
        .collect())
}
