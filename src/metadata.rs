//! Per-transaction message codec: UTF-8 strings to 250-bit field chunks,
//! PCT encryption under the recipient key, and the 32-byte-aligned on-wire
//! byte layout `length ‖ nonce ‖ authKey.x ‖ authKey.y ‖ cipher…`.

use ark_ed_on_bn254::EdwardsAffine;
use ark_ff::PrimeField;
use ark_std::rand::Rng;
use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::EercError;
use crate::field::{from_be_bytes32, to_be_bytes32, to_biguint, Fq, Fr};
use crate::pct::{self, PoseidonCiphertext, PCT_BLOCK};

/// Chunk width in bits. 250 < 254 keeps every chunk canonical in `F_p`.
const CHUNK_BITS: usize = 250;

const WORD: usize = 32;

/// An encrypted message ready for the contract's `message` argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedMessage {
    /// Plaintext chunk count, transmitted out-of-band in the wire header.
    pub length: usize,
    pub pct: PoseidonCiphertext,
}

/// Splits a UTF-8 string into 250-bit field chunks, least-significant chunk
/// first. The empty string encodes as a single zero chunk.
pub fn str_to_chunks(text: &str) -> Vec<Fq> {
    let mut value = BigUint::from_bytes_be(text.as_bytes());
    let mask = (BigUint::one() << CHUNK_BITS) - BigUint::one();
    let mut chunks = Vec::with_capacity(1);
    loop {
        let chunk = &value & &mask;
        // Chunks are < 2^250 < p, so no reduction happens here.
        chunks.push(Fq::from_be_bytes_mod_order(&chunk.to_bytes_be()));
        value >>= CHUNK_BITS;
        if value.is_zero() {
            return chunks;
        }
    }
}

/// Recombines chunks into the original string, dropping trailing NUL
/// padding. Callers must not rely on trailing NULs surviving a round trip.
pub fn chunks_to_str(chunks: &[Fq]) -> Result<String, EercError> {
    let mut value = BigUint::zero();
    for chunk in chunks.iter().rev() {
        value = (value << CHUNK_BITS) | to_biguint(chunk);
    }
    let mut bytes = if value.is_zero() {
        Vec::new()
    } else {
        value.to_bytes_be()
    };
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    String::from_utf8(bytes)
        .map_err(|err| EercError::Serialization(format!("message is not UTF-8: {err}")))
}

/// Encrypts `text` to `pk`. The ciphertext is padded to whole blocks; the
/// true chunk count rides in [`EncryptedMessage::length`].
pub fn encrypt_message<R: Rng>(
    text: &str,
    pk: &EdwardsAffine,
    rng: &mut R,
) -> Result<EncryptedMessage, EercError> {
    let chunks = str_to_chunks(text);
    let length = chunks.len();
    let pct = pct::encrypt(&chunks, pk, rng)?;
    Ok(EncryptedMessage { length, pct })
}

/// Decrypts an [`EncryptedMessage`] back to the original string.
pub fn decrypt_message(message: &EncryptedMessage, sk: Fr) -> Result<String, EercError> {
    let chunks = pct::decrypt(&message.pct, sk, message.length)?;
    chunks_to_str(&chunks)
}

impl EncryptedMessage {
    /// The canonical byte layout, every component 32-byte big-endian:
    /// `length ‖ nonce ‖ authKey.x ‖ authKey.y ‖ cipher[0] ‖ …`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(WORD * (4 + self.pct.cipher.len()));
        let mut length_word = [0u8; WORD];
        length_word[WORD - 16..].copy_from_slice(&(self.length as u128).to_be_bytes());
        out.extend_from_slice(&length_word);
        out.extend_from_slice(&to_be_bytes32(&self.pct.nonce));
        out.extend_from_slice(&to_be_bytes32(&self.pct.auth_key.x));
        out.extend_from_slice(&to_be_bytes32(&self.pct.auth_key.y));
        for element in &self.pct.cipher {
            out.extend_from_slice(&to_be_bytes32(element));
        }
        out
    }

    /// Parses the canonical byte layout. The ephemeral scalar is not on the
    /// wire, so the result can decrypt but cannot re-prove.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EercError> {
        if bytes.len() < WORD * (4 + PCT_BLOCK) || bytes.len() % WORD != 0 {
            return Err(EercError::Serialization(format!(
                "malformed message buffer of {} bytes",
                bytes.len()
            )));
        }
        let words: Vec<&[u8]> = bytes.chunks(WORD).collect();
        let length_value = BigUint::from_bytes_be(words[0]);
        let cipher_len = words.len() - 4;
        if cipher_len % PCT_BLOCK != 0 {
            return Err(EercError::Serialization(format!(
                "cipher of {cipher_len} words is not block-aligned"
            )));
        }
        let length = usize::try_from(length_value.clone()).map_err(|_| {
            EercError::Serialization(format!("implausible chunk count {length_value}"))
        })?;
        if length == 0 || length > cipher_len {
            return Err(EercError::Serialization(format!(
                "chunk count {length} does not fit a {cipher_len}-word cipher"
            )));
        }
        let nonce = from_be_bytes32(words[1])?;
        let auth_key = EdwardsAffine::new_unchecked(
            from_be_bytes32(words[2])?,
            from_be_bytes32(words[3])?,
        );
        crate::jubjub::validate_point(&auth_key)?;
        let cipher = words[4..]
            .iter()
            .map(|word| from_be_bytes32(word))
            .collect::<Result<Vec<Fq>, EercError>>()?;
        Ok(Self {
            length,
            pct: PoseidonCiphertext {
                cipher,
                auth_key,
                nonce,
                encryption_random: Fr::from(0u64),
            },
        })
    }
}
