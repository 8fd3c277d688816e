//! Fixed-arity Poseidon hashes and the keystream sponge.
//!
//! Three inputs appear on the protocol's hashing paths: the registration
//! hash (`poseidon3`), the mint nullifier (`poseidon5`), and the rate-2
//! keystream sponge behind the Poseidon ciphertexts. Each fixed-arity hash
//! absorbs into a sponge whose rate equals the input count, so one
//! permutation covers the whole input.

use ark_crypto_primitives::sponge::poseidon::{PoseidonConfig, PoseidonSponge};
use ark_crypto_primitives::sponge::{CryptographicSponge, FieldBasedCryptographicSponge};

use crate::config::{poseidon_t3, poseidon_t4, poseidon_t6};
use crate::field::Fq;

fn hash_with(config: &PoseidonConfig<Fq>, inputs: &[Fq]) -> Fq {
    let mut sponge = PoseidonSponge::new(config);
    for input in inputs {
        sponge.absorb(input);
    }
    let out = sponge.squeeze_native_field_elements(1);
    out[0]
}

pub fn poseidon2(a: Fq, b: Fq) -> Fq {
    hash_with(poseidon_t3(), &[a, b])
}

pub fn poseidon3(a: Fq, b: Fq, c: Fq) -> Fq {
    hash_with(poseidon_t4(), &[a, b, c])
}

pub fn poseidon5(a: Fq, b: Fq, c: Fq, d: Fq, e: Fq) -> Fq {
    hash_with(poseidon_t6(), &[a, b, c, d, e])
}

/// Squeezes `count` keystream elements from the rate-2 sponge initialized
/// with `[shared.x, shared.y, nonce]`.
///
/// This is the exact schedule the circuit's decryption gadget re-derives;
/// both sides of a PCT use it.
pub fn keystream(init: [Fq; 3], count: usize) -> Vec<Fq> {
    let mut sponge = PoseidonSponge::new(poseidon_t3());
    for input in &init {
        sponge.absorb(input);
    }
    sponge.squeeze_native_field_elements(count)
}
