use ark_crypto_primitives::sponge::poseidon::{find_poseidon_ark_and_mds, PoseidonConfig};
use ark_ff::PrimeField;
use once_cell::sync::Lazy;

use crate::field::Fq;

/// Builds a Poseidon configuration for the given field and sponge shape.
///
/// α = 5 S-box, capacity 1; round constants and MDS matrix are derived
/// deterministically from the field modulus via the standard Grain-LFSR
/// search.
pub fn poseidon_config<F: PrimeField>(
    rate: usize,
    full_rounds: usize,
    partial_rounds: usize,
) -> PoseidonConfig<F> {
    let (ark, mds) = find_poseidon_ark_and_mds(
        u64::from(F::MODULUS_BIT_SIZE),
        rate,
        full_rounds as u64,
        partial_rounds as u64,
        0,
    );
    PoseidonConfig::new(full_rounds, partial_rounds, 5, mds, ark, rate, 1)
}

// Partial-round counts follow the standard α = 5 schedule for a 254-bit
// field at state widths t = 3, 4, 6.
static POSEIDON_T3: Lazy<PoseidonConfig<Fq>> = Lazy::new(|| poseidon_config(2, 8, 57));
static POSEIDON_T4: Lazy<PoseidonConfig<Fq>> = Lazy::new(|| poseidon_config(3, 8, 56));
static POSEIDON_T6: Lazy<PoseidonConfig<Fq>> = Lazy::new(|| poseidon_config(5, 8, 60));

/// Rate-2 configuration: two-input hashing and the PCT keystream sponge.
pub fn poseidon_t3() -> &'static PoseidonConfig<Fq> {
    &POSEIDON_T3
}

/// Rate-3 configuration: the registration hash.
pub fn poseidon_t4() -> &'static PoseidonConfig<Fq> {
    &POSEIDON_T4
}

/// Rate-5 configuration: the mint nullifier.
pub fn poseidon_t6() -> &'static PoseidonConfig<Fq> {
    &POSEIDON_T6
}
