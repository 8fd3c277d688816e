//! Baby Jubjub curve operations and ElGamal encryption of amounts.
//!
//! The curve is the twisted Edwards curve embedded in the BN254 scalar
//! field (`a = 168700`, `d = 168696`). All protocol scalar multiplications
//! use `BASE8`, the published generator of the prime-order subgroup; secret
//! scalars are elements of the subgroup scalar field and therefore already
//! reduced mod `ℓ`.

use core::fmt;

use ark_ec::{AffineRepr, CurveGroup};
use ark_ed_on_bn254::{EdwardsAffine, EdwardsProjective};
use ark_ff::{MontFp, UniformRand, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::Rng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::EercError;
use crate::field::{Fq, Fr};

const BASE8_X: Fq =
    MontFp!("5299619240641551281634865583518297030282874472190772894086521144482721001553");
const BASE8_Y: Fq =
    MontFp!("16950150798460657717958625567821834550301663161624707787222815936182638968203");

/// Generator of the prime-order subgroup; every protocol point is a
/// multiple of it.
pub const BASE8: EdwardsAffine = EdwardsAffine::new_unchecked(BASE8_X, BASE8_Y);

/// `k · Base8`.
pub fn mul_base8(k: Fr) -> EdwardsProjective {
    EdwardsProjective::from(BASE8) * k
}

/// Canonical encoding of an amount as a curve point: `v · Base8`.
pub fn amount_to_point(amount: u128) -> EdwardsProjective {
    mul_base8(Fr::from(amount))
}

/// Rejects points that are off-curve or outside the prime-order subgroup.
///
/// The identity passes; operations that additionally forbid it (auditor and
/// counterparty keys) check separately.
pub fn validate_point(point: &EdwardsAffine) -> Result<(), EercError> {
    if point.is_zero() {
        return Ok(());
    }
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(EercError::InvalidPoint);
    }
    Ok(())
}

/// Samples a scalar uniformly from `[1, ℓ)`.
pub fn nonzero_scalar<R: Rng>(rng: &mut R) -> Fr {
    loop {
        let r = Fr::rand(rng);
        if !r.is_zero() {
            return r;
        }
    }
}

/// A session key pair. The secret scalar is wiped on drop and the type is
/// deliberately not serializable.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    sk: Fr,
    pk: EdwardsAffine,
}

impl KeyPair {
    /// Builds a key pair from a secret scalar already reduced mod `ℓ`.
    pub fn new(sk: Fr) -> Result<Self, EercError> {
        if sk.is_zero() {
            return Err(EercError::WeakKey);
        }
        let pk = mul_base8(sk).into_affine();
        Ok(Self { sk, pk })
    }

    /// Samples a fresh key pair from the host CSPRNG. Auditor keys are
    /// provisioned this way; user keys come from
    /// [`crate::keys::derive_key_from_signature`].
    pub fn random() -> Self {
        let sk = nonzero_scalar(&mut rand::rngs::OsRng);
        let pk = mul_base8(sk).into_affine();
        Self { sk, pk }
    }

    pub fn secret(&self) -> Fr {
        self.sk
    }

    pub fn public(&self) -> EdwardsAffine {
        self.pk
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("sk", &"<redacted>")
            .field("pk", &self.pk)
            .finish()
    }
}

impl Zeroize for KeyPair {
    fn zeroize(&mut self) {
        self.sk = Fr::zero();
        self.pk = EdwardsAffine::zero();
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl zeroize::ZeroizeOnDrop for KeyPair {}

/// ElGamal ciphertext of an amount encoded as `v · Base8`.
///
/// Componentwise point addition of two ciphertexts encrypts the sum of the
/// amounts; the contract aggregates balances that way and the
/// reconstruction path relies on it.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, CanonicalSerialize,
    CanonicalDeserialize,
)]
pub struct ElGamalCiphertext {
    #[serde(with = "crate::crypto_serde::point_dec")]
    pub c1: EdwardsAffine,
    #[serde(with = "crate::crypto_serde::point_dec")]
    pub c2: EdwardsAffine,
}

impl ElGamalCiphertext {
    pub fn new(c1: EdwardsAffine, c2: EdwardsAffine) -> Self {
        Self { c1, c2 }
    }

    /// Ciphertext of zero under any key: `(O, O)`.
    pub fn zero() -> Self {
        Self::new(EdwardsAffine::zero(), EdwardsAffine::zero())
    }

    /// Homomorphic add: encrypts the sum of the two amounts.
    pub fn add_layer(&self, other: &Self) -> Self {
        Self::new(
            (EdwardsProjective::from(self.c1) + other.c1).into_affine(),
            (EdwardsProjective::from(self.c2) + other.c2).into_affine(),
        )
    }

    /// Homomorphic subtract: how the ledger debits a spend.
    pub fn sub_layer(&self, other: &Self) -> Self {
        Self::new(
            (EdwardsProjective::from(self.c1) - other.c1).into_affine(),
            (EdwardsProjective::from(self.c2) - other.c2).into_affine(),
        )
    }
}

/// Encrypts `amount` to `pk`, returning the ciphertext together with the
/// randomness the circuit witness needs.
pub fn encrypt_amount<R: Rng>(
    pk: &EdwardsAffine,
    amount: u128,
    rng: &mut R,
) -> Result<(ElGamalCiphertext, Fr), EercError> {
    validate_point(pk)?;
    let r = nonzero_scalar(rng);
    let c1 = mul_base8(r);
    let shared = EdwardsProjective::from(*pk) * r;
    let c2 = amount_to_point(amount) + shared;
    Ok((
        ElGamalCiphertext::new(c1.into_affine(), c2.into_affine()),
        r,
    ))
}

/// Recovers `v · Base8` from a ciphertext; recovering `v` itself is a
/// discrete log the protocol sidesteps with the companion PCT.
pub fn elgamal_decrypt(sk: Fr, ciphertext: &ElGamalCiphertext) -> Result<EdwardsAffine, EercError> {
    validate_point(&ciphertext.c1)?;
    validate_point(&ciphertext.c2)?;
    let shared = EdwardsProjective::from(ciphertext.c1) * sk;
    Ok((EdwardsProjective::from(ciphertext.c2) - shared).into_affine())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_std::rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn base8_is_a_subgroup_generator() {
        assert!(BASE8.is_on_curve());
        assert!(BASE8.is_in_correct_subgroup_assuming_on_curve());
        assert!(!BASE8.is_zero());
    }

    #[test]
    fn public_keys_are_valid_subgroup_points() {
        let mut rng = rng();
        for _ in 0..8 {
            let key = KeyPair::new(nonzero_scalar(&mut rng)).unwrap();
            assert!(validate_point(&key.public()).is_ok());
            assert!(!key.public().is_zero());
        }
    }

    #[test]
    fn random_key_pairs_are_valid_and_distinct() {
        let a = KeyPair::random();
        let b = KeyPair::random();
        assert!(validate_point(&a.public()).is_ok());
        assert_ne!(a.secret(), b.secret());
    }

    #[test]
    fn zero_secret_is_rejected() {
        assert!(matches!(
            KeyPair::new(Fr::zero()),
            Err(EercError::WeakKey)
        ));
    }

    #[test]
    fn elgamal_round_trips_to_the_amount_point() {
        let mut rng = rng();
        let key = KeyPair::new(nonzero_scalar(&mut rng)).unwrap();
        for amount in [0u128, 1, 100, u128::from(u64::MAX)] {
            let (ct, r) = encrypt_amount(&key.public(), amount, &mut rng).unwrap();
            assert!(!r.is_zero());
            let plain = elgamal_decrypt(key.secret(), &ct).unwrap();
            assert_eq!(plain, amount_to_point(amount).into_affine());
        }
    }

    #[test]
    fn homomorphic_addition_encrypts_the_sum() {
        let mut rng = rng();
        let key = KeyPair::new(nonzero_scalar(&mut rng)).unwrap();
        let (a, _) = encrypt_amount(&key.public(), 30, &mut rng).unwrap();
        let (b, _) = encrypt_amount(&key.public(), 12, &mut rng).unwrap();
        let sum = a.add_layer(&b);
        let plain = elgamal_decrypt(key.secret(), &sum).unwrap();
        assert_eq!(plain, amount_to_point(42).into_affine());
    }

    #[test]
    fn off_curve_points_are_rejected() {
        let bogus = EdwardsAffine::new_unchecked(Fq::from(2u64), Fq::from(3u64));
        assert!(matches!(
            validate_point(&bogus),
            Err(EercError::InvalidPoint)
        ));
        let ct = ElGamalCiphertext::new(bogus, BASE8);
        assert!(elgamal_decrypt(Fr::from(5u64), &ct).is_err());
    }

    #[test]
    fn key_pair_zeroizes() {
        let mut key = KeyPair::new(Fr::from(1234u64)).unwrap();
        key.zeroize();
        assert!(key.secret().is_zero());
    }
}
