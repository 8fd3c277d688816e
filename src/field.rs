//! Conversions between the protocol's field elements and external
//! representations (big-endian bytes, decimal strings, `u128` amounts).
//!
//! Arithmetic itself lives in `ark-ff`; this module only carries the wire
//! and witness encodings the rest of the crate shares.

use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;

use crate::error::EercError;

/// The SNARK scalar field `F_p`, which is also the base field of Baby Jubjub.
pub type Fq = ark_bn254::Fr;

/// The Baby Jubjub prime-subgroup scalar field, of order `ℓ`.
pub type Fr = ark_ed_on_bn254::Fr;

/// Canonical integer value of a field element.
pub fn to_biguint<F: PrimeField>(value: &F) -> BigUint {
    BigUint::from_bytes_be(&value.into_bigint().to_bytes_be())
}

/// Builds a field element from an integer, rejecting values outside `[0, modulus)`.
pub fn from_biguint<F: PrimeField>(value: &BigUint) -> Result<F, EercError> {
    let modulus = BigUint::from_bytes_be(&F::MODULUS.to_bytes_be());
    if *value >= modulus {
        return Err(EercError::ArithmeticError(format!(
            "value {value} exceeds the field modulus"
        )));
    }
    Ok(F::from_be_bytes_mod_order(&value.to_bytes_be()))
}

/// Decimal-string form used by the witness dictionaries.
pub fn to_decimal<F: PrimeField>(value: &F) -> String {
    to_biguint(value).to_str_radix(10)
}

/// Parses the decimal-string witness form back into a field element.
pub fn from_decimal<F: PrimeField>(text: &str) -> Result<F, EercError> {
    let value = BigUint::parse_bytes(text.as_bytes(), 10)
        .ok_or_else(|| EercError::Serialization(format!("not a decimal integer: {text:?}")))?;
    from_biguint(&value)
}

/// 32-byte big-endian form fixed by the on-wire layout.
pub fn to_be_bytes32<F: PrimeField>(value: &F) -> [u8; 32] {
    let bytes = value.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    let start = 32usize.saturating_sub(bytes.len());
    out[start..].copy_from_slice(&bytes[bytes.len().saturating_sub(32)..]);
    out
}

/// Strict inverse of [`to_be_bytes32`]: exactly 32 bytes, canonical value.
pub fn from_be_bytes32<F: PrimeField>(bytes: &[u8]) -> Result<F, EercError> {
    if bytes.len() != 32 {
        return Err(EercError::Serialization(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        )));
    }
    from_biguint(&BigUint::from_bytes_be(bytes))
}

/// Reads a protocol amount out of a field element.
///
/// Amounts live far below `2^128`; anything larger means a desynchronized or
/// hostile ciphertext.
pub fn to_u128<F: PrimeField>(value: &F) -> Result<u128, EercError> {
    let digits = to_biguint(value).to_u64_digits();
    if digits.len() > 2 {
        return Err(EercError::ArithmeticError(
            "field element does not fit an amount".into(),
        ));
    }
    let low = digits.first().copied().unwrap_or(0);
    let high = digits.get(1).copied().unwrap_or(0);
    Ok(u128::from(high) << 64 | u128::from(low))
}

/// Lifts a subgroup scalar into the base field.
///
/// `ℓ < p`, so the canonical integer always fits without reduction.
pub fn scalar_to_base(scalar: &Fr) -> Fq {
    Fq::from_be_bytes_mod_order(&scalar.into_bigint().to_bytes_be())
}

/// Field inversion with the zero case surfaced as an error.
pub fn inverse<F: PrimeField>(value: &F) -> Result<F, EercError> {
    value
        .inverse()
        .ok_or_else(|| EercError::ArithmeticError("inverse of zero".into()))
}

/// Square root (Tonelli–Shanks under the hood); non-residues are an error.
pub fn sqrt<F: PrimeField>(value: &F) -> Result<F, EercError> {
    value
        .sqrt()
        .ok_or_else(|| EercError::ArithmeticError("not a quadratic residue".into()))
}
