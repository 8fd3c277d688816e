//! Total-balance reconstruction from the contract's encrypted triple.
//!
//! The EGCT commits to the running balance homomorphically; the PCTs carry
//! the plaintext the holder can actually read. Reconstruction folds the
//! rolling `balancePCT` with the queued incoming `amountPCTs` and
//! cross-checks the sum against the EGCT, so a missed or tampered
//! ciphertext surfaces instead of silently reading wrong.

use ark_ec::CurveGroup;
use ark_ff::Zero;
use serde::{Deserialize, Serialize};

use crate::error::EercError;
use crate::field::{to_u128, Fq, Fr};
use crate::jubjub::{amount_to_point, elgamal_decrypt, ElGamalCiphertext};
use crate::pct::{decrypt_wire, PCT_WIRE_LEN};

const LOG_TARGET: &str = "eerc::balance";

/// One element of the contract's append-only incoming-credit queue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountPct {
    #[serde(with = "crate::crypto_serde::fq_array_dec")]
    pub pct: [Fq; PCT_WIRE_LEN],
    pub index: u64,
}

/// The `(EGCT, nonce, amountPCTs, balancePCT)` tuple the contract stores
/// per (user, token).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEncoding {
    pub egct: ElGamalCiphertext,
    pub nonce: u64,
    pub amount_pcts: Vec<AmountPct>,
    #[serde(with = "crate::crypto_serde::fq_array_dec")]
    pub balance_pct: [Fq; PCT_WIRE_LEN],
}

fn is_zero_wire(wire: &[Fq; PCT_WIRE_LEN]) -> bool {
    wire.iter().all(Fq::is_zero)
}

/// Folds the encoding into the plaintext total, verifying it against the
/// EGCT. A mismatch is [`EercError::InconsistentBalance`], never a silent
/// value.
#[tracing::instrument(target = LOG_TARGET, skip_all, fields(amount_pcts = encoding.amount_pcts.len()))]
pub fn reconstruct_total_balance(sk: Fr, encoding: &BalanceEncoding) -> Result<u128, EercError> {
    let mut total = Fq::zero();

    if !is_zero_wire(&encoding.balance_pct) {
        let plain = decrypt_wire(&encoding.balance_pct, sk, 1)?;
        total += plain[0];
    }
    for amount_pct in &encoding.amount_pcts {
        let plain = decrypt_wire(&amount_pct.pct, sk, 1)?;
        total += plain[0];
    }

    let total = to_u128(&total)?;
    if total != 0 {
        let expected = amount_to_point(total).into_affine();
        let got = elgamal_decrypt(sk, &encoding.egct)?;
        if got != expected {
            tracing::warn!(target: LOG_TARGET, "EGCT does not match the PCT sum");
            return Err(EercError::InconsistentBalance);
        }
    }
    tracing::debug!(target: LOG_TARGET, total, "reconstructed balance");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jubjub::{encrypt_amount, nonzero_scalar, KeyPair};
    use crate::pct;
    use ark_std::rand::SeedableRng;
    use rand::rngs::StdRng;

    fn amount_wire(
        amount: u128,
        key: &KeyPair,
        rng: &mut StdRng,
    ) -> [Fq; PCT_WIRE_LEN] {
        pct::encrypt(&[Fq::from(amount)], &key.public(), rng)
            .unwrap()
            .to_wire()
            .unwrap()
    }

    fn encoding_for(
        balance: u128,
        credits: &[u128],
        key: &KeyPair,
        rng: &mut StdRng,
    ) -> BalanceEncoding {
        let total: u128 = balance + credits.iter().sum::<u128>();
        let (egct, _) = encrypt_amount(&key.public(), total, rng).unwrap();
        BalanceEncoding {
            egct,
            nonce: 0,
            amount_pcts: credits
                .iter()
                .enumerate()
                .map(|(index, &credit)| AmountPct {
                    pct: amount_wire(credit, key, rng),
                    index: index as u64,
                })
                .collect(),
            balance_pct: amount_wire(balance, key, rng),
        }
    }

    #[test]
    fn folds_balance_and_credits() {
        let mut rng = StdRng::seed_from_u64(11);
        let key = KeyPair::new(nonzero_scalar(&mut rng)).unwrap();
        let encoding = encoding_for(70, &[10, 20], &key, &mut rng);
        assert_eq!(reconstruct_total_balance(key.secret(), &encoding).unwrap(), 100);
    }

    #[test]
    fn zero_balance_pct_is_skipped() {
        let mut rng = StdRng::seed_from_u64(12);
        let key = KeyPair::new(nonzero_scalar(&mut rng)).unwrap();
        let mut encoding = encoding_for(0, &[42], &key, &mut rng);
        encoding.balance_pct = [Fq::zero(); PCT_WIRE_LEN];
        let (egct, _) = encrypt_amount(&key.public(), 42, &mut rng).unwrap();
        encoding.egct = egct;
        assert_eq!(reconstruct_total_balance(key.secret(), &encoding).unwrap(), 42);
    }

    #[test]
    fn empty_encoding_is_zero() {
        let mut rng = StdRng::seed_from_u64(13);
        let key = KeyPair::new(nonzero_scalar(&mut rng)).unwrap();
        let encoding = BalanceEncoding {
            egct: ElGamalCiphertext::zero(),
            nonce: 0,
            amount_pcts: Vec::new(),
            balance_pct: [Fq::zero(); PCT_WIRE_LEN],
        };
        assert_eq!(reconstruct_total_balance(key.secret(), &encoding).unwrap(), 0);
    }

    #[test]
    fn tampered_balance_pct_is_inconsistent() {
        let mut rng = StdRng::seed_from_u64(14);
        let key = KeyPair::new(nonzero_scalar(&mut rng)).unwrap();
        let mut encoding = encoding_for(70, &[10, 20], &key, &mut rng);
        encoding.balance_pct[0] += Fq::from(1u64);
        assert!(matches!(
            reconstruct_total_balance(key.secret(), &encoding),
            Err(EercError::InconsistentBalance)
        ));
    }

    #[test]
    fn tampered_amount_pct_is_inconsistent() {
        let mut rng = StdRng::seed_from_u64(15);
        let key = KeyPair::new(nonzero_scalar(&mut rng)).unwrap();
        let mut encoding = encoding_for(70, &[10, 20], &key, &mut rng);
        encoding.amount_pcts[1].pct[2] += Fq::from(3u64);
        assert!(matches!(
            reconstruct_total_balance(key.secret(), &encoding),
            Err(EercError::InconsistentBalance)
        ));
    }

    #[test]
    fn missing_credit_is_inconsistent() {
        let mut rng = StdRng::seed_from_u64(16);
        let key = KeyPair::new(nonzero_scalar(&mut rng)).unwrap();
        let mut encoding = encoding_for(70, &[10, 20], &key, &mut rng);
        encoding.amount_pcts.pop();
        assert!(matches!(
            reconstruct_total_balance(key.secret(), &encoding),
            Err(EercError::InconsistentBalance)
        ));
    }
}
