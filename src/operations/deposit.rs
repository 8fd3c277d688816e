//! Deposit: converter-mode entry of ERC-20 value into the encrypted
//! ledger. Carries no proof, only a fresh sender amount-PCT of the
//! deposited amount after decimal rescaling.

use ark_ed_on_bn254::EdwardsAffine;
use ark_std::rand::Rng;

use super::{require_mode, require_positive, require_registered, DeploymentMode};
use crate::error::EercError;
use crate::field::Fq;
use crate::pct::{self, PCT_WIRE_LEN};

const LOG_TARGET: &str = "eerc::ops::deposit";

/// Rescales an amount between decimal widths. Downscaling truncates,
/// mirroring the on-chain conversion; the flag reports whether precision
/// was lost.
pub fn convert_token_decimals(amount: u128, from: u8, to: u8) -> (u128, bool) {
    if from == to {
        return (amount, false);
    }
    if from > to {
        let factor = 10u128.pow(u32::from(from - to));
        (amount / factor, amount % factor != 0)
    } else {
        let factor = 10u128.pow(u32::from(to - from));
        (amount.saturating_mul(factor), false)
    }
}

#[derive(Clone, Debug)]
pub struct PreparedDeposit {
    /// The sender amount-PCT the contract appends on deposit.
    pub amount_pct: [Fq; PCT_WIRE_LEN],
    /// The deposited amount at the protocol's decimal width.
    pub deposited_amount: u128,
    /// Set when downscaling dropped precision.
    pub truncated: bool,
}

#[tracing::instrument(target = LOG_TARGET, skip_all, fields(amount = amount))]
pub fn prepare_deposit<R: Rng>(
    mode: DeploymentMode,
    sender_pk: &EdwardsAffine,
    amount: u128,
    erc20_decimals: u8,
    protocol_decimals: u8,
    rng: &mut R,
) -> Result<PreparedDeposit, EercError> {
    require_mode(mode, DeploymentMode::Converter, "deposit")?;
    require_positive(amount)?;
    require_registered(sender_pk)?;

    let (deposited_amount, truncated) =
        convert_token_decimals(amount, erc20_decimals, protocol_decimals);
    require_positive(deposited_amount)?;
    if truncated {
        tracing::debug!(target: LOG_TARGET, deposited_amount, "deposit truncated by decimal rescaling");
    }

    let amount_pct = pct::encrypt(&[Fq::from(deposited_amount)], sender_pk, rng)?;
    Ok(PreparedDeposit {
        amount_pct: amount_pct.to_wire()?,
        deposited_amount,
        truncated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jubjub::{nonzero_scalar, KeyPair};
    use crate::pct::decrypt_wire;
    use ark_std::rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn decimal_conversion_truncates_downward_only() {
        assert_eq!(convert_token_decimals(1_234_567, 6, 2), (123, true));
        assert_eq!(convert_token_decimals(1_230_000, 6, 2), (123, false));
        assert_eq!(convert_token_decimals(123, 2, 6), (1_230_000, false));
        assert_eq!(convert_token_decimals(42, 2, 2), (42, false));
    }

    #[test]
    fn deposit_encrypts_the_rescaled_amount() {
        let mut rng = StdRng::seed_from_u64(61);
        let sender = KeyPair::new(nonzero_scalar(&mut rng)).unwrap();
        let prepared = prepare_deposit(
            DeploymentMode::Converter,
            &sender.public(),
            5_000_000_000_000_000_000, // 5 tokens at 18 decimals
            18,
            2,
            &mut rng,
        )
        .unwrap();
        assert_eq!(prepared.deposited_amount, 500);
        assert!(!prepared.truncated);
        assert_eq!(
            decrypt_wire(&prepared.amount_pct, sender.secret(), 1).unwrap(),
            vec![Fq::from(500u64)]
        );
    }

    #[test]
    fn dust_only_deposits_are_rejected() {
        let mut rng = StdRng::seed_from_u64(62);
        let sender = KeyPair::new(nonzero_scalar(&mut rng)).unwrap();
        // 1 wei at 18 decimals is zero at width 2.
        assert!(matches!(
            prepare_deposit(
                DeploymentMode::Converter,
                &sender.public(),
                1,
                18,
                2,
                &mut rng,
            ),
            Err(EercError::InvalidAmount(_))
        ));
    }

    #[test]
    fn standalone_mode_is_rejected() {
        let mut rng = StdRng::seed_from_u64(63);
        let sender = KeyPair::new(nonzero_scalar(&mut rng)).unwrap();
        assert!(matches!(
            prepare_deposit(
                DeploymentMode::Standalone,
                &sender.public(),
                100,
                6,
                2,
                &mut rng,
            ),
            Err(EercError::NotPermittedInMode { operation: "deposit", .. })
        ));
    }
}
