//! Witness assembly for the five protocol operations.
//!
//! Each `prepare_*` function is a pure function of its inputs plus fresh
//! randomness: it validates, runs the encryption steps in circuit order,
//! and returns the typed witness together with the artifacts the contract
//! call carries next to the proof. Nothing here mutates on failure, so
//! callers retry with fresh randomness.

mod burn;
mod deposit;
mod mint;
mod register;
mod transfer;
mod withdraw;

#[cfg(test)]
mod tests;

pub use burn::{prepare_burn, BurnWitness, PreparedBurn};
pub use deposit::{convert_token_decimals, prepare_deposit, PreparedDeposit};
pub use mint::{prepare_mint, MintWitness, PreparedMint};
pub use register::{prepare_registration, PreparedRegistration, RegisterWitness};
pub use transfer::{prepare_transfer, PreparedTransfer, TransferWitness};
pub use withdraw::{prepare_withdraw, PreparedWithdraw, WithdrawWitness};

use ark_ec::AffineRepr;
use ark_ed_on_bn254::EdwardsAffine;

use crate::error::EercError;
use crate::jubjub::validate_point;

/// Deployment style of the target contract. Converter deployments wrap an
/// existing ERC-20 via deposit/withdraw; standalone deployments mint and
/// burn first-class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeploymentMode {
    Standalone,
    Converter,
}

impl DeploymentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standalone => "standalone",
            Self::Converter => "converter",
        }
    }
}

fn require_mode(
    mode: DeploymentMode,
    expected: DeploymentMode,
    operation: &'static str,
) -> Result<(), EercError> {
    if mode == expected {
        Ok(())
    } else {
        Err(EercError::NotPermittedInMode {
            operation,
            mode: mode.as_str(),
        })
    }
}

/// An auditor key must be a valid, non-identity subgroup point.
fn require_auditor(auditor_pk: &EdwardsAffine) -> Result<(), EercError> {
    if auditor_pk.is_zero() {
        return Err(EercError::AuditorNotSet);
    }
    validate_point(auditor_pk)
}

/// A counterparty key of identity means the party never registered.
fn require_registered(pk: &EdwardsAffine) -> Result<(), EercError> {
    if pk.is_zero() {
        return Err(EercError::UnregisteredParty);
    }
    validate_point(pk)
}

fn require_positive(amount: u128) -> Result<(), EercError> {
    if amount == 0 {
        return Err(EercError::InvalidAmount("amount must be positive".into()));
    }
    Ok(())
}

fn require_covered(amount: u128, balance: u128) -> Result<(), EercError> {
    require_positive(amount)?;
    if amount > balance {
        return Err(EercError::InvalidAmount(format!(
            "amount {amount} exceeds balance {balance}"
        )));
    }
    Ok(())
}
