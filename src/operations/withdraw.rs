//! Withdraw: converts encrypted balance back to the underlying ERC-20.
//! Converter deployments only; the withdrawn amount leaves the encrypted
//! supply, so there is no receiver ciphertext.

use ark_ed_on_bn254::EdwardsAffine;
use ark_std::rand::Rng;
use serde::Serialize;

use super::{require_auditor, require_covered, require_mode, DeploymentMode};
use crate::error::EercError;
use crate::field::{Fq, Fr};
use crate::jubjub::{ElGamalCiphertext, KeyPair};
use crate::pct::{self, PCT_WIRE_LEN};

const LOG_TARGET: &str = "eerc::ops::withdraw";

/// Circuit inputs for the withdraw proof. Field names are fixed by the
/// circuit; do not rename.
#[derive(Clone, Debug, Serialize)]
pub struct WithdrawWitness {
    #[serde(rename = "ValueToWithdraw", with = "crate::crypto_serde::fq_dec")]
    pub value_to_withdraw: Fq,
    #[serde(rename = "SenderPrivateKey", with = "crate::crypto_serde::fr_dec")]
    pub sender_private_key: Fr,
    #[serde(rename = "SenderPublicKey", with = "crate::crypto_serde::point_dec")]
    pub sender_public_key: EdwardsAffine,
    #[serde(rename = "SenderBalance", with = "crate::crypto_serde::fq_dec")]
    pub sender_balance: Fq,
    #[serde(rename = "SenderBalanceC1", with = "crate::crypto_serde::point_dec")]
    pub sender_balance_c1: EdwardsAffine,
    #[serde(rename = "SenderBalanceC2", with = "crate::crypto_serde::point_dec")]
    pub sender_balance_c2: EdwardsAffine,
    #[serde(rename = "AuditorPublicKey", with = "crate::crypto_serde::point_dec")]
    pub auditor_public_key: EdwardsAffine,
    #[serde(rename = "AuditorPCT", with = "crate::crypto_serde::fq_array_dec")]
    pub auditor_pct: [Fq; 4],
    #[serde(rename = "AuditorPCTAuthKey", with = "crate::crypto_serde::point_dec")]
    pub auditor_pct_auth_key: EdwardsAffine,
    #[serde(rename = "AuditorPCTNonce", with = "crate::crypto_serde::fq_dec")]
    pub auditor_pct_nonce: Fq,
    #[serde(rename = "AuditorPCTRandom", with = "crate::crypto_serde::fr_dec")]
    pub auditor_pct_random: Fr,
}

#[derive(Clone, Debug)]
pub struct PreparedWithdraw {
    pub witness: WithdrawWitness,
    /// The sender's rewritten rolling balance PCT (post-withdraw balance).
    pub sender_balance_pct: [Fq; PCT_WIRE_LEN],
    /// Emitted for the auditor's viewing capability.
    pub auditor_pct: [Fq; PCT_WIRE_LEN],
}

#[tracing::instrument(target = LOG_TARGET, skip_all, fields(amount = amount, balance = sender_balance))]
pub fn prepare_withdraw<R: Rng>(
    mode: DeploymentMode,
    sender: &KeyPair,
    amount: u128,
    sender_balance: u128,
    sender_egct: &ElGamalCiphertext,
    auditor_pk: &EdwardsAffine,
    rng: &mut R,
) -> Result<PreparedWithdraw, EercError> {
    require_mode(mode, DeploymentMode::Converter, "withdraw")?;
    require_covered(amount, sender_balance)?;
    require_auditor(auditor_pk)?;

    let new_balance = sender_balance - amount;
    let auditor_pct = pct::encrypt(&[Fq::from(amount)], auditor_pk, rng)?;
    let balance_pct = pct::encrypt(&[Fq::from(new_balance)], &sender.public(), rng)?;
    tracing::debug!(target: LOG_TARGET, "withdraw witness assembled");

    Ok(PreparedWithdraw {
        witness: WithdrawWitness {
            value_to_withdraw: Fq::from(amount),
            sender_private_key: sender.secret(),
            sender_public_key: sender.public(),
            sender_balance: Fq::from(sender_balance),
            sender_balance_c1: sender_egct.c1,
            sender_balance_c2: sender_egct.c2,
            auditor_public_key: *auditor_pk,
            auditor_pct: auditor_pct.cipher_block()?,
            auditor_pct_auth_key: auditor_pct.auth_key,
            auditor_pct_nonce: auditor_pct.nonce,
            auditor_pct_random: auditor_pct.encryption_random,
        },
        sender_balance_pct: balance_pct.to_wire()?,
        auditor_pct: auditor_pct.to_wire()?,
    })
}
