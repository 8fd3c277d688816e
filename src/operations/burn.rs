//! Private burn: destroys encrypted supply in standalone deployments.
//! Shaped like a withdraw, plus a self-addressed EGCT of the burned amount
//! that stands in for the on-chain "transfer to the burn user" artifact.

use ark_ed_on_bn254::EdwardsAffine;
use ark_std::rand::Rng;
use serde::Serialize;

use super::{require_auditor, require_covered, require_mode, DeploymentMode};
use crate::error::EercError;
use crate::field::{Fq, Fr};
use crate::jubjub::{encrypt_amount, ElGamalCiphertext, KeyPair};
use crate::pct::{self, PCT_WIRE_LEN};

const LOG_TARGET: &str = "eerc::ops::burn";

/// Circuit inputs for the burn proof. Field names are fixed by the
/// circuit; do not rename.
#[derive(Clone, Debug, Serialize)]
pub struct BurnWitness {
    #[serde(rename = "ValueToBurn", with = "crate::crypto_serde::fq_dec")]
    pub value_to_burn: Fq,
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
    #[serde(rename = "SenderVTBC1", with = "crate::crypto_serde::point_dec")]
    pub sender_vtb_c1: EdwardsAffine,
    #[serde(rename = "SenderVTBC2", with = "crate::crypto_serde::point_dec")]
    pub sender_vtb_c2: EdwardsAffine,
    #[serde(rename = "SenderVTBRandom", with = "crate::crypto_serde::fr_dec")]
    pub sender_vtb_random: Fr,
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
pub struct PreparedBurn {
    pub witness: BurnWitness,
    /// The sender's rewritten rolling balance PCT (post-burn balance).
    /// Always present; burn variants without one are refused by design of
    /// this builder.
    pub sender_balance_pct: [Fq; PCT_WIRE_LEN],
    /// Emitted for the auditor's viewing capability.
    pub auditor_pct: [Fq; PCT_WIRE_LEN],
    /// Self-addressed EGCT of the burned amount, the on-chain transfer
    /// artifact.
    pub burn_egct: ElGamalCiphertext,
}

#[tracing::instrument(target = LOG_TARGET, skip_all, fields(amount = amount, balance = sender_balance))]
pub fn prepare_burn<R: Rng>(
    mode: DeploymentMode,
    sender: &KeyPair,
    amount: u128,
    sender_balance: u128,
    sender_egct: &ElGamalCiphertext,
    auditor_pk: &EdwardsAffine,
    rng: &mut R,
) -> Result<PreparedBurn, EercError> {
    require_mode(mode, DeploymentMode::Standalone, "privateBurn")?;
    require_covered(amount, sender_balance)?;
    require_auditor(auditor_pk)?;

    let new_balance = sender_balance - amount;
    let (burn_egct, vtb_random) = encrypt_amount(&sender.public(), amount, rng)?;
    let auditor_pct = pct::encrypt(&[Fq::from(amount)], auditor_pk, rng)?;
    let balance_pct = pct::encrypt(&[Fq::from(new_balance)], &sender.public(), rng)?;
    tracing::debug!(target: LOG_TARGET, "burn witness assembled");

    Ok(PreparedBurn {
        witness: BurnWitness {
            value_to_burn: Fq::from(amount),
            sender_private_key: sender.secret(),
            sender_public_key: sender.public(),
            sender_balance: Fq::from(sender_balance),
            sender_balance_c1: sender_egct.c1,
            sender_balance_c2: sender_egct.c2,
            sender_vtb_c1: burn_egct.c1,
            sender_vtb_c2: burn_egct.c2,
            sender_vtb_random: vtb_random,
            auditor_public_key: *auditor_pk,
            auditor_pct: auditor_pct.cipher_block()?,
            auditor_pct_auth_key: auditor_pct.auth_key,
            auditor_pct_nonce: auditor_pct.nonce,
            auditor_pct_random: auditor_pct.encryption_random,
        },
        sender_balance_pct: balance_pct.to_wire()?,
        auditor_pct: auditor_pct.to_wire()?,
        burn_egct,
    })
}
