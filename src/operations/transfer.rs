//! Private transfer: spends from the sender's encrypted balance, credits
//! the receiver, and rewrites the sender's rolling balance PCT.

use ark_ed_on_bn254::EdwardsAffine;
use ark_std::rand::Rng;
use serde::Serialize;

use super::{require_auditor, require_covered, require_registered};
use crate::error::EercError;
use crate::field::{Fq, Fr};
use crate::jubjub::{encrypt_amount, ElGamalCiphertext, KeyPair};
use crate::pct::{self, PCT_WIRE_LEN};

const LOG_TARGET: &str = "eerc::ops::transfer";

/// Circuit inputs for the transfer proof. Field names are fixed by the
/// circuit; do not rename.
#[derive(Clone, Debug, Serialize)]
pub struct TransferWitness {
    #[serde(rename = "ValueToTransfer", with = "crate::crypto_serde::fq_dec")]
    pub value_to_transfer: Fq,
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
    #[serde(rename = "SenderVTTC1", with = "crate::crypto_serde::point_dec")]
    pub sender_vtt_c1: EdwardsAffine,
    #[serde(rename = "SenderVTTC2", with = "crate::crypto_serde::point_dec")]
    pub sender_vtt_c2: EdwardsAffine,
    #[serde(rename = "ReceiverPublicKey", with = "crate::crypto_serde::point_dec")]
    pub receiver_public_key: EdwardsAffine,
    #[serde(rename = "ReceiverVTTC1", with = "crate::crypto_serde::point_dec")]
    pub receiver_vtt_c1: EdwardsAffine,
    #[serde(rename = "ReceiverVTTC2", with = "crate::crypto_serde::point_dec")]
    pub receiver_vtt_c2: EdwardsAffine,
    #[serde(rename = "ReceiverVTTRandom", with = "crate::crypto_serde::fr_dec")]
    pub receiver_vtt_random: Fr,
    #[serde(rename = "ReceiverPCT", with = "crate::crypto_serde::fq_array_dec")]
    pub receiver_pct: [Fq; 4],
    #[serde(rename = "ReceiverPCTAuthKey", with = "crate::crypto_serde::point_dec")]
    pub receiver_pct_auth_key: EdwardsAffine,
    #[serde(rename = "ReceiverPCTNonce", with = "crate::crypto_serde::fq_dec")]
    pub receiver_pct_nonce: Fq,
    #[serde(rename = "ReceiverPCTRandom", with = "crate::crypto_serde::fr_dec")]
    pub receiver_pct_random: Fr,
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
pub struct PreparedTransfer {
    pub witness: TransferWitness,
    /// The sender's rewritten rolling balance PCT (post-transfer balance);
    /// rides next to the proof in the contract call.
    pub sender_balance_pct: [Fq; PCT_WIRE_LEN],
    /// Appended to the receiver's `amountPCTs` queue.
    pub receiver_amount_pct: [Fq; PCT_WIRE_LEN],
    /// Emitted for the auditor's viewing capability.
    pub auditor_pct: [Fq; PCT_WIRE_LEN],
    /// The receiver's new encrypted credit.
    pub receiver_egct: ElGamalCiphertext,
}

#[tracing::instrument(target = LOG_TARGET, skip_all, fields(amount = amount, balance = sender_balance))]
pub fn prepare_transfer<R: Rng>(
    sender: &KeyPair,
    receiver_pk: &EdwardsAffine,
    amount: u128,
    sender_balance: u128,
    sender_egct: &ElGamalCiphertext,
    auditor_pk: &EdwardsAffine,
    rng: &mut R,
) -> Result<PreparedTransfer, EercError> {
    require_covered(amount, sender_balance)?;
    require_registered(receiver_pk)?;
    require_auditor(auditor_pk)?;

    let new_balance = sender_balance - amount;

    // The sender-side encryption only feeds the circuit's balance check;
    // its randomness is not a witness input.
    let (sender_vtt, _) = encrypt_amount(&sender.public(), amount, rng)?;
    let (receiver_egct, receiver_vtt_random) = encrypt_amount(receiver_pk, amount, rng)?;

    let receiver_pct = pct::encrypt(&[Fq::from(amount)], receiver_pk, rng)?;
    let auditor_pct = pct::encrypt(&[Fq::from(amount)], auditor_pk, rng)?;
    let balance_pct = pct::encrypt(&[Fq::from(new_balance)], &sender.public(), rng)?;
    tracing::debug!(target: LOG_TARGET, "transfer witness assembled");

    Ok(PreparedTransfer {
        witness: TransferWitness {
            value_to_transfer: Fq::from(amount),
            sender_private_key: sender.secret(),
            sender_public_key: sender.public(),
            sender_balance: Fq::from(sender_balance),
            sender_balance_c1: sender_egct.c1,
            sender_balance_c2: sender_egct.c2,
            sender_vtt_c1: sender_vtt.c1,
            sender_vtt_c2: sender_vtt.c2,
            receiver_public_key: *receiver_pk,
            receiver_vtt_c1: receiver_egct.c1,
            receiver_vtt_c2: receiver_egct.c2,
            receiver_vtt_random,
            receiver_pct: receiver_pct.cipher_block()?,
            receiver_pct_auth_key: receiver_pct.auth_key,
            receiver_pct_nonce: receiver_pct.nonce,
            receiver_pct_random: receiver_pct.encryption_random,
            auditor_public_key: *auditor_pk,
            auditor_pct: auditor_pct.cipher_block()?,
            auditor_pct_auth_key: auditor_pct.auth_key,
            auditor_pct_nonce: auditor_pct.nonce,
            auditor_pct_random: auditor_pct.encryption_random,
        },
        sender_balance_pct: balance_pct.to_wire()?,
        receiver_amount_pct: receiver_pct.to_wire()?,
        auditor_pct: auditor_pct.to_wire()?,
        receiver_egct,
    })
}
