//! Private mint: credits a receiver with a fresh EGCT plus receiver and
//! auditor PCTs, bound to the chain by a Poseidon nullifier.

use ark_ed_on_bn254::EdwardsAffine;
use ark_std::rand::Rng;
use serde::Serialize;

use super::{require_auditor, require_mode, require_positive, require_registered, DeploymentMode};
use crate::error::EercError;
use crate::field::{Fq, Fr};
use crate::jubjub::{encrypt_amount, ElGamalCiphertext};
use crate::pct::{self, PCT_WIRE_LEN};
use crate::poseidon::poseidon5;

const LOG_TARGET: &str = "eerc::ops::mint";

/// Circuit inputs for the mint proof. Field names are fixed by the
/// circuit; do not rename.
#[derive(Clone, Debug, Serialize)]
pub struct MintWitness {
    #[serde(rename = "ValueToMint", with = "crate::crypto_serde::fq_dec")]
    pub value_to_mint: Fq,
    #[serde(rename = "ChainID", with = "crate::crypto_serde::fq_dec")]
    pub chain_id: Fq,
    #[serde(rename = "NullifierHash", with = "crate::crypto_serde::fq_dec")]
    pub nullifier_hash: Fq,
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
pub struct PreparedMint {
    pub witness: MintWitness,
    /// The receiver's new encrypted credit, as the contract stores it.
    pub receiver_egct: ElGamalCiphertext,
    /// Appended to the receiver's `amountPCTs` queue.
    pub receiver_amount_pct: [Fq; PCT_WIRE_LEN],
    /// Emitted for the auditor's viewing capability.
    pub auditor_pct: [Fq; PCT_WIRE_LEN],
    /// Replay guard, unique per mint: `Poseidon5(chainId, auditorCipher)`.
    pub nullifier: Fq,
}

#[tracing::instrument(target = LOG_TARGET, skip_all, fields(amount = amount))]
pub fn prepare_mint<R: Rng>(
    mode: DeploymentMode,
    receiver_pk: &EdwardsAffine,
    amount: u128,
    auditor_pk: &EdwardsAffine,
    chain_id: u64,
    rng: &mut R,
) -> Result<PreparedMint, EercError> {
    require_mode(mode, DeploymentMode::Standalone, "privateMint")?;
    require_positive(amount)?;
    require_registered(receiver_pk)?;
    require_auditor(auditor_pk)?;

    let (receiver_egct, vtt_random) = encrypt_amount(receiver_pk, amount, rng)?;
    let receiver_pct = pct::encrypt(&[Fq::from(amount)], receiver_pk, rng)?;
    let auditor_pct = pct::encrypt(&[Fq::from(amount)], auditor_pk, rng)?;

    let auditor_cipher = auditor_pct.cipher_block()?;
    let nullifier = poseidon5(
        Fq::from(chain_id),
        auditor_cipher[0],
        auditor_cipher[1],
        auditor_cipher[2],
        auditor_cipher[3],
    );
    tracing::debug!(target: LOG_TARGET, "mint witness assembled");

    Ok(PreparedMint {
        witness: MintWitness {
            value_to_mint: Fq::from(amount),
            chain_id: Fq::from(chain_id),
            nullifier_hash: nullifier,
            receiver_public_key: *receiver_pk,
            receiver_vtt_c1: receiver_egct.c1,
            receiver_vtt_c2: receiver_egct.c2,
            receiver_vtt_random: vtt_random,
            receiver_pct: receiver_pct.cipher_block()?,
            receiver_pct_auth_key: receiver_pct.auth_key,
            receiver_pct_nonce: receiver_pct.nonce,
            receiver_pct_random: receiver_pct.encryption_random,
            auditor_public_key: *auditor_pk,
            auditor_pct: auditor_cipher,
            auditor_pct_auth_key: auditor_pct.auth_key,
            auditor_pct_nonce: auditor_pct.nonce,
            auditor_pct_random: auditor_pct.encryption_random,
        },
        receiver_egct,
        receiver_amount_pct: receiver_pct.to_wire()?,
        auditor_pct: auditor_pct.to_wire()?,
        nullifier,
    })
}
