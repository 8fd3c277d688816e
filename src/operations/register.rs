//! Registration: binds a derived public key to an account address on one
//! chain via `Poseidon3(chainId, sk, address)`.

use ark_ed_on_bn254::EdwardsAffine;
use serde::Serialize;

use crate::address::Address;
use crate::error::EercError;
use crate::field::{scalar_to_base, Fq, Fr};
use crate::jubjub::KeyPair;
use crate::poseidon::poseidon3;

const LOG_TARGET: &str = "eerc::ops::register";

/// Circuit inputs for the registration proof. Field names are fixed by the
/// circuit; do not rename.
#[derive(Clone, Debug, Serialize)]
pub struct RegisterWitness {
    #[serde(rename = "SenderPrivateKey", with = "crate::crypto_serde::fr_dec")]
    pub sender_private_key: Fr,
    #[serde(rename = "SenderPublicKey", with = "crate::crypto_serde::point_dec")]
    pub sender_public_key: EdwardsAffine,
    #[serde(rename = "SenderAddress", with = "crate::crypto_serde::fq_dec")]
    pub sender_address: Fq,
    #[serde(rename = "ChainID", with = "crate::crypto_serde::fq_dec")]
    pub chain_id: Fq,
    #[serde(rename = "RegistrationHash", with = "crate::crypto_serde::fq_dec")]
    pub registration_hash: Fq,
}

#[derive(Clone, Debug)]
pub struct PreparedRegistration {
    pub witness: RegisterWitness,
    pub registration_hash: Fq,
}

#[tracing::instrument(target = LOG_TARGET, skip_all, fields(chain_id = chain_id))]
pub fn prepare_registration(
    key: &KeyPair,
    address: &Address,
    chain_id: u64,
) -> Result<PreparedRegistration, EercError> {
    if address.is_zero() {
        return Err(EercError::InvalidAddress("zero address".into()));
    }
    let chain = Fq::from(chain_id);
    let address_field = address.to_field();
    let registration_hash = poseidon3(chain, scalar_to_base(&key.secret()), address_field);
    tracing::debug!(target: LOG_TARGET, "registration witness assembled");

    Ok(PreparedRegistration {
        witness: RegisterWitness {
            sender_private_key: key.secret(),
            sender_public_key: key.public(),
            sender_address: address_field,
            chain_id: chain,
            registration_hash,
        },
        registration_hash,
    })
}
