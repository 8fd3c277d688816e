//! The contract seam: the read surface the core consumes, the write-surface
//! argument tuples it composes, and the event payloads the auditor
//! capability decrypts. Submission and log polling belong to the host.

use ark_ed_on_bn254::EdwardsAffine;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use ark_ec::AffineRepr;

use crate::address::Address;
use crate::balance::{reconstruct_total_balance, BalanceEncoding};
use crate::error::EercError;
use crate::field::{to_decimal, to_u128, Fq, Fr};
use crate::jubjub::KeyPair;
use crate::metadata::EncryptedMessage;
use crate::operations::{PreparedBurn, PreparedDeposit, PreparedTransfer, PreparedWithdraw};
use crate::pct::{decrypt_wire, PCT_WIRE_LEN};
use crate::prover::{CircuitId, SnarkProof};

/// Read-only contract surface the core needs for registration checks and
/// balance reconstruction.
#[async_trait]
pub trait ContractReader {
    async fn get_user_public_key(&self, address: &Address) -> Result<EdwardsAffine, EercError>;
    async fn balance_of(&self, address: &Address) -> Result<BalanceEncoding, EercError>;
    async fn balance_from_token_address(
        &self,
        address: &Address,
        token: &Address,
    ) -> Result<BalanceEncoding, EercError>;
    async fn auditor_public_key(&self) -> Result<EdwardsAffine, EercError>;
    async fn auditor(&self) -> Result<Address, EercError>;
    async fn token_id(&self, token: &Address) -> Result<u64, EercError>;
    async fn decimals(&self) -> Result<u8, EercError>;
    async fn is_converter(&self) -> Result<bool, EercError>;
    async fn name(&self) -> Result<String, EercError>;
    async fn symbol(&self) -> Result<String, EercError>;
    async fn owner(&self) -> Result<Address, EercError>;
    async fn registrar(&self) -> Result<Address, EercError>;
    /// `allowance(owner, eERC)` on the wrapped ERC-20; converter mode only.
    async fn allowance(&self, owner: &Address) -> Result<u128, EercError>;
}

/// True when `address` holds a registered (non-identity) public key.
pub async fn is_registered<C>(reader: &C, address: &Address) -> Result<bool, EercError>
where
    C: ContractReader + ?Sized + Sync,
{
    Ok(!reader.get_user_public_key(address).await?.is_zero())
}

/// Reads the caller's encrypted balance and reconstructs the verified
/// plaintext total in one step.
pub async fn fetch_total_balance<C>(
    reader: &C,
    key: &KeyPair,
    address: &Address,
) -> Result<u128, EercError>
where
    C: ContractReader + ?Sized + Sync,
{
    let encoding = reader.balance_of(address).await?;
    reconstruct_total_balance(key.secret(), &encoding)
}

/// Groth16 proof flattened into the verifier's calldata tuple
/// `(a[2], b[2][2], c[2], input[])`, uint256 components as decimal strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofCalldata {
    pub a: [String; 2],
    pub b: [[String; 2]; 2],
    pub c: [String; 2],
    pub inputs: Vec<String>,
}

impl ProofCalldata {
    /// Validates the proof shape for `circuit` and lays it out for the ABI.
    pub fn from_proof(circuit: CircuitId, proof: &SnarkProof) -> Result<Self, EercError> {
        proof.validate_for(circuit)?;
        Ok(Self {
            a: proof.points.a.clone(),
            b: proof.points.b.clone(),
            c: proof.points.c.clone(),
            inputs: proof.public_signals.clone(),
        })
    }
}

fn wire_strings(wire: &[Fq; PCT_WIRE_LEN]) -> [String; PCT_WIRE_LEN] {
    core::array::from_fn(|i| to_decimal(&wire[i]))
}

/// `register(proof)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterCall {
    pub proof: ProofCalldata,
}

impl RegisterCall {
    pub fn new(proof: &SnarkProof) -> Result<Self, EercError> {
        Ok(Self {
            proof: ProofCalldata::from_proof(CircuitId::Register, proof)?,
        })
    }
}

/// `privateMint(recipient, proof[, message])`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MintCall {
    pub recipient: Address,
    pub proof: ProofCalldata,
    #[serde(with = "serde_bytes_hex")]
    pub message: Vec<u8>,
}

impl MintCall {
    pub fn new(
        recipient: Address,
        proof: &SnarkProof,
        message: Option<&EncryptedMessage>,
    ) -> Result<Self, EercError> {
        Ok(Self {
            recipient,
            proof: ProofCalldata::from_proof(CircuitId::Mint, proof)?,
            message: message.map(EncryptedMessage::to_bytes).unwrap_or_default(),
        })
    }
}

/// `transfer(to, tokenId, proof, balancePCT[, message])`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferCall {
    pub to: Address,
    pub token_id: u64,
    pub proof: ProofCalldata,
    pub balance_pct: [String; PCT_WIRE_LEN],
    #[serde(with = "serde_bytes_hex")]
    pub message: Vec<u8>,
}

impl TransferCall {
    pub fn new(
        to: Address,
        token_id: u64,
        prepared: &PreparedTransfer,
        proof: &SnarkProof,
        message: Option<&EncryptedMessage>,
    ) -> Result<Self, EercError> {
        Ok(Self {
            to,
            token_id,
            proof: ProofCalldata::from_proof(CircuitId::Transfer, proof)?,
            balance_pct: wire_strings(&prepared.sender_balance_pct),
            message: message.map(EncryptedMessage::to_bytes).unwrap_or_default(),
        })
    }
}

/// `withdraw(tokenId, proof, balancePCT[, message])`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WithdrawCall {
    pub token_id: u64,
    pub proof: ProofCalldata,
    pub balance_pct: [String; PCT_WIRE_LEN],
    #[serde(with = "serde_bytes_hex")]
    pub message: Vec<u8>,
}

impl WithdrawCall {
    pub fn new(
        token_id: u64,
        prepared: &PreparedWithdraw,
        proof: &SnarkProof,
        message: Option<&EncryptedMessage>,
    ) -> Result<Self, EercError> {
        Ok(Self {
            token_id,
            proof: ProofCalldata::from_proof(CircuitId::Withdraw, proof)?,
            balance_pct: wire_strings(&prepared.sender_balance_pct),
            message: message.map(EncryptedMessage::to_bytes).unwrap_or_default(),
        })
    }
}

/// `privateBurn(proof, balancePCT[, message])`. The `balancePCT` slot is
/// mandatory; there is no variant without it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BurnCall {
    pub proof: ProofCalldata,
    pub balance_pct: [String; PCT_WIRE_LEN],
    #[serde(with = "serde_bytes_hex")]
    pub message: Vec<u8>,
}

impl BurnCall {
    pub fn new(
        prepared: &PreparedBurn,
        proof: &SnarkProof,
        message: Option<&EncryptedMessage>,
    ) -> Result<Self, EercError> {
        Ok(Self {
            proof: ProofCalldata::from_proof(CircuitId::Burn, proof)?,
            balance_pct: wire_strings(&prepared.sender_balance_pct),
            message: message.map(EncryptedMessage::to_bytes).unwrap_or_default(),
        })
    }
}

/// `deposit(amount, tokenAddress, amountPCT[, message])`, the proof-free entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DepositCall {
    pub amount: String,
    pub token: Address,
    pub amount_pct: [String; PCT_WIRE_LEN],
    #[serde(with = "serde_bytes_hex")]
    pub message: Vec<u8>,
}

impl DepositCall {
    pub fn new(
        amount: u128,
        token: Address,
        prepared: &PreparedDeposit,
        message: Option<&EncryptedMessage>,
    ) -> Self {
        Self {
            amount: amount.to_string(),
            token,
            amount_pct: wire_strings(&prepared.amount_pct),
            message: message.map(EncryptedMessage::to_bytes).unwrap_or_default(),
        }
    }
}

/// `setAuditorPublicKey(address)`: owner-only rotation of the auditor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SetAuditorCall {
    pub new_auditor: Address,
}

/// Message envelope carried by `PrivateMessage` events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub message_from: Address,
    pub message_to: Address,
    pub message_type: String,
    #[serde(with = "serde_bytes_hex")]
    pub encrypted_msg: Vec<u8>,
}

/// Event payloads consumed for auditor decryption and message decoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EercEvent {
    PrivateMint {
        user: Address,
        #[serde(with = "crate::crypto_serde::fq_array_dec")]
        auditor_pct: [Fq; PCT_WIRE_LEN],
    },
    PrivateTransfer {
        from: Address,
        to: Address,
        #[serde(with = "crate::crypto_serde::fq_array_dec")]
        auditor_pct: [Fq; PCT_WIRE_LEN],
    },
    PrivateBurn {
        user: Address,
        #[serde(with = "crate::crypto_serde::fq_array_dec")]
        auditor_pct: [Fq; PCT_WIRE_LEN],
    },
    PrivateMessage { metadata: MessageMetadata },
}

impl EercEvent {
    /// The auditor viewing tuple, when the event carries one.
    pub fn auditor_pct(&self) -> Option<&[Fq; PCT_WIRE_LEN]> {
        match self {
            Self::PrivateMint { auditor_pct, .. }
            | Self::PrivateTransfer { auditor_pct, .. }
            | Self::PrivateBurn { auditor_pct, .. } => Some(auditor_pct),
            Self::PrivateMessage { .. } => None,
        }
    }
}

/// Opens an event's auditor PCT to the flow amount.
pub fn decrypt_auditor_amount(
    auditor: &KeyPair,
    pct: &[Fq; PCT_WIRE_LEN],
) -> Result<u128, EercError> {
    let plain = decrypt_wire(pct, auditor.secret(), 1)?;
    to_u128(&plain[0])
}

/// Decodes a `PrivateMessage` payload addressed to `sk`'s owner.
pub fn decrypt_event_message(sk: Fr, metadata: &MessageMetadata) -> Result<String, EercError> {
    let message = EncryptedMessage::from_bytes(&metadata.encrypted_msg)?;
    crate::metadata::decrypt_message(&message, sk)
}

/// Serde helper: byte payloads as `0x`-prefixed hex.
mod serde_bytes_hex {
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(value)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        let stripped = text.strip_prefix("0x").unwrap_or(&text);
        hex::decode(stripped).map_err(DeError::custom)
    }
}
