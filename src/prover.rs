//! The external prover seam.
//!
//! Proving is a black box: the engine hands a witness dictionary plus a
//! circuit asset pair to an oracle and receives Groth16 proof points and
//! public signals back. Public-signal counts are fixed by the contract ABI
//! and checked here before anything reaches a transaction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EercError;

const LOG_TARGET: &str = "eerc::prover";

/// The five proved operations, each with its own circuit asset pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CircuitId {
    Register,
    Mint,
    Transfer,
    Withdraw,
    Burn,
}

impl CircuitId {
    pub fn name(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Mint => "mint",
            Self::Transfer => "transfer",
            Self::Withdraw => "withdraw",
            Self::Burn => "burn",
        }
    }

    /// ABI-fixed public-signal count the verifier contract expects.
    pub fn public_signal_count(self) -> usize {
        match self {
            Self::Register => 5,
            Self::Mint => 24,
            Self::Transfer => 32,
            Self::Withdraw => 16,
            Self::Burn => 19,
        }
    }
}

/// URLs of the `.wasm` witness generator and `.zkey` proving key for one
/// circuit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitAssets {
    pub wasm_url: String,
    pub zkey_url: String,
}

/// Groth16 proof points over BN254, in the decimal form the contract ABI
/// takes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofPoints {
    pub a: [String; 2],
    pub b: [[String; 2]; 2],
    pub c: [String; 2],
}

/// A proof together with its public signals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnarkProof {
    pub points: ProofPoints,
    pub public_signals: Vec<String>,
}

impl SnarkProof {
    /// Checks the public-signal count against the circuit's ABI shape.
    pub fn validate_for(&self, circuit: CircuitId) -> Result<(), EercError> {
        let expected = circuit.public_signal_count();
        if self.public_signals.len() != expected {
            return Err(EercError::ProverError(format!(
                "{} proof carries {} public signals, expected {expected}",
                circuit.name(),
                self.public_signals.len()
            )));
        }
        Ok(())
    }
}

/// The proving oracle, the second of the engine's suspension points.
#[async_trait]
pub trait ProofBackend {
    /// Runs `prove(wasm, zkey, witness)` and returns the proof with its
    /// public signals. The witness value is the serialized form of one of
    /// the operation witness structs.
    async fn prove(
        &self,
        circuit: CircuitId,
        assets: &CircuitAssets,
        witness: serde_json::Value,
    ) -> Result<SnarkProof, EercError>;

    /// Optional asset warming; backends without a cache keep the default
    /// no-op.
    async fn prefetch(&self, _assets: &CircuitAssets) -> Result<(), EercError> {
        Ok(())
    }
}

/// Serializes a witness, runs the backend, and validates the proof shape.
#[tracing::instrument(target = LOG_TARGET, skip_all, fields(circuit = circuit.name()))]
pub async fn prove_operation<B, W>(
    backend: &B,
    circuit: CircuitId,
    assets: &CircuitAssets,
    witness: &W,
) -> Result<SnarkProof, EercError>
where
    B: ProofBackend + ?Sized + Sync,
    W: Serialize,
{
    let witness = serde_json::to_value(witness)
        .map_err(|err| EercError::Serialization(format!("witness serialization: {err}")))?;
    let proof = backend.prove(circuit, assets, witness).await?;
    proof.validate_for(circuit)?;
    tracing::debug!(target: LOG_TARGET, "proof accepted");
    Ok(proof)
}
