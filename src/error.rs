use thiserror::Error;

/// Failure taxonomy for the client core.
///
/// Every fallible path surfaces one of these; the core never retries and
/// never mutates state on failure, so callers may retry any operation with
/// fresh randomness.
#[derive(Error, Debug)]
pub enum EercError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("{operation} is not available in {mode} mode")]
    NotPermittedInMode {
        operation: &'static str,
        mode: &'static str,
    },

    #[error("auditor public key is not set")]
    AuditorNotSet,

    #[error("counterparty is not registered")]
    UnregisteredParty,

    #[error("no decryption key available in this session")]
    MissingKey,

    #[error("point is not on the curve or not in the prime-order subgroup")]
    InvalidPoint,

    #[error("arithmetic failure: {0}")]
    ArithmeticError(String),

    #[error("prover failure: {0}")]
    ProverError(String),

    #[error("balance ciphertexts are inconsistent")]
    InconsistentBalance,

    #[error("derived key reduced to zero")]
    WeakKey,

    #[error("invalid signature material: {0}")]
    InvalidSignature(String),

    #[error("serialization failure: {0}")]
    Serialization(String),
}
