//! Client-side cryptographic core for the eERC encrypted-token protocol:
//! Baby Jubjub ElGamal and Poseidon ciphertexts, deterministic key
//! derivation, witness assembly for the five proved operations, and
//! verified balance reconstruction. Proving, transaction submission, and
//! log polling live behind the seams in [`prover`] and [`contract`].

pub mod address;
pub mod balance;
pub mod config;
pub mod contract;
pub mod crypto_serde;
pub mod error;
pub mod field;
pub mod jubjub;
pub mod keys;
pub mod metadata;
pub mod operations;
pub mod pct;
pub mod poseidon;
pub mod prover;

pub use address::Address;
pub use config::poseidon_config;
pub use error::EercError;
pub use jubjub::{ElGamalCiphertext, KeyPair};
pub use operations::DeploymentMode;
pub use pct::PoseidonCiphertext;
