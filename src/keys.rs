//! Deterministic key derivation from a wallet signature.
//!
//! A user's protocol key is derived once per session by signing a fixed
//! registration message and reducing the signature's `r ‖ s` halves mod the
//! subgroup order. Any client that reproduces the message byte-for-byte
//! derives the same key.

use ark_ff::{PrimeField, Zero};
use async_trait::async_trait;

use crate::address::Address;
use crate::error::EercError;
use crate::field::Fr;
use crate::jubjub::KeyPair;

const REGISTRATION_PREFIX: &str = "eERC\nRegistering user with\n Address:";

/// The exact message the wallet signs for key derivation. Bit-exact:
/// changing a byte derives a different key.
pub fn registration_message(address: &Address) -> String {
    format!("{REGISTRATION_PREFIX}{}", address.to_lowercase_hex())
}

/// Derives the session key pair from a 64- or 65-byte ECDSA signature
/// (`r ‖ s` or `r ‖ s ‖ v`).
pub fn derive_key_from_signature(signature: &[u8]) -> Result<KeyPair, EercError> {
    if signature.len() != 64 && signature.len() != 65 {
        return Err(EercError::InvalidSignature(format!(
            "expected 64 or 65 bytes, got {}",
            signature.len()
        )));
    }
    let sk = Fr::from_be_bytes_mod_order(&signature[..64]);
    if sk.is_zero() {
        return Err(EercError::WeakKey);
    }
    KeyPair::new(sk)
}

/// The wallet's signature oracle, the first of the engine's suspension
/// points. Implementations must sign with the account that owns `address`.
#[async_trait]
pub trait MessageSigner {
    async fn sign_message(&self, message: &str) -> Result<Vec<u8>, EercError>;
}

/// Signs the registration message for `address` and derives the key pair.
pub async fn derive_key_for<S>(address: &Address, signer: &S) -> Result<KeyPair, EercError>
where
    S: MessageSigner + ?Sized + Sync,
{
    if address.is_zero() {
        return Err(EercError::InvalidAddress("zero address".into()));
    }
    let signature = signer.sign_message(&registration_message(address)).await?;
    derive_key_from_signature(&signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_message_is_bit_exact() {
        let addr = Address::parse("0xAbCdEf0123456789abcdef0123456789ABCDEF01").unwrap();
        assert_eq!(
            registration_message(&addr),
            "eERC\nRegistering user with\n Address:0xabcdef0123456789abcdef0123456789abcdef01"
        );
    }

    #[test]
    fn derivation_is_deterministic_in_the_signature() {
        let sig = [0x5au8; 65];
        let a = derive_key_from_signature(&sig).unwrap();
        let b = derive_key_from_signature(&sig).unwrap();
        assert_eq!(a.secret(), b.secret());
        assert_eq!(a.public(), b.public());

        let mut other = sig;
        other[10] ^= 0xff;
        let c = derive_key_from_signature(&other).unwrap();
        assert_ne!(a.secret(), c.secret());
    }

    #[test]
    fn recovery_byte_does_not_matter() {
        let mut sig = [0x11u8; 65];
        let with_v = derive_key_from_signature(&sig).unwrap();
        sig[64] = 0x99;
        let other_v = derive_key_from_signature(&sig).unwrap();
        assert_eq!(with_v.secret(), other_v.secret());
    }

    #[test]
    fn zero_signature_is_a_weak_key() {
        assert!(matches!(
            derive_key_from_signature(&[0u8; 64]),
            Err(EercError::WeakKey)
        ));
    }

    #[test]
    fn malformed_lengths_are_rejected() {
        assert!(matches!(
            derive_key_from_signature(&[1u8; 63]),
            Err(EercError::InvalidSignature(_))
        ));
        assert!(matches!(
            derive_key_from_signature(&[1u8; 70]),
            Err(EercError::InvalidSignature(_))
        ));
    }

    struct FixedSigner(Vec<u8>);

    #[async_trait]
    impl MessageSigner for FixedSigner {
        async fn sign_message(&self, message: &str) -> Result<Vec<u8>, EercError> {
            assert!(message.starts_with("eERC\n"));
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn derive_key_for_threads_the_oracle() {
        let signer = FixedSigner(vec![0x42u8; 65]);
        let addr = Address::parse("0x00000000000000000000000000000000000000aa").unwrap();
        let key = derive_key_for(&addr, &signer).await.unwrap();
        assert_eq!(
            key.secret(),
            derive_key_from_signature(&[0x42u8; 65]).unwrap().secret()
        );
    }

    #[tokio::test]
    async fn zero_address_is_rejected() {
        let signer = FixedSigner(vec![0x42u8; 65]);
        assert!(matches!(
            derive_key_for(&Address::ZERO, &signer).await,
            Err(EercError::InvalidAddress(_))
        ));
    }
}
