//! End-to-end flow: a ledger-shaped sequence of mint, transfer, and
//! withdraw, with the balance reconstructed and cross-checked after every
//! step the way a reading client would.

use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::Zero;
use ark_std::rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::balance::{reconstruct_total_balance, AmountPct, BalanceEncoding};
use crate::contract::decrypt_auditor_amount;
use crate::field::Fq;
use crate::jubjub::{amount_to_point, nonzero_scalar, ElGamalCiphertext, KeyPair};
use crate::pct::PCT_WIRE_LEN;

fn empty_encoding() -> BalanceEncoding {
    BalanceEncoding {
        egct: ElGamalCiphertext::zero(),
        nonce: 0,
        amount_pcts: Vec::new(),
        balance_pct: [Fq::zero(); PCT_WIRE_LEN],
    }
}

/// Mirrors the contract: append the incoming credit and fold the EGCT.
fn apply_credit(encoding: &mut BalanceEncoding, egct: &ElGamalCiphertext, pct: [Fq; PCT_WIRE_LEN]) {
    encoding.egct = encoding.egct.add_layer(egct);
    let index = encoding.amount_pcts.len() as u64;
    encoding.amount_pcts.push(AmountPct { pct, index });
}

/// Mirrors the contract: debit the spend EGCT, reset the credit queue, and
/// install the sender's rewritten rolling balance PCT.
fn apply_debit(
    encoding: &mut BalanceEncoding,
    spent_egct: &ElGamalCiphertext,
    balance_pct: [Fq; PCT_WIRE_LEN],
) {
    encoding.egct = encoding.egct.sub_layer(spent_egct);
    encoding.amount_pcts.clear();
    encoding.balance_pct = balance_pct;
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn mint_transfer_withdraw_flow_reconstructs_at_every_step() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(81);
    let alice = KeyPair::new(nonzero_scalar(&mut rng)).unwrap();
    let bob = KeyPair::new(nonzero_scalar(&mut rng)).unwrap();
    let auditor = KeyPair::new(nonzero_scalar(&mut rng)).unwrap();
    let chain_id = 43114;

    let mut alice_enc = empty_encoding();
    let mut bob_enc = empty_encoding();

    // Mint 100 to alice.
    let mint = prepare_mint(
        DeploymentMode::Standalone,
        &alice.public(),
        100,
        &auditor.public(),
        chain_id,
        &mut rng,
    )
    .unwrap();
    apply_credit(&mut alice_enc, &mint.receiver_egct, mint.receiver_amount_pct);
    assert_eq!(
        reconstruct_total_balance(alice.secret(), &alice_enc).unwrap(),
        100
    );
    assert_eq!(
        decrypt_auditor_amount(&auditor, &mint.auditor_pct).unwrap(),
        100
    );

    // Alice sends 30 to bob.
    let transfer = prepare_transfer(
        &alice,
        &bob.public(),
        30,
        100,
        &alice_enc.egct,
        &auditor.public(),
        &mut rng,
    )
    .unwrap();
    let spent = ElGamalCiphertext::new(
        transfer.witness.sender_vtt_c1,
        transfer.witness.sender_vtt_c2,
    );
    apply_debit(&mut alice_enc, &spent, transfer.sender_balance_pct);
    apply_credit(&mut bob_enc, &transfer.receiver_egct, transfer.receiver_amount_pct);

    assert_eq!(
        reconstruct_total_balance(alice.secret(), &alice_enc).unwrap(),
        70
    );
    assert_eq!(reconstruct_total_balance(bob.secret(), &bob_enc).unwrap(), 30);
    assert_eq!(
        decrypt_auditor_amount(&auditor, &transfer.auditor_pct).unwrap(),
        30
    );

    // Alice withdraws 40. The contract knows the public amount and debits
    // the EGCT by 40 · Base8 directly.
    let withdraw = prepare_withdraw(
        DeploymentMode::Converter,
        &alice,
        40,
        70,
        &alice_enc.egct,
        &auditor.public(),
        &mut rng,
    )
    .unwrap();
    let debit = ElGamalCiphertext::new(
        ark_ed_on_bn254::EdwardsAffine::zero(),
        amount_to_point(40).into_affine(),
    );
    apply_debit(&mut alice_enc, &debit, withdraw.sender_balance_pct);

    assert_eq!(
        reconstruct_total_balance(alice.secret(), &alice_enc).unwrap(),
        30
    );
    assert_eq!(
        decrypt_auditor_amount(&auditor, &withdraw.auditor_pct).unwrap(),
        40
    );

    // A dropped credit shows up as an inconsistency, not a wrong number.
    let mint2 = prepare_mint(
        DeploymentMode::Standalone,
        &alice.public(),
        5,
        &auditor.public(),
        chain_id,
        &mut rng,
    )
    .unwrap();
    alice_enc.egct = alice_enc.egct.add_layer(&mint2.receiver_egct);
    assert!(matches!(
        reconstruct_total_balance(alice.secret(), &alice_enc),
        Err(crate::error::EercError::InconsistentBalance)
    ));
}

#[test]
fn nullifiers_differ_across_mints() {
    let mut rng = StdRng::seed_from_u64(82);
    let user = KeyPair::new(nonzero_scalar(&mut rng)).unwrap();
    let auditor = KeyPair::new(nonzero_scalar(&mut rng)).unwrap();
    let a = prepare_mint(
        DeploymentMode::Standalone,
        &user.public(),
        9,
        &auditor.public(),
        1,
        &mut rng,
    )
    .unwrap();
    let b = prepare_mint(
        DeploymentMode::Standalone,
        &user.public(),
        9,
        &auditor.public(),
        1,
        &mut rng,
    )
    .unwrap();
    assert_ne!(a.nullifier, b.nullifier);

    // Same auditor ciphertext on a different chain binds differently.
    let on_other_chain = crate::poseidon::poseidon5(
        Fq::from(2u64),
        a.witness.auditor_pct[0],
        a.witness.auditor_pct[1],
        a.witness.auditor_pct[2],
        a.witness.auditor_pct[3],
    );
    assert_ne!(a.nullifier, on_other_chain);
}
