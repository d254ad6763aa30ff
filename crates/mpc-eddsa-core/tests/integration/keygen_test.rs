//! Honest keygen ceremonies: completion, consistency, reconstruction, and
//! arrival-order independence

use crate::support::{self, DeliveryOrder};
use curve25519_dalek::scalar::Scalar;
use mpc_eddsa_core::{signing, CurvePoint, KeygenSave};

/// Every party must agree on the public outputs of the ceremony
fn assert_consistent(saves: &[KeygenSave]) {
    let reference = &saves[0];
    for save in saves {
        assert_eq!(save.public_key, reference.public_key);
        assert_eq!(save.ks, reference.ks);
        assert_eq!(save.big_x, reference.big_x);
    }
}

/// Lagrange-interpolate the secret shares of `subset` at zero and check the
/// result against the group public key
fn assert_reconstructs(saves: &[KeygenSave], subset: &[usize]) {
    let keys: Vec<Scalar> = subset.iter().map(|&i| saves[i].ks[i]).collect();
    let mut secret = Scalar::ZERO;
    for (pos, &i) in subset.iter().enumerate() {
        let lambda = signing::lagrange_coefficient(pos, &keys).unwrap();
        secret += lambda * saves[i].x_i;
    }
    assert_eq!(CurvePoint::base_mul(&secret), saves[0].public_key);
}

#[tokio::test]
async fn test_three_party_ceremony_completes() {
    let saves = support::keygen_saves(3, 1).await;

    assert_eq!(saves.len(), 3);
    assert_consistent(&saves);

    // shares are pairwise distinct
    assert_ne!(saves[0].x_i, saves[1].x_i);
    assert_ne!(saves[1].x_i, saves[2].x_i);

    // any t+1 subset recovers the group secret
    assert_reconstructs(&saves, &[0, 1]);
    assert_reconstructs(&saves, &[1, 2]);
    assert_reconstructs(&saves, &[0, 2]);
    assert_reconstructs(&saves, &[0, 1, 2]);
}

#[tokio::test]
async fn test_four_party_higher_threshold() {
    let saves = support::keygen_saves(4, 2).await;

    assert_consistent(&saves);
    assert_reconstructs(&saves, &[0, 1, 2]);
    assert_reconstructs(&saves, &[1, 2, 3]);

    // two shares are not enough to hit the right constant term except with
    // negligible probability
    let keys: Vec<Scalar> = vec![saves[0].ks[0], saves[1].ks[1]];
    let short = signing::lagrange_coefficient(0, &keys).unwrap() * saves[0].x_i
        + signing::lagrange_coefficient(1, &keys).unwrap() * saves[1].x_i;
    assert_ne!(CurvePoint::base_mul(&short), saves[0].public_key);
}

#[tokio::test]
async fn test_single_party_ceremony() {
    let saves = support::keygen_saves(1, 0).await;
    assert_eq!(saves.len(), 1);
    assert_eq!(CurvePoint::base_mul(&saves[0].x_i), saves[0].public_key);
    assert_eq!(saves[0].big_x[0], saves[0].public_key);
}

#[tokio::test]
async fn test_arrival_order_does_not_change_outputs() {
    // deliver every sweep's messages in reverse: decommitments before
    // shares, later senders before earlier ones
    let results =
        support::run_keygen_with(4, 1, DeliveryOrder::Reversed, |_, _, _| {}).await;
    let saves: Vec<KeygenSave> = results
        .into_iter()
        .map(|result| result.expect("reordered delivery must still complete"))
        .collect();

    assert_consistent(&saves);
    assert_reconstructs(&saves, &[0, 3]);
}
