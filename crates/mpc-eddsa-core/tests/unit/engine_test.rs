//! Engine behavior through the public API: round gating, buffering,
//! duplicate handling, and idempotent updates

use crate::support;
use mpc_eddsa_core::keygen::{CommitMessage, ShareMessage};
use mpc_eddsa_core::{
    CeremonyError, Error, KeygenMessage, KeygenParty, Parameters, ReshareParameters,
};
use tokio::sync::mpsc;

fn test_party(
    n: usize,
    t: usize,
    index: usize,
) -> (
    KeygenParty,
    mpsc::UnboundedReceiver<mpc_eddsa_core::Outgoing<KeygenMessage>>,
    mpsc::UnboundedReceiver<mpc_eddsa_core::KeygenSave>,
) {
    let params = Parameters::new(support::committee(1, n), index, t).unwrap();
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (end_tx, end_rx) = mpsc::unbounded_channel();
    (KeygenParty::new(params, out_tx, end_tx), out_rx, end_rx)
}

fn commit_from(from: usize) -> KeygenMessage {
    KeygenMessage::Commit(CommitMessage {
        from,
        commitment: [from as u8; 32],
    })
}

fn drain_count(rx: &mut mpsc::UnboundedReceiver<mpc_eddsa_core::Outgoing<KeygenMessage>>) -> usize {
    let mut count = 0;
    while rx.try_recv().is_ok() {
        count += 1;
    }
    count
}

#[tokio::test]
async fn test_start_is_one_shot() {
    let (mut party, _out, _end) = test_party(3, 1, 0);
    party.start().unwrap();

    let err = party.start().unwrap_err();
    assert_eq!(
        err,
        CeremonyError::Local {
            round: 1,
            cause: Error::AlreadyStarted { round: 1 }
        }
    );
    assert!(err.culprits().is_empty());
}

#[tokio::test]
async fn test_round_gating_of_message_types() {
    let (mut party, _out, _end) = test_party(3, 1, 0);
    party.start().unwrap();
    assert_eq!(party.round_number(), 1);

    // round 1 expects commitments only
    assert!(party.can_accept(&commit_from(1)));
    let share = KeygenMessage::Share(ShareMessage { from: 1, to: 0, share: [9u8; 32] });
    assert!(!party.can_accept(&share));

    // a round-2 message arriving early is buffered, not dropped
    party.store_message(share.clone()).unwrap();

    party.store_message(commit_from(1)).unwrap();
    party.store_message(commit_from(2)).unwrap();
    assert!(!party.update().await.unwrap());
    assert_eq!(party.round_number(), 2);

    // now the share type is expected, the commitment type is not
    assert!(party.can_accept(&share));
    assert!(!party.can_accept(&commit_from(1)));
}

#[tokio::test]
async fn test_unknown_sender_rejected() {
    let (mut party, _out, _end) = test_party(3, 1, 0);
    party.start().unwrap();

    let err = party.store_message(commit_from(7)).unwrap_err();
    assert_eq!(
        err,
        CeremonyError::Local { round: 1, cause: Error::UnknownSender(7) }
    );
}

#[tokio::test]
async fn test_duplicate_and_echoed_messages_ignored() {
    let (mut party, _out, _end) = test_party(3, 1, 0);
    party.start().unwrap();

    // first write wins; the duplicate is dropped without error
    party.store_message(commit_from(1)).unwrap();
    party
        .store_message(KeygenMessage::Commit(CommitMessage {
            from: 1,
            commitment: [0xaa; 32],
        }))
        .unwrap();

    // the transport may echo our own broadcast back
    party.store_message(commit_from(0)).unwrap();

    // still waiting for party 2
    assert!(!party.update().await.unwrap());
    assert_eq!(party.round_number(), 1);
}

#[tokio::test]
async fn test_misrouted_share_dropped() {
    let (mut party, _out, _end) = test_party(3, 1, 0);
    party.start().unwrap();
    party.store_message(commit_from(1)).unwrap();
    party.store_message(commit_from(2)).unwrap();
    party.update().await.unwrap();

    // a share addressed to somebody else never lands in our slots
    let misrouted = KeygenMessage::Share(ShareMessage { from: 1, to: 2, share: [1u8; 32] });
    party.store_message(misrouted).unwrap();
    assert!(!party.update().await.unwrap());
}

#[tokio::test]
async fn test_update_is_idempotent_and_emits_once() {
    let (mut party, mut out, _end) = test_party(3, 1, 0);
    party.start().unwrap();
    // round 1 emits exactly one commitment broadcast
    assert_eq!(drain_count(&mut out), 1);

    assert!(!party.update().await.unwrap());
    assert!(!party.update().await.unwrap());
    assert_eq!(drain_count(&mut out), 0);

    party.store_message(commit_from(1)).unwrap();
    party.store_message(commit_from(2)).unwrap();

    // advancing to round 2 emits two shares and one decommitment, once
    assert!(!party.update().await.unwrap());
    assert_eq!(drain_count(&mut out), 3);

    assert!(!party.update().await.unwrap());
    assert!(!party.update().await.unwrap());
    assert_eq!(drain_count(&mut out), 0);
}

#[tokio::test]
async fn test_update_before_start_does_not_advance() {
    let (mut party, mut out, _end) = test_party(3, 1, 0);

    party.store_message(commit_from(1)).unwrap();
    party.store_message(commit_from(2)).unwrap();
    assert!(!party.update().await.unwrap());
    assert_eq!(party.round_number(), 1);
    assert_eq!(drain_count(&mut out), 0);
}

#[test]
fn test_reshare_membership_validation() {
    let old = support::committee(1, 3);
    let new = support::committee(101, 4);

    // member of neither committee
    assert!(matches!(
        ReshareParameters::new(old.clone(), 1, new.clone(), 1, None, None),
        Err(Error::InvalidCommittee(_))
    ));

    // threshold not satisfiable by the committee
    assert_eq!(
        ReshareParameters::new(old.clone(), 3, new.clone(), 1, Some(0), None).unwrap_err(),
        Error::InsufficientKeys { required: 4, available: 3 }
    );
    assert_eq!(
        ReshareParameters::new(old.clone(), 1, new.clone(), 4, Some(0), None).unwrap_err(),
        Error::InsufficientKeys { required: 5, available: 4 }
    );

    assert!(ReshareParameters::new(old, 1, new, 2, Some(2), Some(0)).is_ok());
}
