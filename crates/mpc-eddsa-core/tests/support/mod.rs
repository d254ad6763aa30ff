//! In-memory message router for multi-party ceremony tests
//!
//! Plays the role of the transport: drains every party's outbound channel,
//! fans broadcasts out, and re-polls the parties until the ceremony settles.
//! Delivery order and message contents are under test control, which is how
//! the fault-injection scenarios impersonate misbehaving peers.

use curve25519_dalek::scalar::Scalar;
use mpc_eddsa_core::error::CeremonyError;
use mpc_eddsa_core::resharing::ReshareRound1Outcome;
use mpc_eddsa_core::{
    Committee, KeygenMessage, KeygenParty, KeygenSave, Parameters, Recipient, ReshareMessage,
    ReshareParameters, ReshareParty,
};
use tokio::sync::mpsc;

/// Delivery order applied within each routing sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOrder {
    Natural,
    Reversed,
}

/// A committee whose key scalars are `first..first + n`
pub fn committee(first: u64, n: usize) -> Committee {
    Committee::new((0..n as u64).map(|i| Scalar::from(first + i)).collect()).unwrap()
}

/// Run a full keygen ceremony with honest parties
pub async fn run_keygen(n: usize, t: usize) -> Vec<Result<KeygenSave, CeremonyError>> {
    run_keygen_with(n, t, DeliveryOrder::Natural, |_, _, _| {}).await
}

/// Run a full keygen ceremony, applying `tamper` to every delivered message.
///
/// `tamper` sees the sender index, the concrete recipient index, and the
/// message about to be delivered.
pub async fn run_keygen_with<F>(
    n: usize,
    t: usize,
    order: DeliveryOrder,
    mut tamper: F,
) -> Vec<Result<KeygenSave, CeremonyError>>
where
    F: FnMut(usize, usize, &mut KeygenMessage),
{
    let committee = committee(1, n);
    let mut parties = Vec::with_capacity(n);
    let mut outs = Vec::with_capacity(n);
    let mut ends = Vec::with_capacity(n);
    for i in 0..n {
        let params = Parameters::new(committee.clone(), i, t).unwrap();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (end_tx, end_rx) = mpsc::unbounded_channel();
        parties.push(KeygenParty::new(params, out_tx, end_tx));
        outs.push(out_rx);
        ends.push(end_rx);
    }

    let mut errors: Vec<Option<CeremonyError>> = (0..n).map(|_| None).collect();
    for (i, party) in parties.iter_mut().enumerate() {
        if let Err(err) = party.start() {
            errors[i] = Some(err);
        }
    }

    for _ in 0..32 {
        // drain every outbound channel into a delivery list
        let mut deliveries: Vec<(usize, usize, KeygenMessage)> = Vec::new();
        for (i, out) in outs.iter_mut().enumerate() {
            while let Ok(outgoing) = out.try_recv() {
                match outgoing.to {
                    Recipient::Broadcast => {
                        for j in 0..n {
                            if j != i {
                                deliveries.push((i, j, outgoing.message.clone()));
                            }
                        }
                    }
                    Recipient::Party(j) => deliveries.push((i, j, outgoing.message)),
                }
            }
        }
        if order == DeliveryOrder::Reversed {
            deliveries.reverse();
        }

        for (from, to, mut message) in deliveries {
            if errors[to].is_some() {
                continue;
            }
            tamper(from, to, &mut message);
            if let Err(err) = parties[to].store_message(message) {
                errors[to] = Some(err);
            }
        }

        for i in 0..n {
            if errors[i].is_some() || parties[i].is_finished() {
                continue;
            }
            if let Err(err) = parties[i].update().await {
                errors[i] = Some(err);
            }
        }

        let settled = (0..n).all(|i| errors[i].is_some() || parties[i].is_finished());
        if settled {
            break;
        }
    }

    (0..n)
        .map(|i| match errors[i].take() {
            Some(err) => Err(err),
            None => Ok(ends[i]
                .try_recv()
                .expect("finished party must emit exactly one save record")),
        })
        .collect()
}

/// Unwrap an all-honest keygen run into its save records
pub async fn keygen_saves(n: usize, t: usize) -> Vec<KeygenSave> {
    run_keygen(n, t)
        .await
        .into_iter()
        .map(|result| result.expect("honest ceremony must complete"))
        .collect()
}

/// Run resharing round 1 from an old committee holding `saves` toward a
/// fresh committee of `new_n` members with threshold `new_t`.
///
/// Returns the outcome of every old member followed by every new member.
pub fn run_reshare_with<F>(
    saves: Vec<KeygenSave>,
    old_t: usize,
    new_n: usize,
    new_t: usize,
    mut tamper: F,
) -> (
    Vec<Result<ReshareRound1Outcome, CeremonyError>>,
    Vec<Result<ReshareRound1Outcome, CeremonyError>>,
)
where
    F: FnMut(usize, usize, &mut ReshareMessage),
{
    let old_committee = Committee::new(saves[0].ks.clone()).unwrap();
    let new_committee = committee(101, new_n);
    let old_n = old_committee.len();

    let mut old_parties = Vec::with_capacity(old_n);
    let mut old_outs = Vec::with_capacity(old_n);
    for (i, save) in saves.into_iter().enumerate() {
        let params = ReshareParameters::new(
            old_committee.clone(),
            old_t,
            new_committee.clone(),
            new_t,
            Some(i),
            None,
        )
        .unwrap();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        old_parties.push(ReshareParty::new(params, Some(save), out_tx).unwrap());
        old_outs.push(out_rx);
    }

    let mut new_parties = Vec::with_capacity(new_n);
    for j in 0..new_n {
        let params = ReshareParameters::new(
            old_committee.clone(),
            old_t,
            new_committee.clone(),
            new_t,
            None,
            Some(j),
        )
        .unwrap();
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        new_parties.push(ReshareParty::new(params, None, out_tx).unwrap());
    }

    let mut old_errors: Vec<Option<CeremonyError>> = (0..old_n).map(|_| None).collect();
    let mut new_errors: Vec<Option<CeremonyError>> = (0..new_n).map(|_| None).collect();

    for (i, party) in old_parties.iter_mut().enumerate() {
        if let Err(err) = party.start() {
            old_errors[i] = Some(err);
        }
    }
    for (j, party) in new_parties.iter_mut().enumerate() {
        if let Err(err) = party.start() {
            new_errors[j] = Some(err);
        }
    }

    for (i, out) in old_outs.iter_mut().enumerate() {
        while let Ok(outgoing) = out.try_recv() {
            assert_eq!(outgoing.to, Recipient::Broadcast);
            for (j, party) in new_parties.iter_mut().enumerate() {
                if new_errors[j].is_some() {
                    continue;
                }
                let mut message = outgoing.message.clone();
                tamper(i, j, &mut message);
                if let Err(err) = party.store_message(message) {
                    new_errors[j] = Some(err);
                }
            }
        }
    }

    for (i, party) in old_parties.iter_mut().enumerate() {
        if old_errors[i].is_none() {
            if let Err(err) = party.update() {
                old_errors[i] = Some(err);
            }
        }
    }
    for (j, party) in new_parties.iter_mut().enumerate() {
        if new_errors[j].is_none() {
            if let Err(err) = party.update() {
                new_errors[j] = Some(err);
            }
        }
    }

    let old_outcomes = old_parties
        .into_iter()
        .zip(old_errors)
        .map(|(party, error)| match error {
            Some(err) => Err(err),
            None => party.into_outcome(),
        })
        .collect();
    let new_outcomes = new_parties
        .into_iter()
        .zip(new_errors)
        .map(|(party, error)| match error {
            Some(err) => Err(err),
            None => party.into_outcome(),
        })
        .collect();
    (old_outcomes, new_outcomes)
}
