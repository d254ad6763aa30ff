//! The resharing round-1 state machine
//!
//! Tracks two sender bitsets: `old_ok` for the dealers whose hand-off this
//! party must receive, `new_ok` for the new committee (which transmits
//! nothing in this round and is therefore pre-satisfied).

use crate::commitments;
use crate::curve::CurvePoint;
use crate::error::{CeremonyError, Error, Fault};
use crate::resharing::messages::{ReshareMessage, ReshareRound1Message};
use crate::resharing::party::ReshareCtx;
use crate::resharing::DealtShares;
use crate::signing;
use crate::types::Recipient;
use crate::vss;
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};
use zeroize::Zeroizing;

/// The rounds of a resharing ceremony covered by this engine
pub(crate) enum ReshareRound {
    One(Round1),
    Finished,
}

/// Round 1: project, re-deal, commit, broadcast
pub(crate) struct Round1 {
    pub(crate) started: bool,
    old_ok: Vec<bool>,
    new_ok: Vec<bool>,
}

impl Round1 {
    pub(crate) fn new(old_n: usize, new_n: usize) -> Self {
        Self {
            started: false,
            old_ok: vec![false; old_n],
            new_ok: vec![false; new_n],
        }
    }

    #[instrument(skip_all, fields(old = ?ctx.params.old_index(), new = ?ctx.params.new_index()))]
    pub(crate) fn start(&mut self, ctx: &mut ReshareCtx) -> Result<(), CeremonyError> {
        if self.started {
            return Err(CeremonyError::local(1, Error::AlreadyStarted { round: 1 }));
        }
        self.started = true;
        // nobody in the new committee transmits in this round
        for slot in self.new_ok.iter_mut() {
            *slot = true;
        }

        let Some(old_index) = ctx.params.old_index() else {
            debug!("waiting for old-committee broadcasts");
            return Ok(());
        };
        // dealers already hold the group key and receive nothing here
        for slot in self.old_ok.iter_mut() {
            *slot = true;
        }

        let input = ctx.input.as_ref().ok_or_else(|| {
            CeremonyError::local(
                1,
                Error::InternalArithmetic("keygen save missing for old-committee member".into()),
            )
        })?;
        let required = ctx.params.old_threshold() + 1;
        if required > input.ks.len() {
            return Err(CeremonyError::local(
                1,
                Error::InsufficientKeys { required, available: input.ks.len() },
            ));
        }

        // project the keygen share into additive form, then re-deal it at the
        // new committee's threshold
        let w_i = Zeroizing::new(
            signing::prepare_for_signing(old_index, &input.ks, &input.x_i)
                .map_err(|cause| CeremonyError::local(1, cause))?,
        );
        let new_keys = ctx.params.new_committee().keys();
        let (vs, shares) = vss::create(&mut OsRng, ctx.params.new_threshold(), &w_i, &new_keys)
            .map_err(|cause| CeremonyError::local(1, cause))?;

        let parts = vs.iter().map(CurvePoint::to_bytes).collect();
        let bundle = commitments::commit(&mut OsRng, parts);
        ctx.temp.dealt = Some(DealtShares {
            decommitment: bundle.decommitment,
            shares,
        });

        info!(party = old_index, "re-shared the group key toward the new committee");
        ctx.send(
            Recipient::Broadcast,
            ReshareMessage::Round1(ReshareRound1Message {
                from: old_index,
                public_key: input.public_key.to_bytes(),
                commitment: bundle.commitment,
            }),
        )
        .map_err(|cause| CeremonyError::local(1, cause))
    }

    pub(crate) fn can_accept(&self, message: &ReshareMessage) -> bool {
        matches!(message, ReshareMessage::Round1(_)) && message.is_broadcast()
    }

    pub(crate) fn update(&mut self, ctx: &mut ReshareCtx) -> Result<bool, CeremonyError> {
        // only new-committee members receive in this round
        if ctx.params.new_index().is_none() {
            return Ok(true);
        }
        let mut faults = Vec::new();
        for j in 0..self.old_ok.len() {
            if self.old_ok[j] {
                continue;
            }
            let Some(message) = ctx.temp.round1[j].as_ref() else {
                continue;
            };
            // every sender must report the same group key as the first
            // arrival; the divergent sender is the culprit
            match CurvePoint::from_bytes(&message.public_key) {
                Err(cause) => {
                    warn!(peer = j, "undecodable group public key");
                    faults.push(Fault { party: j, cause });
                }
                Ok(candidate) => {
                    let candidate = candidate.clear_cofactor();
                    match ctx.public_key {
                        Some(existing) if existing != candidate => {
                            warn!(peer = j, "group public key differs from the value on record");
                            faults.push(Fault {
                                party: j,
                                cause: Error::InconsistentPublicKey,
                            });
                        }
                        _ => {
                            ctx.public_key = Some(candidate);
                            self.old_ok[j] = true;
                        }
                    }
                }
            }
        }
        if !faults.is_empty() {
            return Err(CeremonyError::faults(1, faults));
        }
        Ok(self.old_ok.iter().all(|&done| done))
    }
}
