//! Per-party driver for resharing round 1

use crate::curve::CurvePoint;
use crate::error::{CeremonyError, Error};
use crate::keygen::KeygenSave;
use crate::resharing::messages::{ReshareMessage, ReshareRound1Message};
use crate::resharing::rounds::{ReshareRound, Round1};
use crate::resharing::{DealtShares, ReshareParameters, ReshareRound1Outcome};
use crate::types::{Outgoing, Recipient};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, instrument, warn};

/// Ceremony-local state shared by the resharing rounds
pub(crate) struct ReshareCtx {
    pub(crate) params: ReshareParameters,
    /// Keygen save record; present iff this party sits in the old committee
    pub(crate) input: Option<KeygenSave>,
    pub(crate) temp: ReshareTemp,
    /// The group public key on record: dealers know it from keygen, new
    /// members learn it from the first broadcast
    pub(crate) public_key: Option<CurvePoint>,
    pub(crate) out: UnboundedSender<Outgoing<ReshareMessage>>,
}

impl ReshareCtx {
    pub(crate) fn send(&self, to: Recipient, message: ReshareMessage) -> Result<(), Error> {
        self.out
            .send(Outgoing { to, message })
            .map_err(|_| Error::ChannelClosed)
    }
}

pub(crate) struct ReshareTemp {
    /// Round-1 broadcasts, by old-committee sender
    pub(crate) round1: Vec<Option<ReshareRound1Message>>,
    /// Shares dealt toward the new committee, held for the delivery rounds
    pub(crate) dealt: Option<DealtShares>,
}

/// One party's view of a resharing ceremony
pub struct ReshareParty {
    ctx: ReshareCtx,
    round: ReshareRound,
}

impl ReshareParty {
    /// Build a party from validated parameters and its outbound channel.
    ///
    /// Old-committee members must supply the save record of the keygen
    /// ceremony being reshared; members of the new committee only must not.
    pub fn new(
        params: ReshareParameters,
        input: Option<KeygenSave>,
        out: UnboundedSender<Outgoing<ReshareMessage>>,
    ) -> Result<Self, Error> {
        match (params.old_index(), &input) {
            (Some(_), None) => {
                return Err(Error::InvalidCommittee(
                    "old-committee members require their keygen save".into(),
                ))
            }
            (None, Some(_)) => {
                return Err(Error::InvalidCommittee(
                    "keygen save supplied without old-committee membership".into(),
                ))
            }
            _ => {}
        }
        if let Some(save) = &input {
            if save.ks != params.old_committee().keys() {
                return Err(Error::InvalidCommittee(
                    "keygen save does not match the old committee".into(),
                ));
            }
        }
        let old_n = params.old_committee().len();
        let new_n = params.new_committee().len();
        let public_key = input.as_ref().map(|save| save.public_key);
        Ok(Self {
            ctx: ReshareCtx {
                temp: ReshareTemp { round1: vec![None; old_n], dealt: None },
                params,
                input,
                public_key,
                out,
            },
            round: ReshareRound::One(Round1::new(old_n, new_n)),
        })
    }

    /// Enter the ceremony. One-shot.
    #[instrument(skip_all, fields(old = ?self.ctx.params.old_index(), new = ?self.ctx.params.new_index()))]
    pub fn start(&mut self) -> Result<(), CeremonyError> {
        match &mut self.round {
            ReshareRound::One(round) => round.start(&mut self.ctx),
            ReshareRound::Finished => Err(CeremonyError::local(
                1,
                Error::AlreadyStarted { round: 1 },
            )),
        }
    }

    /// Whether the current round expects this message type and routing
    pub fn can_accept(&self, message: &ReshareMessage) -> bool {
        match &self.round {
            ReshareRound::One(round) => round.can_accept(message),
            ReshareRound::Finished => false,
        }
    }

    /// Buffer an inbound broadcast from an old-committee member
    pub fn store_message(&mut self, message: ReshareMessage) -> Result<(), CeremonyError> {
        let from = message.sender();
        if !self.ctx.params.old_committee().contains(from) {
            return Err(CeremonyError::local(1, Error::UnknownSender(from)));
        }
        if self.ctx.params.old_index() == Some(from) {
            debug!(from, "ignoring own broadcast echoed by the transport");
            return Ok(());
        }
        let ReshareMessage::Round1(msg) = message;
        let slot = &mut self.ctx.temp.round1[from];
        if slot.is_some() {
            warn!(from, "duplicate resharing broadcast dropped");
        } else {
            *slot = Some(msg);
        }
        Ok(())
    }

    /// Absorb buffered broadcasts; `true` once every old member's hand-off
    /// has been received and cross-checked
    #[instrument(skip_all, fields(old = ?self.ctx.params.old_index(), new = ?self.ctx.params.new_index()))]
    pub fn update(&mut self) -> Result<bool, CeremonyError> {
        let ready = match &mut self.round {
            ReshareRound::One(round) => round.started && round.update(&mut self.ctx)?,
            ReshareRound::Finished => return Ok(true),
        };
        if !ready {
            return Ok(false);
        }
        self.round = ReshareRound::Finished;
        Ok(true)
    }

    /// Whether round 1 has completed
    pub fn is_finished(&self) -> bool {
        matches!(self.round, ReshareRound::Finished)
    }

    /// Consume the party and hand over what the delivery rounds need
    pub fn into_outcome(mut self) -> Result<ReshareRound1Outcome, CeremonyError> {
        if !self.is_finished() {
            return Err(CeremonyError::local(1, Error::NotFinished));
        }
        let public_key = self.ctx.public_key.ok_or_else(|| {
            CeremonyError::local(
                1,
                Error::InternalArithmetic("group public key missing after completion".into()),
            )
        })?;
        Ok(ReshareRound1Outcome {
            public_key,
            dealt: self.ctx.temp.dealt.take(),
        })
    }
}
