//! Per-party driver for the keygen ceremony
//!
//! The party owns the ceremony state and serializes every transition: the
//! transport delivers inbound messages through [`KeygenParty::store_message`]
//! and re-polls [`KeygenParty::update`], which advances through as many
//! rounds as the buffered messages allow. Outbound messages and the terminal
//! save record leave through the channels supplied at construction.

use crate::commitments::Commitment;
use crate::curve::CurvePoint;
use crate::error::{CeremonyError, Error};
use crate::keygen::messages::{DecommitMessage, KeygenMessage};
use crate::keygen::rounds::{KeygenRound, Round1};
use crate::keygen::KeygenSave;
use crate::types::{Outgoing, Parameters, PartyIndex, Recipient};
use curve25519_dalek::scalar::Scalar;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, instrument, warn};
use zeroize::Zeroize;

/// Ceremony-local state shared by all rounds
pub(crate) struct KeygenCtx {
    pub(crate) params: Parameters,
    pub(crate) temp: KeygenTemp,
    pub(crate) out: UnboundedSender<Outgoing<KeygenMessage>>,
    pub(crate) end: UnboundedSender<KeygenSave>,
    /// Guards the write-once save record
    pub(crate) emitted: bool,
}

impl KeygenCtx {
    pub(crate) fn send(&self, to: Recipient, message: KeygenMessage) -> Result<(), Error> {
        self.out
            .send(Outgoing { to, message })
            .map_err(|_| Error::ChannelClosed)
    }
}

/// Working data accumulated across rounds.
///
/// Received messages live in per-sender slots; a slot doubles as the buffer
/// for messages that arrive ahead of the round that consumes them.
pub(crate) struct KeygenTemp {
    /// Locally sampled secret, consumed by the round-2 proof
    pub(crate) u_i: Option<Scalar>,
    /// Own commitment polynomial
    pub(crate) vs: Vec<CurvePoint>,
    /// Own dealt shares, one per committee member
    pub(crate) shares: Option<Vec<crate::vss::Share>>,
    /// Opening of the own round-1 commitment, revealed in round 2
    pub(crate) decommitment: Option<crate::commitments::Decommitment>,

    /// Round-1 commitments, by sender
    pub(crate) commits: Vec<Option<Commitment>>,
    /// Round-2 shares addressed to this party, by sender
    pub(crate) shares_in: Vec<Option<[u8; 32]>>,
    /// Round-2 decommitments and proofs, by sender
    pub(crate) decommits: Vec<Option<DecommitMessage>>,
}

impl KeygenTemp {
    fn new(n: usize) -> Self {
        Self {
            u_i: None,
            vs: Vec::new(),
            shares: None,
            decommitment: None,
            commits: vec![None; n],
            shares_in: vec![None; n],
            decommits: vec![None; n],
        }
    }
}

impl Drop for KeygenTemp {
    fn drop(&mut self) {
        self.u_i.zeroize();
        for slot in self.shares_in.iter_mut() {
            slot.zeroize();
        }
    }
}

/// One party's view of a keygen ceremony
pub struct KeygenParty {
    ctx: KeygenCtx,
    round: KeygenRound,
}

impl KeygenParty {
    /// Build a party from validated parameters and its output channels.
    ///
    /// `out` receives every outbound protocol message; `end` receives the
    /// save record exactly once, when the ceremony completes.
    pub fn new(
        params: Parameters,
        out: UnboundedSender<Outgoing<KeygenMessage>>,
        end: UnboundedSender<KeygenSave>,
    ) -> Self {
        let n = params.party_count();
        Self {
            ctx: KeygenCtx {
                temp: KeygenTemp::new(n),
                params,
                out,
                end,
                emitted: false,
            },
            round: KeygenRound::One(Round1::new(n)),
        }
    }

    /// Enter the ceremony. One-shot; a second call fails with
    /// [`Error::AlreadyStarted`].
    #[instrument(skip_all, fields(party = self.ctx.params.party_index()))]
    pub fn start(&mut self) -> Result<(), CeremonyError> {
        let number = self.round_number();
        match &mut self.round {
            KeygenRound::One(round) => round.start(&mut self.ctx),
            _ => Err(CeremonyError::local(
                number,
                Error::AlreadyStarted { round: number },
            )),
        }
    }

    /// Whether the current round expects this message type and routing
    pub fn can_accept(&self, message: &KeygenMessage) -> bool {
        match &self.round {
            KeygenRound::One(round) => round.can_accept(message),
            KeygenRound::Two(round) => round.can_accept(message),
            KeygenRound::Three(_) | KeygenRound::Finished => false,
        }
    }

    /// Buffer an inbound message.
    ///
    /// Messages for future rounds are kept until the round that consumes
    /// them; a second message for an occupied (sender, type) slot is dropped,
    /// so each message is processed at most once.
    pub fn store_message(&mut self, message: KeygenMessage) -> Result<(), CeremonyError> {
        let number = self.round_number();
        let me = self.ctx.params.party_index();
        let from = message.sender();
        if !self.ctx.params.committee().contains(from) {
            return Err(CeremonyError::local(number, Error::UnknownSender(from)));
        }
        if from == me {
            debug!(party = me, "ignoring own message echoed by the transport");
            return Ok(());
        }
        match message {
            KeygenMessage::Commit(msg) => {
                store(&mut self.ctx.temp.commits[from], msg.commitment, from, "commitment")
            }
            KeygenMessage::Share(msg) => {
                if msg.to != me {
                    warn!(from, to = msg.to, party = me, "dropping misrouted share");
                    return Ok(());
                }
                store(&mut self.ctx.temp.shares_in[from], msg.share, from, "share")
            }
            KeygenMessage::Decommit(msg) => {
                store(&mut self.ctx.temp.decommits[from], msg, from, "decommitment")
            }
        }
        Ok(())
    }

    /// Absorb buffered messages and advance as far as they allow.
    ///
    /// Edge-triggered and idempotent: call again after new messages arrive.
    /// Returns `true` once the ceremony has completed and the save record has
    /// been emitted.
    #[instrument(skip_all, fields(party = self.ctx.params.party_index()))]
    pub async fn update(&mut self) -> Result<bool, CeremonyError> {
        loop {
            let ready = match &mut self.round {
                KeygenRound::One(round) => round.started && round.update(&self.ctx),
                KeygenRound::Two(round) => round.started && round.update(&self.ctx),
                KeygenRound::Three(_) => false,
                KeygenRound::Finished => return Ok(true),
            };
            if !ready {
                return Ok(false);
            }
            self.round = match std::mem::replace(&mut self.round, KeygenRound::Finished) {
                KeygenRound::One(round) => KeygenRound::Two(round.next()),
                KeygenRound::Two(round) => KeygenRound::Three(round.next()),
                other => other,
            };
            let finished = match &mut self.round {
                KeygenRound::Two(round) => {
                    round.start(&mut self.ctx)?;
                    false
                }
                KeygenRound::Three(round) => {
                    round.start(&mut self.ctx).await?;
                    true
                }
                _ => false,
            };
            if finished {
                self.round = KeygenRound::Finished;
                return Ok(true);
            }
        }
    }

    /// Whether the ceremony has completed and emitted its save record
    pub fn is_finished(&self) -> bool {
        matches!(self.round, KeygenRound::Finished)
    }

    /// The number of the round currently in progress
    pub fn round_number(&self) -> u16 {
        match &self.round {
            KeygenRound::One(_) => 1,
            KeygenRound::Two(_) => 2,
            KeygenRound::Three(_) | KeygenRound::Finished => 3,
        }
    }
}

fn store<T>(slot: &mut Option<T>, value: T, from: PartyIndex, kind: &'static str) {
    if slot.is_some() {
        warn!(from, kind, "duplicate message dropped");
    } else {
        *slot = Some(value);
    }
}
