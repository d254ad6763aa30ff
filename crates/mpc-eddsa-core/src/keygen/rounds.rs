//! The keygen round state machine
//!
//! Each round is entered exactly once, gates on a per-sender bitset, and is
//! consumed by the transition to its successor. Round 3 carries the heavy
//! cryptographic work: every peer's contribution is verified on its own task
//! and the verdicts are folded into a single fault set before aggregation.

use crate::commitments::{self, Commitment};
use crate::curve::CurvePoint;
use crate::error::{CeremonyError, Error, Fault};
use crate::keygen::messages::{CommitMessage, DecommitMessage, KeygenMessage, ShareMessage};
use crate::keygen::party::KeygenCtx;
use crate::keygen::KeygenSave;
use crate::schnorr;
use crate::types::Recipient;
use crate::vss;
use curve25519_dalek::scalar::Scalar;
use rand::rngs::OsRng;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use zeroize::Zeroizing;

/// The rounds of a keygen ceremony
pub(crate) enum KeygenRound {
    One(Round1),
    Two(Round2),
    Three(Round3),
    Finished,
}

/// Round 1: deal, commit, broadcast the commitment
pub(crate) struct Round1 {
    pub(crate) started: bool,
    ok: Vec<bool>,
}

impl Round1 {
    pub(crate) fn new(n: usize) -> Self {
        Self { started: false, ok: vec![false; n] }
    }

    #[instrument(skip_all, fields(party = ctx.params.party_index()))]
    pub(crate) fn start(&mut self, ctx: &mut KeygenCtx) -> Result<(), CeremonyError> {
        if self.started {
            return Err(CeremonyError::local(1, Error::AlreadyStarted { round: 1 }));
        }
        self.started = true;

        let mut rng = OsRng;
        let me = ctx.params.party_index();
        let u_i = Scalar::random(&mut rng);
        let keys = ctx.params.committee().keys();
        let (vs, shares) = vss::create(&mut rng, ctx.params.threshold(), &u_i, &keys)
            .map_err(|cause| CeremonyError::local(1, cause))?;
        let parts = vs.iter().map(CurvePoint::to_bytes).collect();
        let bundle = commitments::commit(&mut rng, parts);

        debug!(party = me, "dealt secret and committed to the sharing polynomial");
        ctx.temp.u_i = Some(u_i);
        ctx.temp.vs = vs;
        ctx.temp.shares = Some(shares);
        ctx.temp.decommitment = Some(bundle.decommitment);
        self.ok[me] = true;

        ctx.send(
            Recipient::Broadcast,
            KeygenMessage::Commit(CommitMessage { from: me, commitment: bundle.commitment }),
        )
        .map_err(|cause| CeremonyError::local(1, cause))
    }

    pub(crate) fn can_accept(&self, message: &KeygenMessage) -> bool {
        matches!(message, KeygenMessage::Commit(_)) && message.is_broadcast()
    }

    pub(crate) fn update(&mut self, ctx: &KeygenCtx) -> bool {
        for (j, slot) in ctx.temp.commits.iter().enumerate() {
            if !self.ok[j] && slot.is_some() {
                self.ok[j] = true;
            }
        }
        self.ok.iter().all(|&done| done)
    }

    pub(crate) fn next(self) -> Round2 {
        Round2::new(self.ok.len())
    }
}

/// Round 2: distribute shares, reveal the commitment, prove knowledge
pub(crate) struct Round2 {
    pub(crate) started: bool,
    ok: Vec<bool>,
}

impl Round2 {
    fn new(n: usize) -> Self {
        Self { started: false, ok: vec![false; n] }
    }

    #[instrument(skip_all, fields(party = ctx.params.party_index()))]
    pub(crate) fn start(&mut self, ctx: &mut KeygenCtx) -> Result<(), CeremonyError> {
        if self.started {
            return Err(CeremonyError::local(2, Error::AlreadyStarted { round: 2 }));
        }
        self.started = true;

        let me = ctx.params.party_index();
        {
            let shares = ctx
                .temp
                .shares
                .as_ref()
                .ok_or_else(|| missing_artifact(2, "dealt shares"))?;
            for party in ctx.params.committee().iter() {
                if party.index == me {
                    continue;
                }
                let message = KeygenMessage::Share(ShareMessage {
                    from: me,
                    to: party.index,
                    share: shares[party.index].value.to_bytes(),
                });
                ctx.send(Recipient::Party(party.index), message)
                    .map_err(|cause| CeremonyError::local(2, cause))?;
            }
        }

        let u_i = Zeroizing::new(
            ctx.temp
                .u_i
                .take()
                .ok_or_else(|| missing_artifact(2, "dealt secret"))?,
        );
        let constant_term = ctx
            .temp
            .vs
            .first()
            .ok_or_else(|| missing_artifact(2, "commitment polynomial"))?;
        let proof = schnorr::prove(&mut OsRng, &u_i, constant_term);
        let decommitment = ctx
            .temp
            .decommitment
            .take()
            .ok_or_else(|| missing_artifact(2, "decommitment"))?;

        debug!(party = me, "shares distributed, revealing commitment");
        self.ok[me] = true;

        ctx.send(
            Recipient::Broadcast,
            KeygenMessage::Decommit(DecommitMessage { from: me, decommitment, proof }),
        )
        .map_err(|cause| CeremonyError::local(2, cause))
    }

    pub(crate) fn can_accept(&self, message: &KeygenMessage) -> bool {
        match message {
            KeygenMessage::Share(_) => !message.is_broadcast(),
            KeygenMessage::Decommit(_) => message.is_broadcast(),
            KeygenMessage::Commit(_) => false,
        }
    }

    pub(crate) fn update(&mut self, ctx: &KeygenCtx) -> bool {
        for j in 0..self.ok.len() {
            if self.ok[j] {
                continue;
            }
            if ctx.temp.shares_in[j].is_some() && ctx.temp.decommits[j].is_some() {
                self.ok[j] = true;
            }
        }
        self.ok.iter().all(|&done| done)
    }

    pub(crate) fn next(self) -> Round3 {
        Round3::new()
    }
}

/// Round 3: verify every peer, aggregate, emit the save record
pub(crate) struct Round3 {
    pub(crate) started: bool,
}

impl Round3 {
    fn new() -> Self {
        Self { started: false }
    }

    #[instrument(skip_all, fields(party = ctx.params.party_index()))]
    pub(crate) async fn start(&mut self, ctx: &mut KeygenCtx) -> Result<(), CeremonyError> {
        if self.started {
            return Err(CeremonyError::local(3, Error::AlreadyStarted { round: 3 }));
        }
        self.started = true;
        if ctx.emitted {
            return Err(CeremonyError::local(
                3,
                Error::InternalArithmetic("save record already emitted for this ceremony".into()),
            ));
        }

        let me = ctx.params.party_index();
        let n = ctx.params.party_count();
        let t = ctx.params.threshold();

        // secret share: own dealt evaluation plus every received share
        let mut x_i = {
            let own = ctx
                .temp
                .shares
                .as_ref()
                .ok_or_else(|| missing_artifact(3, "dealt shares"))?;
            own[me].value
        };
        for j in 0..n {
            if j == me {
                continue;
            }
            let raw = ctx.temp.shares_in[j].ok_or_else(|| missing_artifact(3, "peer share"))?;
            x_i += Scalar::from_bytes_mod_order(raw);
        }

        // one verification task per peer; all run to completion so a single
        // error carries the complete culprit set
        let my_key = ctx.params.local_key();
        let mut handles: Vec<Option<JoinHandle<Result<Vec<CurvePoint>, Error>>>> =
            Vec::with_capacity(n);
        for j in 0..n {
            if j == me {
                handles.push(None);
                continue;
            }
            let commitment = ctx.temp.commits[j].ok_or_else(|| missing_artifact(3, "commitment"))?;
            let message = ctx.temp.decommits[j]
                .clone()
                .ok_or_else(|| missing_artifact(3, "decommitment"))?;
            let share = ctx.temp.shares_in[j].ok_or_else(|| missing_artifact(3, "peer share"))?;
            handles.push(Some(tokio::spawn(async move {
                verify_peer(t, my_key, commitment, message, share)
            })));
        }

        let mut peer_polys: Vec<Option<Vec<CurvePoint>>> = (0..n).map(|_| None).collect();
        let mut faults = Vec::new();
        for (j, handle) in handles.into_iter().enumerate() {
            let Some(handle) = handle else { continue };
            match handle.await {
                Ok(Ok(points)) => peer_polys[j] = Some(points),
                Ok(Err(cause)) => {
                    warn!(party = me, peer = j, %cause, "peer verification failed");
                    faults.push(Fault { party: j, cause });
                }
                Err(err) => {
                    return Err(CeremonyError::local(
                        3,
                        Error::InternalArithmetic(format!(
                            "verification task for peer {j} failed: {err}"
                        )),
                    ))
                }
            }
        }
        if !faults.is_empty() {
            return Err(CeremonyError::faults(3, faults));
        }

        // aggregate the commitment polynomials coefficient-wise
        let mut vc = ctx.temp.vs.clone();
        if vc.len() != t + 1 {
            return Err(missing_artifact(3, "commitment polynomial"));
        }
        for j in 0..n {
            if j == me {
                continue;
            }
            let points = peer_polys[j]
                .as_ref()
                .ok_or_else(|| missing_artifact(3, "verified peer polynomial"))?;
            for c in 0..=t {
                vc[c] = vc[c] + points[c];
            }
        }

        // public share of each party: the aggregate polynomial at its key,
        // with the scalar powers built iteratively
        let mut big_x = Vec::with_capacity(n);
        for party in ctx.params.committee().iter() {
            let mut acc = vc[0];
            let mut z = Scalar::ONE;
            for c in 1..=t {
                z *= party.key;
                acc = acc + vc[c] * z;
            }
            big_x.push(acc);
        }

        // the group public key is the aggregate constant term; honest inputs
        // cannot make this fail, so a failure here is ours alone
        let public_key = vc[0];
        if public_key.is_identity() || !public_key.is_prime_subgroup() {
            return Err(CeremonyError::local(
                3,
                Error::InternalArithmetic("aggregated public key is not a valid group element".into()),
            ));
        }

        info!(
            party = me,
            public_key = %hex::encode(public_key.to_bytes()),
            "key generation complete"
        );

        let save = KeygenSave {
            x_i,
            big_x,
            public_key,
            ks: ctx.params.committee().keys(),
        };
        ctx.emitted = true;
        ctx.end
            .send(save)
            .map_err(|_| CeremonyError::local(3, Error::ChannelClosed))
    }
}

/// All checks a single peer's round-1/round-2 material must pass.
///
/// Returns the peer's cofactor-cleared commitment polynomial on success, the
/// attributable cause on failure.
fn verify_peer(
    threshold: usize,
    verifier_key: Scalar,
    commitment: Commitment,
    message: DecommitMessage,
    share: [u8; 32],
) -> Result<Vec<CurvePoint>, Error> {
    let opened = message
        .decommitment
        .open(&commitment)
        .ok_or(Error::CommitmentMismatch)?;

    let mut points = Vec::with_capacity(opened.len());
    for bytes in opened {
        points.push(CurvePoint::from_bytes(bytes)?.clear_cofactor());
    }
    if points.len() != threshold + 1 {
        return Err(Error::VssRejected);
    }

    if !message.proof.verify(&points[0]) {
        return Err(Error::ProofRejected);
    }

    let share = vss::Share {
        id: verifier_key,
        value: Scalar::from_bytes_mod_order(share),
    };
    if !vss::verify_share(threshold, &points, &share) {
        return Err(Error::VssRejected);
    }
    Ok(points)
}

fn missing_artifact(round: u16, what: &str) -> CeremonyError {
    CeremonyError::local(
        round,
        Error::InternalArithmetic(format!("{what} missing from ceremony state")),
    )
}
