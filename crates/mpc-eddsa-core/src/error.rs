//! Error types for ceremony operations

use crate::types::PartyIndex;
use thiserror::Error;

/// Result type alias for ceremony operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur inside the cryptographic modules and the engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // ============ Local Preconditions ============
    /// Round entered twice
    #[error("round {round} already started")]
    AlreadyStarted { round: u16 },

    /// Too few evaluation points for the requested threshold
    #[error("t+1={required} is not satisfied by the key count of {available}")]
    InsufficientKeys { required: usize, available: usize },

    /// Committee construction failed validation
    #[error("invalid committee: {0}")]
    InvalidCommittee(String),

    // ============ Peer-Attributable Failures ============
    /// Decommitment does not open the commitment received earlier
    #[error("decommitment does not open the received commitment")]
    CommitmentMismatch,

    /// Schnorr proof of secret knowledge was rejected
    #[error("schnorr proof verification failed")]
    ProofRejected,

    /// Share does not satisfy the committed sharing polynomial
    #[error("share verification against the commitment vector failed")]
    VssRejected,

    /// Received bytes are not a canonical on-curve point
    #[error("point is not a canonical curve element")]
    OffCurve,

    /// Resharing senders disagree on the group public key
    #[error("group public key does not match the value received previously")]
    InconsistentPublicKey,

    // ============ Engine Plumbing ============
    /// Aggregation of supposedly honest inputs produced an invalid result
    #[error("internal arithmetic error: {0}")]
    InternalArithmetic(String),

    /// Message sender is outside the expected committee
    #[error("sender {0} is not a member of the expected committee")]
    UnknownSender(PartyIndex),

    /// Outbound or terminal channel closed while the ceremony was running
    #[error("ceremony channel closed before completion")]
    ChannelClosed,

    /// Terminal output requested before the ceremony reached its last round
    #[error("ceremony has not reached its terminal round")]
    NotFinished,
}

/// A single attributed failure: which peer, and what went wrong
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Index of the misbehaving party
    pub party: PartyIndex,
    /// The underlying failure
    pub cause: Error,
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "party {}: {}", self.party, self.cause)
    }
}

/// A failed ceremony round.
///
/// Local failures (preconditions, configuration, internal arithmetic) carry
/// no culprits. Peer-caused failures carry the full set of faults observed in
/// the round, ordered by party index, so the supervisor can act against every
/// misbehaving party in one step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CeremonyError {
    /// The round failed on a local precondition or internal invariant
    #[error("round {round} failed: {cause}")]
    Local { round: u16, cause: Error },

    /// The round failed because of one or more misbehaving peers
    #[error("round {round} failed with {} peer fault(s)", .faults.len())]
    Faults { round: u16, faults: Vec<Fault> },
}

impl CeremonyError {
    pub(crate) fn local(round: u16, cause: Error) -> Self {
        CeremonyError::Local { round, cause }
    }

    pub(crate) fn faults(round: u16, faults: Vec<Fault>) -> Self {
        debug_assert!(!faults.is_empty());
        CeremonyError::Faults { round, faults }
    }

    /// The round in which the ceremony failed
    pub fn round(&self) -> u16 {
        match self {
            CeremonyError::Local { round, .. } => *round,
            CeremonyError::Faults { round, .. } => *round,
        }
    }

    /// Indices of the parties that caused the failure, ordered and deduplicated.
    ///
    /// Empty for local failures.
    pub fn culprits(&self) -> Vec<PartyIndex> {
        match self {
            CeremonyError::Local { .. } => Vec::new(),
            CeremonyError::Faults { faults, .. } => {
                let mut culprits: Vec<PartyIndex> =
                    faults.iter().map(|fault| fault.party).collect();
                culprits.sort_unstable();
                culprits.dedup();
                culprits
            }
        }
    }

    /// The underlying causes, one per fault (or the single local cause)
    pub fn causes(&self) -> Vec<&Error> {
        match self {
            CeremonyError::Local { cause, .. } => vec![cause],
            CeremonyError::Faults { faults, .. } => {
                faults.iter().map(|fault| &fault.cause).collect()
            }
        }
    }
}
