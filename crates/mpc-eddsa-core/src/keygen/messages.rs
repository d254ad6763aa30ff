//! Keygen protocol messages

use crate::commitments::{Commitment, Decommitment};
use crate::schnorr::SchnorrProof;
use crate::types::PartyIndex;
use serde::{Deserialize, Serialize};

/// Round 1 broadcast: hash commitment to the sender's commitment polynomial
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitMessage {
    /// Sender's party index
    pub from: PartyIndex,
    /// Commitment to the compressed points of the sender's VSS polynomial
    pub commitment: Commitment,
}

/// Round 2 point-to-point message: the recipient's secret share
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareMessage {
    /// Sender's party index
    pub from: PartyIndex,
    /// Recipient's party index
    pub to: PartyIndex,
    /// Share scalar, canonical 32-byte encoding
    pub share: [u8; 32],
}

/// Round 2 broadcast: decommitment plus proof of secret knowledge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecommitMessage {
    /// Sender's party index
    pub from: PartyIndex,
    /// Opening of the sender's round-1 commitment
    pub decommitment: Decommitment,
    /// Proof of knowledge of the secret behind the constant-term point
    pub proof: SchnorrProof,
}

/// Any keygen protocol message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum KeygenMessage {
    Commit(CommitMessage),
    Share(ShareMessage),
    Decommit(DecommitMessage),
}

impl KeygenMessage {
    /// The sender of this message
    pub fn sender(&self) -> PartyIndex {
        match self {
            KeygenMessage::Commit(msg) => msg.from,
            KeygenMessage::Share(msg) => msg.from,
            KeygenMessage::Decommit(msg) => msg.from,
        }
    }

    /// Whether this message type travels as a broadcast
    pub fn is_broadcast(&self) -> bool {
        !matches!(self, KeygenMessage::Share(_))
    }

    /// The round this message belongs to
    pub fn round(&self) -> u16 {
        match self {
            KeygenMessage::Commit(_) => 1,
            KeygenMessage::Share(_) | KeygenMessage::Decommit(_) => 2,
        }
    }
}
