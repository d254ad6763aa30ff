//! Resharing protocol messages

use crate::commitments::Commitment;
use crate::types::PartyIndex;
use serde::{Deserialize, Serialize};

/// Round 1 broadcast from an old-committee member to the new committee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReshareRound1Message {
    /// Sender's index in the old committee
    pub from: PartyIndex,
    /// The group public key, compressed
    pub public_key: [u8; 32],
    /// Commitment to the sender's fresh sharing polynomial
    pub commitment: Commitment,
}

/// Any resharing protocol message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReshareMessage {
    Round1(ReshareRound1Message),
}

impl ReshareMessage {
    /// The sender of this message, indexed in the old committee
    pub fn sender(&self) -> PartyIndex {
        match self {
            ReshareMessage::Round1(msg) => msg.from,
        }
    }

    /// Whether this message type travels as a broadcast
    pub fn is_broadcast(&self) -> bool {
        true
    }

    /// The round this message belongs to
    pub fn round(&self) -> u16 {
        1
    }
}
