//! Resharing: handing the group key from an old committee to a new one
//!
//! Members of the old committee project their keygen share into additive form
//! over the active old key set, re-deal it with Feldman VSS at the new
//! committee's threshold, and broadcast the group public key together with a
//! hash commitment to the fresh commitment polynomial. New-committee members
//! collect one broadcast per old member and require every sender to report
//! the same group public key.
//!
//! This module covers the first round of the hand-off. Its outcome carries
//! exactly what the subsequent delivery rounds consume: the group public key
//! and, for dealers, the decommitment plus the per-recipient shares.

mod messages;
mod party;
mod rounds;

pub use messages::{ReshareMessage, ReshareRound1Message};
pub use party::ReshareParty;

use crate::commitments::Decommitment;
use crate::curve::CurvePoint;
use crate::error::{Error, Result};
use crate::types::{Committee, PartyIndex};
use crate::vss;

/// Configuration of one party's view of a resharing ceremony.
///
/// A party may sit in the old committee, the new committee, or both.
#[derive(Debug, Clone)]
pub struct ReshareParameters {
    old_committee: Committee,
    new_committee: Committee,
    old_threshold: usize,
    new_threshold: usize,
    old_index: Option<PartyIndex>,
    new_index: Option<PartyIndex>,
}

impl ReshareParameters {
    pub fn new(
        old_committee: Committee,
        old_threshold: usize,
        new_committee: Committee,
        new_threshold: usize,
        old_index: Option<PartyIndex>,
        new_index: Option<PartyIndex>,
    ) -> Result<Self> {
        if old_index.is_none() && new_index.is_none() {
            return Err(Error::InvalidCommittee(
                "party is a member of neither committee".into(),
            ));
        }
        if let Some(index) = old_index {
            if !old_committee.contains(index) {
                return Err(Error::InvalidCommittee(format!(
                    "old index {index} is outside the old committee of {}",
                    old_committee.len()
                )));
            }
        }
        if let Some(index) = new_index {
            if !new_committee.contains(index) {
                return Err(Error::InvalidCommittee(format!(
                    "new index {index} is outside the new committee of {}",
                    new_committee.len()
                )));
            }
        }
        if old_threshold + 1 > old_committee.len() {
            return Err(Error::InsufficientKeys {
                required: old_threshold + 1,
                available: old_committee.len(),
            });
        }
        if new_threshold + 1 > new_committee.len() {
            return Err(Error::InsufficientKeys {
                required: new_threshold + 1,
                available: new_committee.len(),
            });
        }
        Ok(Self {
            old_committee,
            new_committee,
            old_threshold,
            new_threshold,
            old_index,
            new_index,
        })
    }

    pub fn old_committee(&self) -> &Committee {
        &self.old_committee
    }

    pub fn new_committee(&self) -> &Committee {
        &self.new_committee
    }

    pub fn old_threshold(&self) -> usize {
        self.old_threshold
    }

    pub fn new_threshold(&self) -> usize {
        self.new_threshold
    }

    pub fn old_index(&self) -> Option<PartyIndex> {
        self.old_index
    }

    pub fn new_index(&self) -> Option<PartyIndex> {
        self.new_index
    }
}

/// What a dealer carries into the delivery rounds: the opening of its
/// commitment and the fresh share of every new-committee member
pub struct DealtShares {
    pub decommitment: Decommitment,
    pub shares: Vec<vss::Share>,
}

/// Result of resharing round 1.
///
/// `public_key` is the group key every sender agreed on; `dealt` is present
/// for old-committee members only.
pub struct ReshareRound1Outcome {
    pub public_key: CurvePoint,
    pub dealt: Option<DealtShares>,
}

impl std::fmt::Debug for ReshareRound1Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReshareRound1Outcome")
            .field("public_key", &hex::encode(self.public_key.to_bytes()))
            .field("dealt", &self.dealt.is_some())
            .finish()
    }
}
