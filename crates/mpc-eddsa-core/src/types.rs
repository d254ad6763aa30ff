//! Core types for ceremony participants and message routing
//!
//! A ceremony is run by a fixed, ordered committee. Each member is addressed
//! by a dense index and carries a distinct nonzero key scalar which doubles
//! as its secret-sharing evaluation point.

use crate::error::{Error, Result};
use curve25519_dalek::scalar::Scalar;
use std::collections::HashSet;

/// Index of a party within its committee (dense, `0..n`)
pub type PartyIndex = usize;

/// A committee member: its index and its key scalar.
///
/// The key scalar is the point at which sharing polynomials are evaluated for
/// this party; it must be nonzero (evaluation at zero would reveal secrets)
/// and unique within the committee.
#[derive(Debug, Clone)]
pub struct Party {
    pub index: PartyIndex,
    pub key: Scalar,
}

/// An ordered committee of ceremony participants
#[derive(Debug, Clone)]
pub struct Committee {
    parties: Vec<Party>,
}

impl Committee {
    /// Build a committee from the ordered list of key scalars.
    ///
    /// Party indices are assigned from list positions. Rejects empty lists,
    /// zero keys, and duplicate keys.
    pub fn new(keys: Vec<Scalar>) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::InvalidCommittee("committee is empty".into()));
        }
        let mut seen = HashSet::with_capacity(keys.len());
        for (index, key) in keys.iter().enumerate() {
            if key == &Scalar::ZERO {
                return Err(Error::InvalidCommittee(format!(
                    "party {index} has a zero key scalar"
                )));
            }
            if !seen.insert(key.to_bytes()) {
                return Err(Error::InvalidCommittee(format!(
                    "party {index} repeats an earlier key scalar"
                )));
            }
        }
        let parties = keys
            .into_iter()
            .enumerate()
            .map(|(index, key)| Party { index, key })
            .collect();
        Ok(Self { parties })
    }

    /// Number of committee members
    pub fn len(&self) -> usize {
        self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }

    /// Member by index
    pub fn party(&self, index: PartyIndex) -> Option<&Party> {
        self.parties.get(index)
    }

    /// Whether `index` addresses a member
    pub fn contains(&self, index: PartyIndex) -> bool {
        index < self.parties.len()
    }

    /// The ordered key scalars of all members
    pub fn keys(&self) -> Vec<Scalar> {
        self.parties.iter().map(|party| party.key).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Party> {
        self.parties.iter()
    }
}

/// Configuration of one party's view of a keygen ceremony
#[derive(Debug, Clone)]
pub struct Parameters {
    committee: Committee,
    party_index: PartyIndex,
    threshold: usize,
}

impl Parameters {
    /// Validate and build ceremony parameters.
    ///
    /// `threshold` is t in a t+1-of-n sharing; the committee must be large
    /// enough to make the sharing reconstructible.
    pub fn new(committee: Committee, party_index: PartyIndex, threshold: usize) -> Result<Self> {
        if !committee.contains(party_index) {
            return Err(Error::InvalidCommittee(format!(
                "local index {party_index} is outside the committee of {}",
                committee.len()
            )));
        }
        if threshold + 1 > committee.len() {
            return Err(Error::InsufficientKeys {
                required: threshold + 1,
                available: committee.len(),
            });
        }
        Ok(Self { committee, party_index, threshold })
    }

    pub fn committee(&self) -> &Committee {
        &self.committee
    }

    pub fn party_count(&self) -> usize {
        self.committee.len()
    }

    pub fn party_index(&self) -> PartyIndex {
        self.party_index
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// The local party's key scalar
    pub fn local_key(&self) -> Scalar {
        self.committee.parties[self.party_index].key
    }
}

/// Routing target of an outbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Deliver to every other ceremony participant
    Broadcast,
    /// Deliver to a single party
    Party(PartyIndex),
}

/// An outbound message together with its routing
#[derive(Debug, Clone)]
pub struct Outgoing<M> {
    pub to: Recipient,
    pub message: M,
}
