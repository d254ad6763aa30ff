//! # MPC EdDSA Core
//!
//! Core library for threshold Ed25519 key ceremonies: n parties jointly
//! generate a signing key such that any t+1 of them can later sign while no
//! coalition of t or fewer learns anything about the key.
//!
//! ## Architecture
//!
//! This crate provides:
//! - **Distributed Key Generation**: a three-round ceremony producing, per
//!   party, a secret share, the public share points of every party, and the
//!   group public key
//! - **Resharing**: the first round of the hand-off ceremony in which an old
//!   committee re-shares the group key toward a new committee
//! - **Ceremony engine**: per-party round state machines with out-of-order
//!   message buffering and per-peer fault attribution
//! - **Crypto building blocks**: Feldman VSS, salted hash commitments, and
//!   Schnorr proofs of knowledge over the Ed25519 group
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mpc_eddsa_core::{Committee, KeygenParty, Parameters};
//! use tokio::sync::mpsc;
//!
//! let committee = Committee::new(keys)?;
//! let params = Parameters::new(committee, my_index, threshold)?;
//!
//! let (out_tx, mut out_rx) = mpsc::unbounded_channel();
//! let (end_tx, mut end_rx) = mpsc::unbounded_channel();
//! let mut party = KeygenParty::new(params, out_tx, end_tx);
//!
//! party.start()?;
//! // transport loop: drain out_rx, deliver peers' messages, re-poll
//! party.store_message(inbound)?;
//! party.update().await?;
//! // on completion the save record arrives on end_rx
//! ```
//!
//! ## Security Model
//!
//! - A party's secret share never leaves the ceremony state; only its public
//!   point is part of the save record
//! - Every point received from a peer is decoded from canonical compressed
//!   bytes and cofactor-cleared before any arithmetic
//! - Cryptographic failures identify the misbehaving peers; simultaneous
//!   failures in a round are reported together so operators can act on the
//!   full culprit set at once
//! - Secret material (polynomial coefficients, dealt shares, the local
//!   secret scalar) is zeroized when the ceremony state is dropped
//!
//! Transport, peer authentication, and persistence of the save record are the
//! responsibility of the embedding application.

pub mod commitments;
pub mod curve;
pub mod error;
pub mod keygen;
pub mod resharing;
pub mod schnorr;
pub mod signing;
pub mod types;
pub mod vss;

pub use error::{CeremonyError, Error, Fault, Result};
pub use types::{Committee, Outgoing, Parameters, Party, PartyIndex, Recipient};

pub use curve::CurvePoint;
pub use keygen::{KeygenMessage, KeygenParty, KeygenSave};
pub use resharing::{
    ReshareMessage, ReshareParameters, ReshareParty, ReshareRound1Outcome,
};

/// Protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
