//! # Round State
//!
//! ```text
//! Announcement → Commitment → Challenge → Response → Broadcast → Complete
//!        └────────────┴────────────┴───────────┴──────────┴──→ Failed
//! ```

use std::fmt;

use cs_02_merkle_batching::{LocalBatch, MerkleProof, RootCombination};
use cs_03_signature_aggregation::{Challenge, Commitment, NonceSecret};
use shared_types::{Hash, RoundNumber, Timestamp, ViewNumber};

use super::errors::RoundError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundPhase {
    Announcement,
    Commitment,
    Challenge,
    Response,
    Broadcast,
    Complete,
    Failed,
}

impl RoundPhase {
    fn next(self) -> Option<Self> {
        match self {
            Self::Announcement => Some(Self::Commitment),
            Self::Commitment => Some(Self::Challenge),
            Self::Challenge => Some(Self::Response),
            Self::Response => Some(Self::Broadcast),
            Self::Broadcast => Some(Self::Complete),
            Self::Complete | Self::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Announcement => "announcement",
            Self::Commitment => "commitment",
            Self::Challenge => "challenge",
            Self::Response => "response",
            Self::Broadcast => "broadcast",
            Self::Complete => "complete",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// State of one round on one node. Dropped when the round ends.
#[derive(Debug)]
pub struct Round {
    pub number: RoundNumber,
    pub view: ViewNumber,
    pub timestamp: Timestamp,
    phase: RoundPhase,
    /// Own leaves, local root and leaf proofs.
    pub local: Option<LocalBatch>,
    /// Own root combined with the children's subtree roots.
    pub combination: Option<RootCombination>,
    /// Subtree aggregate commitment (global aggregate at the root).
    pub commitment: Option<Commitment>,
    secret: Option<NonceSecret>,
    pub challenge: Option<Challenge>,
    /// Path from this node's subtree root to the global root. Empty at the root.
    pub inherited: MerkleProof,
    pub global_root: Option<Hash>,
}

impl Round {
    pub fn new(number: RoundNumber, view: ViewNumber, timestamp: Timestamp) -> Self {
        Self {
            number,
            view,
            timestamp,
            phase: RoundPhase::Announcement,
            local: None,
            combination: None,
            commitment: None,
            secret: None,
            challenge: None,
            inherited: MerkleProof::empty(),
            global_root: None,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Move to `to`, which must be the phase directly after the current one.
    pub fn advance(&mut self, to: RoundPhase) -> Result<(), RoundError> {
        if self.phase.next() != Some(to) {
            return Err(RoundError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        self.phase = to;
        Ok(())
    }

    /// Mark the round failed. Drops the nonce secret.
    pub fn fail(&mut self) {
        self.phase = RoundPhase::Failed;
        self.secret = None;
    }

    pub fn store_secret(&mut self, secret: NonceSecret) {
        self.secret = Some(secret);
    }

    pub fn take_secret(&mut self) -> Result<NonceSecret, RoundError> {
        self.secret.take().ok_or(RoundError::MissingState("nonce secret"))
    }

    pub fn local(&self) -> Result<&LocalBatch, RoundError> {
        self.local.as_ref().ok_or(RoundError::MissingState("local batch"))
    }

    pub fn combination(&self) -> Result<&RootCombination, RoundError> {
        self.combination
            .as_ref()
            .ok_or(RoundError::MissingState("root combination"))
    }

    pub fn commitment(&self) -> Result<&Commitment, RoundError> {
        self.commitment
            .as_ref()
            .ok_or(RoundError::MissingState("aggregate commitment"))
    }

    pub fn challenge(&self) -> Result<&Challenge, RoundError> {
        self.challenge.as_ref().ok_or(RoundError::MissingState("challenge"))
    }
}
