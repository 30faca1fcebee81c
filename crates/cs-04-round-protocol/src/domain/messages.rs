//! # Wire Messages
//!
//! | Message | Direction | Phase |
//! |---------|-----------|-------|
//! | `Announcement` | down | 1 |
//! | `Commitment` | up | 2 |
//! | `Challenge` | down | 3 |
//! | `Response` | up | 4 |
//! | `SignatureBroadcast` | down | 5 |
//! | `Abort` | up and down | any |
//!
//! Frames are `bincode` encodings of [`ProtocolMessage`].

use cs_02_merkle_batching::MerkleProof;
use cs_03_signature_aggregation::{Challenge, CollectiveSignature, Commitment, Response};
use serde::{Deserialize, Serialize};
use shared_types::{DecodeError, Hash, NodeId, RoundNumber, Timestamp, ViewNumber};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolMessage {
    Announcement {
        round: RoundNumber,
        view: ViewNumber,
        /// 8-byte little-endian Unix seconds.
        timestamp: Vec<u8>,
    },
    Commitment {
        round: RoundNumber,
        subtree_root: Hash,
        commitment: Commitment,
    },
    Challenge {
        round: RoundNumber,
        challenge: Challenge,
        /// Path from the receiver's subtree root to the global root.
        inherited_path: MerkleProof,
    },
    Response {
        round: RoundNumber,
        response: Response,
    },
    SignatureBroadcast {
        round: RoundNumber,
        global_root: Hash,
        timestamp: Timestamp,
        signature: CollectiveSignature,
    },
    Abort {
        round: RoundNumber,
        origin: NodeId,
        reason: String,
    },
}

impl ProtocolMessage {
    pub fn round(&self) -> RoundNumber {
        match self {
            Self::Announcement { round, .. }
            | Self::Commitment { round, .. }
            | Self::Challenge { round, .. }
            | Self::Response { round, .. }
            | Self::SignatureBroadcast { round, .. }
            | Self::Abort { round, .. } => *round,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Announcement { .. } => "announcement",
            Self::Commitment { .. } => "commitment",
            Self::Challenge { .. } => "challenge",
            Self::Response { .. } => "response",
            Self::SignatureBroadcast { .. } => "signature broadcast",
            Self::Abort { .. } => "abort",
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        bincode::deserialize(bytes).map_err(|e| DecodeError::Frame(e.to_string()))
    }
}
