//! # Round Errors

use cs_02_merkle_batching::MerkleError;
use cs_03_signature_aggregation::AggregationError;
use shared_types::{ClientId, DecodeError, NodeId, RoundNumber, SequenceNumber};
use thiserror::Error;

use super::round::RoundPhase;

/// Reasons a round ends without dispatching responses.
#[derive(Debug, Error)]
pub enum RoundError {
    /// Malformed timestamp or frame from a tree neighbour.
    #[error("round {round}: decode error: {source}")]
    Decode {
        round: RoundNumber,
        #[source]
        source: DecodeError,
    },

    /// A composed proof does not reach the broadcast global root.
    #[error("round {round}: composed proof for {client}#{seq_no} does not reach global root {root}")]
    IntegrityMismatch {
        round: RoundNumber,
        client: ClientId,
        seq_no: SequenceNumber,
        root: String,
    },

    /// A local leaf proof failed the pre-signing check.
    #[error("local proof check failed: {0}")]
    LocalProofMismatch(#[from] MerkleError),

    #[error("round {round}: timed out in {phase} phase")]
    PhaseTimeout { round: RoundNumber, phase: RoundPhase },

    /// A neighbour gave up on the round.
    #[error("round {round} aborted by {origin}: {reason}")]
    Aborted {
        round: RoundNumber,
        origin: NodeId,
        reason: String,
    },

    #[error("round {round}: unexpected {kind} from {from} during {phase}")]
    UnexpectedMessage {
        round: RoundNumber,
        from: NodeId,
        kind: &'static str,
        phase: RoundPhase,
    },

    #[error("signature aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid phase transition {from} -> {to}")]
    InvalidTransition { from: RoundPhase, to: RoundPhase },

    #[error("missing round state: {0}")]
    MissingState(&'static str),

    /// Only the tree root originates rounds.
    #[error("{0} is not the tree root")]
    NotRoot(NodeId),

    /// The tree root has no parent to follow.
    #[error("{0} is the tree root")]
    IsRoot(NodeId),

    /// The node's inbox is gone; no further rounds are possible.
    #[error("inbox closed")]
    InboxClosed,
}

impl RoundError {
    /// Whether this node should tell its neighbours to give up.
    pub fn should_propagate(&self) -> bool {
        !matches!(
            self,
            Self::Aborted { .. } | Self::NotRoot(_) | Self::IsRoot(_) | Self::InboxClosed
        )
    }
}

/// Result alias for round operations.
pub type RoundResult<T> = Result<T, RoundError>;
