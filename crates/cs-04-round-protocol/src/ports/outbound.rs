//! # Outbound Ports (Driven)
//!
//! | Port | Collaborator |
//! |------|--------------|
//! | `PeerTransport` / `PeerInbox` | node-to-node frame delivery |
//! | `TopologyProvider` | aggregation tree shape |
//! | `ResponseDispatch` | client delivery (cs-05) |
//! | `RoundLedger` | anchoring of signed roots and proofs |
//! | `TimeSource` | root wall clock |

use async_trait::async_trait;
use cs_02_merkle_batching::MerkleProof;
use cs_03_signature_aggregation::CollectiveSignature;
use serde::{Deserialize, Serialize};
use shared_types::{DecodeError, Hash, NodeId, Request, RoundNumber, Timestamp, ViewNumber};
use thiserror::Error;

use crate::domain::{ProtocolMessage, StampResponse};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeerSendError {
    #[error("peer {0} unreachable")]
    Unreachable(NodeId),

    #[error("failed to encode {kind}: {reason}")]
    Encode { kind: &'static str, reason: String },
}

/// Sending half of the node network.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn send(&self, to: NodeId, message: &ProtocolMessage) -> Result<(), PeerSendError>;
}

/// One frame as seen by the receiving node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub from: NodeId,
    pub message: Result<ProtocolMessage, DecodeError>,
}

/// Receiving half of the node network.
///
/// `Sync` so that a node can be borrowed across an `.await` inside a spawned
/// round driver.
#[async_trait]
pub trait PeerInbox: Send + Sync {
    /// `None` once the network is gone.
    async fn recv(&mut self) -> Option<InboundMessage>;
}

/// Read-only view of the aggregation tree.
pub trait TopologyProvider: Send + Sync {
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children in topology order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn is_root(&self, node: NodeId) -> bool {
        self.parent(node).is_none()
    }
}

/// Outcome of delivering one response to its client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    Delivered,
    /// Connection gone; the client's channel is cleaned up.
    ClientClosed,
    /// Connection not ready yet.
    ClientNotEstablished,
    /// Any other transport failure, logged.
    OtherTransportError(String),
}

impl DeliveryResult {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Hands responses to clients. Never fails the round.
pub trait ResponseDispatch: Send + Sync {
    fn dispatch(&self, request: &Request, response: &StampResponse) -> DeliveryResult;
}

/// Signed output of one completed round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: RoundNumber,
    pub view: ViewNumber,
    pub global_root: Hash,
    pub timestamp: Timestamp,
    pub signature: CollectiveSignature,
}

/// Anchoring collaborator fed after every completed round.
pub trait RoundLedger: Send + Sync {
    fn record_round(&self, record: RoundRecord);

    /// Composed proofs (leaf digest → global root) batched by one node.
    fn record_proofs(&self, round: RoundNumber, proofs: Vec<(Hash, MerkleProof)>);
}

/// Root clock.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock.
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
