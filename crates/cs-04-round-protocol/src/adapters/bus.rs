//! # Bus Adapter
//!
//! Carries [`ProtocolMessage`] frames over `shared-bus`.

use std::sync::Arc;

use async_trait::async_trait;
use shared_bus::{InMemoryNetwork, Mailbox, NetworkError};
use shared_types::NodeId;
use tracing::trace;

use crate::domain::ProtocolMessage;
use crate::ports::{InboundMessage, PeerInbox, PeerSendError, PeerTransport};

/// Sending half bound to one node identity.
#[derive(Clone)]
pub struct BusTransport {
    node: NodeId,
    network: Arc<InMemoryNetwork>,
}

impl BusTransport {
    pub fn new(node: NodeId, network: Arc<InMemoryNetwork>) -> Self {
        Self { node, network }
    }
}

#[async_trait]
impl PeerTransport for BusTransport {
    async fn send(&self, to: NodeId, message: &ProtocolMessage) -> Result<(), PeerSendError> {
        let bytes = message.encode().map_err(|e| PeerSendError::Encode {
            kind: message.kind(),
            reason: e.to_string(),
        })?;
        trace!(from = %self.node, to = %to, kind = message.kind(), round = message.round(), "Sending");
        self.network.send(self.node, to, bytes).map_err(|e| match e {
            NetworkError::UnknownDestination(n) | NetworkError::Disconnected(n) => {
                PeerSendError::Unreachable(n)
            }
        })
    }
}

/// Receiving half; decodes frames as they arrive.
pub struct BusInbox {
    mailbox: Mailbox,
}

impl BusInbox {
    pub fn new(mailbox: Mailbox) -> Self {
        Self { mailbox }
    }
}

#[async_trait]
impl PeerInbox for BusInbox {
    async fn recv(&mut self) -> Option<InboundMessage> {
        let frame = self.mailbox.recv().await?;
        Some(InboundMessage {
            from: frame.from,
            message: ProtocolMessage::decode(&frame.bytes),
        })
    }
}
