//! # In-Memory Network
//!
//! Routes byte frames between registered nodes over unbounded tokio channels.
//! A round sends a bounded number of frames per tree edge, so mailboxes are
//! left unbounded and a slow receiver can never stall a fan-out.

use parking_lot::RwLock;
use shared_types::NodeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// One serialised protocol message in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Sending node (set by the network, not by the payload).
    pub from: NodeId,
    /// Encoded message.
    pub bytes: Vec<u8>,
}

/// Routing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// No mailbox registered for the destination.
    #[error("Unknown destination: {0}")]
    UnknownDestination(NodeId),

    /// The destination dropped its mailbox.
    #[error("Destination disconnected: {0}")]
    Disconnected(NodeId),
}

/// Frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkStats {
    pub frames_sent: u64,
    pub frames_dropped: u64,
    pub registered_nodes: usize,
}

/// Receiving end owned by one node.
pub struct Mailbox {
    node: NodeId,
    receiver: mpsc::UnboundedReceiver<Frame>,
}

impl Mailbox {
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Wait for the next frame. `None` once the network is gone.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.receiver.recv().await
    }

    /// Non-blocking poll, used to drain leftovers between rounds.
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.receiver.try_recv().ok()
    }
}

/// In-process implementation of the node network.
///
/// Suitable for simulations and tests; a deployment would put a socket
/// transport behind the same `send`/`Mailbox` shape.
pub struct InMemoryNetwork {
    mailboxes: RwLock<HashMap<NodeId, mpsc::UnboundedSender<Frame>>>,
    frames_sent: AtomicU64,
    frames_dropped: AtomicU64,
}

impl InMemoryNetwork {
    #[must_use]
    pub fn new() -> Self {
        Self {
            mailboxes: RwLock::new(HashMap::new()),
            frames_sent: AtomicU64::new(0),
            frames_dropped: AtomicU64::new(0),
        }
    }

    /// Register `node` and return its mailbox. Re-registering replaces the
    /// previous mailbox.
    pub fn register(&self, node: NodeId) -> Mailbox {
        let (sender, receiver) = mpsc::unbounded_channel();
        if self.mailboxes.write().insert(node, sender).is_some() {
            debug!(node = %node, "Mailbox replaced");
        }
        Mailbox { node, receiver }
    }

    /// Route `bytes` from `from` to `to`.
    pub fn send(&self, from: NodeId, to: NodeId, bytes: Vec<u8>) -> Result<(), NetworkError> {
        let sender = self
            .mailboxes
            .read()
            .get(&to)
            .cloned()
            .ok_or(NetworkError::UnknownDestination(to))?;

        let len = bytes.len();
        match sender.send(Frame { from, bytes }) {
            Ok(()) => {
                self.frames_sent.fetch_add(1, Ordering::Relaxed);
                debug!(from = %from, to = %to, len, "Frame sent");
                Ok(())
            }
            Err(_) => {
                self.frames_dropped.fetch_add(1, Ordering::Relaxed);
                warn!(from = %from, to = %to, "Frame dropped (mailbox closed)");
                Err(NetworkError::Disconnected(to))
            }
        }
    }

    pub fn stats(&self) -> NetworkStats {
        NetworkStats {
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            registered_nodes: self.mailboxes.read().len(),
        }
    }
}

impl Default for InMemoryNetwork {
    fn default() -> Self {
        Self::new()
    }
}
