//! # Channel Client Transport
//!
//! In-process clients, one unbounded channel each. A client is either
//! reserved (known but not yet connected), connected, or broken.

use cs_04_round_protocol::StampResponse;
use dashmap::DashMap;
use shared_types::ClientId;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::TransportError;
use crate::ports::ClientTransport;

enum ClientSlot {
    Reserved,
    Connected(mpsc::UnboundedSender<StampResponse>),
    Broken(String),
}

#[derive(Default)]
pub struct ChannelClientTransport {
    clients: DashMap<ClientId, ClientSlot>,
}

impl ChannelClientTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Announce a client whose connection is still being set up.
    pub fn reserve(&self, client: ClientId) {
        self.clients.insert(client, ClientSlot::Reserved);
    }

    /// Open (or reopen) a client's channel.
    pub fn connect(&self, client: ClientId) -> mpsc::UnboundedReceiver<StampResponse> {
        let (sender, receiver) = mpsc::unbounded_channel();
        debug!(client = %client, "Client connected");
        self.clients.insert(client, ClientSlot::Connected(sender));
        receiver
    }

    /// Make every further send to `client` fail with `reason`.
    pub fn break_client(&self, client: ClientId, reason: impl Into<String>) {
        self.clients.insert(client, ClientSlot::Broken(reason.into()));
    }

    pub fn is_registered(&self, client: &ClientId) -> bool {
        self.clients.contains_key(client)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl ClientTransport for ChannelClientTransport {
    fn send(&self, client: &ClientId, response: &StampResponse) -> Result<(), TransportError> {
        let slot = self
            .clients
            .get(client)
            .ok_or(TransportError::NotEstablished)?;
        match &*slot {
            ClientSlot::Reserved => Err(TransportError::NotEstablished),
            ClientSlot::Connected(sender) => sender
                .send(response.clone())
                .map_err(|_| TransportError::Closed),
            ClientSlot::Broken(reason) => Err(TransportError::Other(reason.clone())),
        }
    }

    fn close(&self, client: &ClientId) {
        if self.clients.remove(client).is_some() {
            debug!(client = %client, "Client channel removed");
        }
    }
}
