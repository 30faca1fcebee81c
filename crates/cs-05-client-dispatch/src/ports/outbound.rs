//! # Outbound Ports

use cs_04_round_protocol::StampResponse;
use shared_types::ClientId;

use crate::domain::TransportError;

/// Connection layer between a node and its clients.
pub trait ClientTransport: Send + Sync {
    fn send(&self, client: &ClientId, response: &StampResponse) -> Result<(), TransportError>;

    /// Release whatever the transport holds for `client`.
    fn close(&self, client: &ClientId);
}
