//! # Client Dispatcher
//!
//! Classifies every delivery attempt. No outcome is fatal: the round keeps
//! dispatching the remaining responses whatever happens to one client.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use cs_04_round_protocol::{DeliveryResult, ResponseDispatch, StampResponse};
use shared_types::Request;
use tracing::{debug, warn};

use crate::domain::{DispatchCounts, DispatchStats, TransportError};
use crate::ports::ClientTransport;

pub struct ClientDispatcher<T: ClientTransport> {
    transport: Arc<T>,
    stats: DispatchStats,
}

impl<T: ClientTransport> ClientDispatcher<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            stats: DispatchStats::default(),
        }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Deliver `response` to the client that sent `request`.
    pub fn dispatch(&self, request: &Request, response: &StampResponse) -> DeliveryResult {
        let client = &request.client_id;
        match self.transport.send(client, response) {
            Ok(()) => {
                self.stats.delivered.fetch_add(1, Ordering::Relaxed);
                debug!(client = %client, seq = request.seq_no, "Response delivered");
                DeliveryResult::Delivered
            }
            Err(TransportError::Closed) => {
                self.stats.closed.fetch_add(1, Ordering::Relaxed);
                warn!(client = %client, seq = request.seq_no, "Client closed, dropping its channel");
                self.transport.close(client);
                DeliveryResult::ClientClosed
            }
            Err(TransportError::NotEstablished) => {
                self.stats.not_established.fetch_add(1, Ordering::Relaxed);
                warn!(client = %client, seq = request.seq_no, "Client connection not established");
                DeliveryResult::ClientNotEstablished
            }
            Err(TransportError::Other(reason)) => {
                self.stats.other_errors.fetch_add(1, Ordering::Relaxed);
                warn!(client = %client, seq = request.seq_no, %reason, "Failed to deliver response");
                DeliveryResult::OtherTransportError(reason)
            }
        }
    }

    pub fn stats(&self) -> DispatchCounts {
        self.stats.snapshot()
    }
}

impl<T: ClientTransport> ResponseDispatch for ClientDispatcher<T> {
    fn dispatch(&self, request: &Request, response: &StampResponse) -> DeliveryResult {
        ClientDispatcher::dispatch(self, request, response)
    }
}
