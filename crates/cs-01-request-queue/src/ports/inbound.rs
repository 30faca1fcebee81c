//! # Inbound Ports (Driving Ports)
//!
//! The API client-facing acceptors use to hand requests to a node.

use shared_types::Request;

use crate::domain::RequestQueue;

/// Accepts client requests for the next round.
pub trait RequestIntake: Send + Sync {
    /// Queue a request. Never blocks on round activity.
    fn submit(&self, request: Request);

    /// Requests waiting for the next swap.
    fn pending(&self) -> usize;
}

impl RequestIntake for RequestQueue {
    fn submit(&self, request: Request) {
        self.enqueue(request);
    }

    fn pending(&self) -> usize {
        RequestQueue::pending(self)
    }
}
