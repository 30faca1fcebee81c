//! # Simulated Clients
//!
//! Each client is attached to one node. Per round it enqueues a burst of
//! random payloads, then waits for a stamp per payload and checks it:
//!
//! 1. the composed proof takes the payload's leaf to the signed root
//! 2. the signature was made by the whole tree (aggregate key matches)
//! 3. the collective signature over `root || timestamp` verifies
//!
//! Requests that get no answer before the deadline are counted and
//! forgotten; the next burst starts regardless.

use std::collections::HashMap;
use std::ops::AddAssign;
use std::sync::Arc;
use std::time::Duration;

use cs_01_request_queue::RequestIntake;
use cs_04_round_protocol::StampResponse;
use cs_telemetry::log_client_event;
use rand::RngCore;
use shared_crypto::PointBytes;
use shared_types::{ClientId, NodeId, Request, SequenceNumber};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::debug;

use crate::container::{NodeConfig, NodeHandle};

/// What one client (or a sum of clients) saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientReport {
    pub submitted: u64,
    pub verified: u64,
    pub rejected: u64,
    /// Submitted but not answered before the deadline or shutdown.
    pub unanswered: u64,
}

impl AddAssign for ClientReport {
    fn add_assign(&mut self, other: Self) {
        self.submitted += other.submitted;
        self.verified += other.verified;
        self.rejected += other.rejected;
        self.unanswered += other.unanswered;
    }
}

pub struct SimulatedClient {
    id: ClientId,
    node: NodeId,
    intake: Arc<dyn RequestIntake>,
    responses: mpsc::UnboundedReceiver<StampResponse>,
    tree_key: PointBytes,
    burst: usize,
    payload_len: usize,
    wait: Duration,
    next_seq: SequenceNumber,
    outstanding: HashMap<SequenceNumber, Vec<u8>>,
    report: ClientReport,
}

impl SimulatedClient {
    /// Connect client `index` to the node behind `handle`.
    pub fn connect(index: usize, handle: &NodeHandle, tree_key: PointBytes, config: &NodeConfig) -> Self {
        let id = ClientId::new(format!("{}/client-{index}", handle.id));
        let responses = handle.transport().connect(id.clone());
        // A burst waits for the next round to start and then for every phase.
        let wait = config.round.round_interval + config.round.phase_timeout * 5;

        Self {
            id,
            node: handle.id,
            intake: handle.queue.clone(),
            responses,
            tree_key,
            burst: config.requests_per_client,
            payload_len: config.payload_len,
            wait,
            next_seq: 0,
            outstanding: HashMap::new(),
            report: ClientReport::default(),
        }
    }

    pub fn id(&self) -> &ClientId {
        &self.id
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    pub fn report(&self) -> ClientReport {
        self.report
    }

    /// Enqueue one burst of random payloads at the node.
    pub fn submit_burst(&mut self) {
        let mut rng = rand::thread_rng();
        for _ in 0..self.burst {
            let mut payload = vec![0u8; self.payload_len];
            rng.fill_bytes(&mut payload);

            let seq_no = self.next_seq;
            self.next_seq += 1;
            self.outstanding.insert(seq_no, payload.clone());
            self.intake.submit(Request::new(self.id.clone(), seq_no, payload));
            self.report.submitted += 1;
        }
        debug!(client = %self.id, node = %self.node, burst = self.burst, "Submitted burst");
    }

    /// Check one response against the payload it answers.
    pub fn accept(&mut self, response: StampResponse) -> bool {
        let Some(payload) = self.outstanding.remove(&response.seq_no) else {
            log_client_event!(warn, self.id, response.seq_no, "Response for unknown request");
            self.report.rejected += 1;
            return false;
        };

        match response.verify(&payload, &self.tree_key) {
            Ok(()) => {
                self.report.verified += 1;
                true
            }
            Err(e) => {
                log_client_event!(warn, self.id, response.seq_no, "Stamp rejected", error = %e);
                self.report.rejected += 1;
                false
            }
        }
    }

    /// Drop every outstanding request, counting it as unanswered.
    fn give_up(&mut self) {
        if !self.outstanding.is_empty() {
            debug!(
                client = %self.id,
                unanswered = self.outstanding.len(),
                "Giving up on outstanding requests"
            );
            self.report.unanswered += self.outstanding.len() as u64;
            self.outstanding.clear();
        }
    }

    /// Submit bursts and verify answers until `shutdown` flips.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> ClientReport {
        if self.burst == 0 {
            // Nothing to submit; idle until shutdown.
            let _ = shutdown.wait_for(|stop| *stop).await;
            return self.report;
        }

        'bursts: loop {
            self.submit_burst();
            let deadline = Instant::now() + self.wait;

            while !self.outstanding.is_empty() {
                tokio::select! {
                    _ = shutdown.changed() => break 'bursts,
                    response = self.responses.recv() => match response {
                        Some(response) => {
                            self.accept(response);
                        }
                        None => break 'bursts,
                    },
                    _ = tokio::time::sleep_until(deadline) => {
                        self.give_up();
                    }
                }
            }

            if *shutdown.borrow() {
                break;
            }
        }

        self.give_up();
        self.report
    }
}
