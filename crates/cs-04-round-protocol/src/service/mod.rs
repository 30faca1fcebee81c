//! # Round Node
//!
//! Per-node context and phase handlers. One `RoundNode` drives at most one
//! round at a time; every wait on a neighbour is bounded by
//! `RoundConfig::phase_timeout`.
//!
//! ```text
//!            root                         interior / leaf
//!  1  set timestamp, announce ──────→  decode timestamp, forward down
//!  2  fan-in commitments      ←──────  swap queue, batch, combine, report up
//!  3  challenge + paths       ──────→  receive, hand each child its path
//!  4  fan-in responses        ←──────  respond, combine, report up
//!  5  broadcast signature     ──────→  forward down, check proofs, dispatch
//! ```
//!
//! A node that fails a round tells its parent and children with `Abort`;
//! a node receiving `Abort` passes it on to its other neighbours.

use std::collections::HashMap;
use std::sync::Arc;

use cs_01_request_queue::{ProcessingBuffer, RequestQueue};
use cs_02_merkle_batching::{check_proof, compose, MerkleBatcher, MerkleProof};
use cs_03_signature_aggregation::{CollectiveSignature, SignatureAggregator};
use shared_types::{short_hex, Hash, NodeId, RoundNumber, Timestamp, ViewNumber};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::domain::{
    signed_message, ProtocolMessage, Round, RoundConfig, RoundError, RoundPhase, RoundResult,
    StampResponse,
};
use crate::ports::{
    DeliveryResult, PeerInbox, PeerTransport, ResponseDispatch, RoundLedger, RoundRecord,
    SystemTimeSource, TimeSource, TopologyProvider,
};


/// Collaborators a node is wired to.
pub struct NodePorts<T, P, A, D, L> {
    pub transport: Arc<T>,
    pub inbox: Box<dyn PeerInbox>,
    pub topology: Arc<P>,
    pub aggregator: Arc<A>,
    pub dispatcher: Arc<D>,
    pub ledger: Arc<L>,
}

/// Result of one completed round on one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub round: RoundNumber,
    pub view: ViewNumber,
    pub timestamp: Timestamp,
    pub global_root: Hash,
    /// Requests this node batched.
    pub batched: usize,
    pub delivered: usize,
    pub undelivered: usize,
}

/// Totals over the lifetime of [`RoundNode::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSummary {
    pub completed: u64,
    pub failed: u64,
    pub delivered: u64,
    pub last_outcome: Option<RoundOutcome>,
}

impl NodeSummary {
    fn record(&mut self, result: &RoundResult<RoundOutcome>) {
        match result {
            Ok(outcome) => {
                self.completed += 1;
                self.delivered += outcome.delivered as u64;
                self.last_outcome = Some(outcome.clone());
            }
            Err(_) => self.failed += 1,
        }
    }
}

pub struct RoundNode<T, P, A, D, L>
where
    T: PeerTransport,
    P: TopologyProvider,
    A: SignatureAggregator,
    D: ResponseDispatch,
    L: RoundLedger,
{
    node: NodeId,
    transport: Arc<T>,
    inbox: Box<dyn PeerInbox>,
    topology: Arc<P>,
    aggregator: Arc<A>,
    dispatcher: Arc<D>,
    ledger: Arc<L>,
    queue: Arc<RequestQueue>,
    processing: ProcessingBuffer,
    batcher: MerkleBatcher,
    config: RoundConfig,
    time_source: Box<dyn TimeSource>,
    view: ViewNumber,
    last_round: RoundNumber,
}

impl<T, P, A, D, L> RoundNode<T, P, A, D, L>
where
    T: PeerTransport,
    P: TopologyProvider,
    A: SignatureAggregator,
    D: ResponseDispatch,
    L: RoundLedger,
{
    pub fn new(
        node: NodeId,
        ports: NodePorts<T, P, A, D, L>,
        queue: Arc<RequestQueue>,
        config: RoundConfig,
    ) -> Self {
        Self {
            node,
            transport: ports.transport,
            inbox: ports.inbox,
            topology: ports.topology,
            aggregator: ports.aggregator,
            dispatcher: ports.dispatcher,
            ledger: ports.ledger,
            queue,
            processing: ProcessingBuffer::new(),
            batcher: MerkleBatcher::new(),
            config,
            time_source: Box::new(SystemTimeSource),
            view: 0,
            last_round: 0,
        }
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Box<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }

    /// Inbox that clients of this node submit to.
    pub fn queue(&self) -> Arc<RequestQueue> {
        Arc::clone(&self.queue)
    }

    pub fn is_root(&self) -> bool {
        self.topology.is_root(self.node)
    }

    pub fn last_round(&self) -> RoundNumber {
        self.last_round
    }

    // === ROUND ENTRY POINTS ===

    /// Originate one round. Tree root only.
    pub async fn lead_round(&mut self) -> RoundResult<RoundOutcome> {
        if !self.is_root() {
            return Err(RoundError::NotRoot(self.node));
        }

        let number = self.last_round + 1;
        self.last_round = number;
        let timestamp = self.time_source.now();
        info!(node = %self.node, round = number, timestamp = timestamp.as_secs(), "Starting round");

        let mut round = Round::new(number, self.view, timestamp);
        let announcement = ProtocolMessage::Announcement {
            round: number,
            view: self.view,
            timestamp: timestamp.encode_le().to_vec(),
        };
        let span = info_span!("round", node = %self.node, round = number);
        let result = self
            .run_phases(&mut round, announcement)
            .instrument(span)
            .await;
        self.finish(&mut round, result).await
    }

    /// Wait for the parent's next announcement and take part in that round.
    pub async fn follow_round(&mut self) -> RoundResult<RoundOutcome> {
        let parent = self
            .topology
            .parent(self.node)
            .ok_or(RoundError::IsRoot(self.node))?;
        let (number, view, raw) = self.await_announcement(parent).await?;
        self.last_round = number;
        self.view = view;

        let timestamp = match Timestamp::decode_le(&raw) {
            Ok(ts) => ts,
            Err(source) => {
                let err = RoundError::Decode {
                    round: number,
                    source,
                };
                error!(node = %self.node, round = number, error = %err, "Undecodable announcement");
                self.send_abort(number, self.node, err.to_string(), None).await;
                return Err(err);
            }
        };

        let mut round = Round::new(number, view, timestamp);
        let announcement = ProtocolMessage::Announcement {
            round: number,
            view,
            timestamp: raw,
        };
        let span = info_span!("round", node = %self.node, round = number);
        let result = self
            .run_phases(&mut round, announcement)
            .instrument(span)
            .await;
        self.finish(&mut round, result).await
    }

    /// Drive rounds until `shutdown` flips (or its sender is dropped).
    ///
    /// The root leads a round every `round_interval`, stopping after
    /// `max_rounds` if given; other nodes follow their parent.
    pub async fn run(
        mut self,
        mut shutdown: watch::Receiver<bool>,
        max_rounds: Option<u64>,
    ) -> NodeSummary {
        let mut summary = NodeSummary::default();
        info!(node = %self.node, root = self.is_root(), "Round driver started");

        if self.is_root() {
            let mut ticker = tokio::time::interval(self.config.round_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                if max_rounds.is_some_and(|max| self.last_round >= max) {
                    break;
                }
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = ticker.tick() => {
                        let result = self.lead_round().await;
                        summary.record(&result);
                    }
                }
            }
        } else {
            loop {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    result = self.follow_round() => {
                        if matches!(result, Err(RoundError::InboxClosed)) {
                            break;
                        }
                        summary.record(&result);
                    }
                }
            }
        }

        info!(
            node = %self.node,
            completed = summary.completed,
            failed = summary.failed,
            "Round driver stopped"
        );
        summary
    }

    async fn finish(
        &mut self,
        round: &mut Round,
        result: RoundResult<RoundOutcome>,
    ) -> RoundResult<RoundOutcome> {
        match result {
            Ok(outcome) => {
                info!(
                    node = %self.node,
                    round = outcome.round,
                    root = %short_hex(&outcome.global_root),
                    batched = outcome.batched,
                    delivered = outcome.delivered,
                    "Round complete"
                );
                Ok(outcome)
            }
            Err(err) => {
                let phase = round.phase();
                round.fail();
                error!(node = %self.node, round = round.number, %phase, error = %err, "Round failed");
                if err.should_propagate() {
                    self.send_abort(round.number, self.node, err.to_string(), None)
                        .await;
                }
                Err(err)
            }
        }
    }

    // === PHASES ===

    async fn run_phases(
        &mut self,
        round: &mut Round,
        announcement: ProtocolMessage,
    ) -> RoundResult<RoundOutcome> {
        self.send_to_children(&announcement).await?;

        round.advance(RoundPhase::Commitment)?;
        self.commitment_phase(round).await?;

        round.advance(RoundPhase::Challenge)?;
        self.challenge_phase(round).await?;

        round.advance(RoundPhase::Response)?;
        let signature = self.response_phase(round).await?;

        round.advance(RoundPhase::Broadcast)?;
        let outcome = self.broadcast_phase(round, signature).await?;

        round.advance(RoundPhase::Complete)?;
        Ok(outcome)
    }

    async fn commitment_phase(&mut self, round: &mut Round) -> RoundResult<()> {
        let requests = self.queue.swap_and_drain(&mut self.processing);
        let local = self.batcher.batch(requests);
        debug!(
            requests = local.len(),
            local_root = %short_hex(&local.root),
            "Batched local requests"
        );

        if self.config.proof_check.checks_local() {
            self.batcher.check_local_proofs(&local)?;
        }

        let (own, secret) = self.aggregator.new_contribution();
        round.store_secret(secret);

        let children = self.topology.children(self.node);
        let reports = self
            .collect_from_children(round, RoundPhase::Commitment, &children, |msg| match msg {
                ProtocolMessage::Commitment {
                    subtree_root,
                    commitment,
                    ..
                } => Some((subtree_root, commitment)),
                _ => None,
            })
            .await?;

        let (child_roots, child_commitments): (Vec<_>, Vec<_>) = reports.into_iter().unzip();
        let combination = self.batcher.combine(local.root, &child_roots);
        let aggregate = self.aggregator.combine(&own, &child_commitments)?;

        match self.topology.parent(self.node) {
            Some(parent) => {
                self.send(
                    parent,
                    &ProtocolMessage::Commitment {
                        round: round.number,
                        subtree_root: combination.root,
                        commitment: aggregate,
                    },
                )
                .await?;
            }
            None => {
                debug!(global_root = %short_hex(&combination.root), "Global root fixed");
                round.global_root = Some(combination.root);
            }
        }

        round.local = Some(local);
        round.combination = Some(combination);
        round.commitment = Some(aggregate);
        Ok(())
    }

    async fn challenge_phase(&mut self, round: &mut Round) -> RoundResult<()> {
        let (challenge, inherited) = if self.is_root() {
            let global_root = round
                .global_root
                .ok_or(RoundError::MissingState("global root"))?;
            let message = signed_message(&global_root, round.timestamp);
            let challenge = self.aggregator.challenge(round.commitment()?, &message);
            (challenge, MerkleProof::empty())
        } else {
            self.await_parent(round, RoundPhase::Challenge, |msg| match msg {
                ProtocolMessage::Challenge {
                    challenge,
                    inherited_path,
                    ..
                } => Some((challenge, inherited_path)),
                _ => None,
            })
            .await?
        };

        let children = self.topology.children(self.node);
        let combination = round.combination()?;
        for (index, child) in children.iter().enumerate() {
            let path = combination
                .path_for_child(index, &inherited)
                .ok_or(RoundError::MissingState("child path"))?;
            self.send(
                *child,
                &ProtocolMessage::Challenge {
                    round: round.number,
                    challenge,
                    inherited_path: path,
                },
            )
            .await?;
        }

        round.challenge = Some(challenge);
        round.inherited = inherited;
        Ok(())
    }

    /// Returns the assembled signature at the root, `None` elsewhere.
    async fn response_phase(&mut self, round: &mut Round) -> RoundResult<Option<CollectiveSignature>> {
        let secret = round.take_secret()?;
        let own = self.aggregator.respond(round.challenge()?, secret)?;

        let children = self.topology.children(self.node);
        let partials = self
            .collect_from_children(round, RoundPhase::Response, &children, |msg| match msg {
                ProtocolMessage::Response { response, .. } => Some(response),
                _ => None,
            })
            .await?;
        let combined = self.aggregator.combine_responses(&own, &partials)?;

        match self.topology.parent(self.node) {
            Some(parent) => {
                self.send(
                    parent,
                    &ProtocolMessage::Response {
                        round: round.number,
                        response: combined,
                    },
                )
                .await?;
                Ok(None)
            }
            None => {
                let global_root = round
                    .global_root
                    .ok_or(RoundError::MissingState("global root"))?;
                let signature =
                    self.aggregator
                        .assemble(round.commitment()?, round.challenge()?, &combined);
                self.aggregator
                    .verify(&signature, &signed_message(&global_root, round.timestamp))?;
                Ok(Some(signature))
            }
        }
    }

    async fn broadcast_phase(
        &mut self,
        round: &mut Round,
        assembled: Option<CollectiveSignature>,
    ) -> RoundResult<RoundOutcome> {
        let (global_root, timestamp, signature) = match assembled {
            Some(signature) => {
                let global_root = round
                    .global_root
                    .ok_or(RoundError::MissingState("global root"))?;
                (global_root, round.timestamp, signature)
            }
            None => {
                self.await_parent(round, RoundPhase::Broadcast, |msg| match msg {
                    ProtocolMessage::SignatureBroadcast {
                        global_root,
                        timestamp,
                        signature,
                        ..
                    } => Some((global_root, timestamp, signature)),
                    _ => None,
                })
                .await?
            }
        };
        round.global_root = Some(global_root);

        // Children first; a child we cannot reach does not hold back our clients.
        let broadcast = ProtocolMessage::SignatureBroadcast {
            round: round.number,
            global_root,
            timestamp,
            signature,
        };
        for child in self.topology.children(self.node) {
            if let Err(e) = self.transport.send(child, &broadcast).await {
                warn!(child = %child, error = %e, "Failed to forward signature broadcast");
            }
        }

        let check = self.config.proof_check.checks_composed();
        if check {
            self.aggregator
                .verify(&signature, &signed_message(&global_root, timestamp))?;
        }

        let local = round.local()?;
        let own_path = round.combination()?.path_for_self(&round.inherited);
        let requests = self.processing.requests();

        let mut responses = Vec::with_capacity(requests.len());
        for (request, (leaf, local_proof)) in requests
            .iter()
            .zip(local.leaves.iter().zip(&local.proofs))
        {
            let proof = compose(&own_path, local_proof);
            if check && !check_proof(&global_root, leaf, &proof) {
                return Err(RoundError::IntegrityMismatch {
                    round: round.number,
                    client: request.client_id.clone(),
                    seq_no: request.seq_no,
                    root: short_hex(&global_root),
                });
            }
            responses.push(StampResponse {
                seq_no: request.seq_no,
                timestamp,
                global_root,
                proof,
                signature,
            });
        }

        self.ledger.record_round(RoundRecord {
            round: round.number,
            view: round.view,
            global_root,
            timestamp,
            signature,
        });
        if !responses.is_empty() {
            self.ledger.record_proofs(
                round.number,
                local
                    .leaves
                    .iter()
                    .copied()
                    .zip(responses.iter().map(|r| r.proof.clone()))
                    .collect(),
            );
        }

        let mut delivered = 0;
        for (request, response) in requests.iter().zip(&responses) {
            match self.dispatcher.dispatch(request, response) {
                DeliveryResult::Delivered => delivered += 1,
                other => debug!(client = %request.client_id, seq = request.seq_no, ?other, "Response not delivered"),
            }
        }

        Ok(RoundOutcome {
            round: round.number,
            view: round.view,
            timestamp,
            global_root,
            batched: responses.len(),
            delivered,
            undelivered: responses.len() - delivered,
        })
    }

    // === MESSAGING ===

    async fn send(&self, to: NodeId, message: &ProtocolMessage) -> RoundResult<()> {
        self.transport
            .send(to, message)
            .await
            .map_err(|e| RoundError::Transport(e.to_string()))
    }

    async fn send_to_children(&self, message: &ProtocolMessage) -> RoundResult<()> {
        for child in self.topology.children(self.node) {
            self.send(child, message).await?;
        }
        Ok(())
    }

    fn neighbours(&self) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = self.topology.parent(self.node).into_iter().collect();
        out.extend(self.topology.children(self.node));
        out
    }

    fn is_neighbour(&self, node: NodeId) -> bool {
        self.topology.parent(self.node) == Some(node)
            || self.topology.children(self.node).contains(&node)
    }

    /// Best effort: an unreachable neighbour will time out on its own.
    async fn send_abort(
        &self,
        round: RoundNumber,
        origin: NodeId,
        reason: String,
        except: Option<NodeId>,
    ) {
        let abort = ProtocolMessage::Abort {
            round,
            origin,
            reason,
        };
        for neighbour in self.neighbours() {
            if Some(neighbour) == except {
                continue;
            }
            if let Err(e) = self.transport.send(neighbour, &abort).await {
                warn!(node = %self.node, to = %neighbour, round, error = %e, "Failed to send abort");
            }
        }
    }

    /// Idle wait for the next announcement from `parent`.
    async fn await_announcement(
        &mut self,
        parent: NodeId,
    ) -> RoundResult<(RoundNumber, ViewNumber, Vec<u8>)> {
        loop {
            let inbound = self.inbox.recv().await.ok_or(RoundError::InboxClosed)?;
            match inbound.message {
                Ok(ProtocolMessage::Announcement {
                    round,
                    view,
                    timestamp,
                }) if inbound.from == parent && round > self.last_round => {
                    debug!(node = %self.node, round, "Announcement received");
                    return Ok((round, view, timestamp));
                }
                Ok(other) => {
                    debug!(
                        node = %self.node,
                        from = %inbound.from,
                        kind = other.kind(),
                        round = other.round(),
                        "Dropping message outside a round"
                    );
                }
                Err(e) => {
                    warn!(node = %self.node, from = %inbound.from, error = %e, "Dropping undecodable frame outside a round");
                }
            }
        }
    }

    /// Next message for `round` from a tree neighbour, before `deadline`.
    ///
    /// Frames for other rounds are dropped. An `Abort` for this round is
    /// passed on to the other neighbours and ends the round.
    async fn next_message(
        &mut self,
        round: RoundNumber,
        phase: RoundPhase,
        deadline: Instant,
    ) -> RoundResult<(NodeId, ProtocolMessage)> {
        loop {
            let inbound = match tokio::time::timeout_at(deadline, self.inbox.recv()).await {
                Err(_) => return Err(RoundError::PhaseTimeout { round, phase }),
                Ok(None) => return Err(RoundError::InboxClosed),
                Ok(Some(inbound)) => inbound,
            };
            let from = inbound.from;
            if !self.is_neighbour(from) {
                warn!(node = %self.node, from = %from, "Dropping frame from outside the tree edges");
                continue;
            }

            let message = inbound
                .message
                .map_err(|source| RoundError::Decode { round, source })?;

            if message.round() != round {
                if matches!(message, ProtocolMessage::Announcement { .. }) {
                    warn!(node = %self.node, round, incoming = message.round(), "Dropping announcement received mid-round");
                } else {
                    debug!(node = %self.node, round, stale = message.round(), kind = message.kind(), "Dropping message for another round");
                }
                continue;
            }

            if let ProtocolMessage::Abort { origin, reason, .. } = message {
                warn!(node = %self.node, round, %origin, %reason, "Round aborted by neighbour");
                self.send_abort(round, origin, reason.clone(), Some(from)).await;
                return Err(RoundError::Aborted {
                    round,
                    origin,
                    reason,
                });
            }

            return Ok((from, message));
        }
    }

    async fn await_parent<X, F>(&mut self, round: &Round, phase: RoundPhase, extract: F) -> RoundResult<X>
    where
        F: Fn(ProtocolMessage) -> Option<X>,
    {
        let parent = self
            .topology
            .parent(self.node)
            .ok_or(RoundError::MissingState("parent"))?;
        let deadline = Instant::now() + self.config.phase_timeout;

        loop {
            let (from, message) = self.next_message(round.number, phase, deadline).await?;
            if from != parent {
                warn!(node = %self.node, from = %from, %phase, kind = message.kind(), "Dropping child message while waiting on parent");
                continue;
            }
            let kind = message.kind();
            return extract(message).ok_or(RoundError::UnexpectedMessage {
                round: round.number,
                from,
                kind,
                phase,
            });
        }
    }

    /// Fan-in barrier: one message from every child, returned in topology order.
    async fn collect_from_children<X, F>(
        &mut self,
        round: &Round,
        phase: RoundPhase,
        children: &[NodeId],
        extract: F,
    ) -> RoundResult<Vec<X>>
    where
        F: Fn(ProtocolMessage) -> Option<X>,
    {
        let deadline = Instant::now() + self.config.phase_timeout;
        let mut received: HashMap<NodeId, X> = HashMap::with_capacity(children.len());

        while received.len() < children.len() {
            let (from, message) = self.next_message(round.number, phase, deadline).await?;
            if !children.contains(&from) {
                warn!(node = %self.node, from = %from, %phase, kind = message.kind(), "Dropping parent message during fan-in");
                continue;
            }
            if received.contains_key(&from) {
                warn!(node = %self.node, child = %from, %phase, "Duplicate fan-in message ignored");
                continue;
            }
            let kind = message.kind();
            let value = extract(message).ok_or(RoundError::UnexpectedMessage {
                round: round.number,
                from,
                kind,
                phase,
            })?;
            received.insert(from, value);
            debug!(node = %self.node, child = %from, %phase, got = received.len(), of = children.len(), "Fan-in progress");
        }

        Ok(children
            .iter()
            .filter_map(|child| received.remove(child))
            .collect())
    }
}
