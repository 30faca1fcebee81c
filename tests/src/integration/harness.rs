//! Tree fixtures shared by the integration scenarios.

use std::time::Duration;

use cs_04_round_protocol::{ProofCheckLevel, RoundConfig, RoundOutcome, RoundResult, StampResponse};
use node_runtime::{NodeConfig, NodeHandle, StampNode, TreeContainer};
use shared_types::{ClientId, Request};
use tokio::sync::mpsc;

pub fn fast_round() -> RoundConfig {
    RoundConfig {
        phase_timeout: Duration::from_millis(500),
        proof_check: ProofCheckLevel::Full,
        round_interval: Duration::from_millis(10),
    }
}

/// Container for a `nodes`-node tree with no simulated clients.
pub fn tree(nodes: u32, branching: u32) -> TreeContainer {
    TreeContainer::new(NodeConfig {
        nodes,
        branching,
        rounds: Some(1),
        clients_per_node: 0,
        round: fast_round(),
        ..NodeConfig::default()
    })
    .expect("valid tree config")
}

/// A hand-driven client attached to one node.
pub struct TestClient {
    pub id: ClientId,
    pub rx: mpsc::UnboundedReceiver<StampResponse>,
}

impl TestClient {
    pub fn connect(handle: &NodeHandle, name: &str) -> Self {
        let id = ClientId::new(name);
        let rx = handle.transport().connect(id.clone());
        Self { id, rx }
    }

    pub fn submit(&self, handle: &NodeHandle, seq_no: u64, payload: &[u8]) -> Request {
        let request = Request::new(self.id.clone(), seq_no, payload.to_vec());
        handle.queue.enqueue(request.clone());
        request
    }

    /// Every response received so far.
    pub fn drain(&mut self) -> Vec<StampResponse> {
        let mut out = Vec::new();
        while let Ok(response) = self.rx.try_recv() {
            out.push(response);
        }
        out
    }
}

/// Results of one round across the whole tree.
pub struct RoundRun {
    /// Nodes handed back in their original (breadth-first) order.
    pub nodes: Vec<StampNode>,
    pub root: RoundResult<RoundOutcome>,
    pub followers: Vec<RoundResult<RoundOutcome>>,
}

impl RoundRun {
    pub fn outcome(&self) -> &RoundOutcome {
        self.root.as_ref().expect("root round succeeded")
    }

    pub fn all_ok(&self) -> bool {
        self.root.is_ok() && self.followers.iter().all(|r| r.is_ok())
    }
}

/// Spawn every follower on one round, lead it at the root, collect results.
pub async fn one_round(mut nodes: Vec<StampNode>) -> RoundRun {
    let mut root = nodes.remove(0);
    let tasks: Vec<_> = nodes
        .into_iter()
        .map(|mut node| {
            tokio::spawn(async move {
                let result = node.follow_round().await;
                (node, result)
            })
        })
        .collect();

    let root_result = root.lead_round().await;

    let mut all = vec![root];
    let mut followers = Vec::new();
    for task in tasks {
        let (node, result) = task.await.expect("follower task panicked");
        all.push(node);
        followers.push(result);
    }

    RoundRun {
        nodes: all,
        root: root_result,
        followers,
    }
}
