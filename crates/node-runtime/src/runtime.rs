//! # Node Runtime
//!
//! Spawns every round node and every simulated client of a
//! [`TreeContainer`], lets the root lead its rounds, then shuts the rest down.
//!
//! ## Startup Sequence
//!
//! 1. Build the tree container (validates config, wires ports)
//! 2. Connect simulated clients to their nodes
//! 3. Spawn follower drivers, then client tasks
//! 4. Drive the root on the current task until `rounds` or shutdown
//! 5. Signal shutdown and collect every summary

use std::sync::Arc;
use std::time::Duration;

use cs_04_round_protocol::NodeSummary;
use cs_05_client_dispatch::DispatchCounts;
use cs_telemetry::log_round_event;
use shared_bus::NetworkStats;
use shared_types::{Hash, NodeId};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::clients::{ClientReport, SimulatedClient};
use crate::container::{ContainerError, NodeConfig, TreeContainer};

/// Upper bound on the pause that lets followers finish the last broadcast.
const SETTLE_LIMIT: Duration = Duration::from_millis(200);

/// Cloneable trigger for stopping a running [`NodeRuntime`].
#[derive(Clone)]
pub struct ShutdownHandle(Arc<watch::Sender<bool>>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        // No receivers left means everything already stopped.
        let _ = self.0.send(true);
    }
}

/// Everything a finished runtime reports.
#[derive(Debug, Clone, Default)]
pub struct RuntimeReport {
    pub root: NodeSummary,
    pub followers: Vec<(NodeId, NodeSummary)>,
    pub clients: ClientReport,
    pub dispatch: DispatchCounts,
    pub network: NetworkStats,
    /// Rounds still held by the ledger.
    pub ledger_rounds: usize,
    pub last_global_root: Option<Hash>,
}

impl RuntimeReport {
    pub fn rounds_completed(&self) -> u64 {
        self.root.completed
    }

    pub fn rounds_failed(&self) -> u64 {
        self.root.failed
    }
}

pub struct NodeRuntime {
    container: TreeContainer,
    shutdown: ShutdownHandle,
    shutdown_rx: watch::Receiver<bool>,
}

impl NodeRuntime {
    pub fn new(config: NodeConfig) -> Result<Self, ContainerError> {
        info!("Creating collective-stamp node runtime");
        let container = TreeContainer::new(config)?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            container,
            shutdown: ShutdownHandle(Arc::new(shutdown_tx)),
            shutdown_rx,
        })
    }

    pub fn container(&self) -> &TreeContainer {
        &self.container
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Run until the root has led `config.rounds` rounds, or until shutdown.
    pub async fn run(mut self) -> RuntimeReport {
        let config = self.container.config.clone();
        let tree_key = self.container.aggregate_key();

        let mut clients = Vec::new();
        for handle in self.container.handles() {
            for i in 0..config.clients_per_node {
                clients.push(SimulatedClient::connect(i, handle, tree_key, &config));
            }
        }

        let mut nodes = self.container.take_nodes();
        if nodes.is_empty() {
            warn!("Runtime already ran; nothing to drive");
            return RuntimeReport::default();
        }
        let root = nodes.remove(0);
        let root_id = root.node_id();

        let followers: Vec<_> = nodes
            .into_iter()
            .map(|node| {
                let id = node.node_id();
                let rx = self.shutdown_rx.clone();
                (id, tokio::spawn(node.run(rx, None)))
            })
            .collect();

        let client_tasks: Vec<_> = clients
            .into_iter()
            .map(|client| tokio::spawn(client.run(self.shutdown_rx.clone())))
            .collect();

        info!(
            nodes = self.container.handles().len(),
            clients = client_tasks.len(),
            rounds = ?config.rounds,
            "Node runtime started"
        );

        let root_summary = root.run(self.shutdown_rx.clone(), config.rounds).await;

        tokio::time::sleep(config.round.phase_timeout.min(SETTLE_LIMIT)).await;
        self.shutdown.shutdown();

        let mut report = RuntimeReport {
            root: root_summary,
            ..RuntimeReport::default()
        };

        for (id, task) in followers {
            match task.await {
                Ok(summary) => report.followers.push((id, summary)),
                Err(e) => error!(node = %id, error = %e, "Follower task failed"),
            }
        }
        for task in client_tasks {
            match task.await {
                Ok(client) => report.clients += client,
                Err(e) => error!(error = %e, "Client task failed"),
            }
        }

        for handle in self.container.handles() {
            let counts = handle.dispatcher.stats();
            report.dispatch.delivered += counts.delivered;
            report.dispatch.closed += counts.closed;
            report.dispatch.not_established += counts.not_established;
            report.dispatch.other_errors += counts.other_errors;
        }
        report.network = self.container.network.stats();
        report.ledger_rounds = self.container.ledger.len();
        report.last_global_root = self.container.ledger.latest().map(|r| r.global_root);

        if let Some(last) = &report.root.last_outcome {
            log_round_event!(
                info,
                root_id,
                last.round,
                "Last collectively signed root",
                root = %hex::encode(last.global_root),
                timestamp = last.timestamp.as_secs()
            );
        }
        info!(
            completed = report.rounds_completed(),
            failed = report.rounds_failed(),
            verified = report.clients.verified,
            rejected = report.clients.rejected,
            "Node runtime stopped"
        );
        report
    }
}
