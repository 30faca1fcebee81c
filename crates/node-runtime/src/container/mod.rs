//! # Tree Container
//!
//! Builds every node of the aggregation tree inside one process and wires
//! its ports:
//!
//! - one shared [`InMemoryNetwork`] (each node registers its mailbox)
//! - one shared [`StaticTree`] topology (`k`-ary, breadth-first ids)
//! - one shared [`InMemoryLedger`] (round records + composed proofs)
//! - per node: a [`RequestQueue`], a Schnorr key pair, and a
//!   [`ClientDispatcher`] over a channel-backed client transport

pub mod config;

pub use config::{ConfigError, NodeConfig};

use std::sync::Arc;

use cs_01_request_queue::RequestQueue;
use cs_03_signature_aggregation::SchnorrAggregator;
use cs_04_round_protocol::{
    BusInbox, BusTransport, InMemoryLedger, NodePorts, RoundNode, StaticTree, TopologyError,
};
use cs_05_client_dispatch::{ChannelClientTransport, ClientDispatcher};
use shared_bus::InMemoryNetwork;
use shared_crypto::{add_points, CryptoError, PointBytes};
use shared_types::NodeId;
use thiserror::Error;
use tracing::{debug, info};

/// Dispatcher type every runtime node hands responses to.
pub type NodeDispatcher = ClientDispatcher<ChannelClientTransport>;

/// Fully wired round node.
pub type StampNode =
    RoundNode<BusTransport, StaticTree, SchnorrAggregator, NodeDispatcher, InMemoryLedger>;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot build topology: {0}")]
    Topology(#[from] TopologyError),

    #[error("cannot aggregate node keys: {0}")]
    Keys(#[from] CryptoError),
}

/// What clients of one node need after the node itself is spawned.
#[derive(Clone)]
pub struct NodeHandle {
    pub id: NodeId,
    pub queue: Arc<RequestQueue>,
    pub dispatcher: Arc<NodeDispatcher>,
    pub public_key: PointBytes,
}

impl NodeHandle {
    pub fn transport(&self) -> &Arc<ChannelClientTransport> {
        self.dispatcher.transport()
    }
}

/// All nodes of one tree plus the infrastructure they share.
pub struct TreeContainer {
    pub config: NodeConfig,
    pub network: Arc<InMemoryNetwork>,
    pub topology: Arc<StaticTree>,
    pub ledger: Arc<InMemoryLedger>,
    handles: Vec<NodeHandle>,
    nodes: Vec<StampNode>,
    aggregate_key: PointBytes,
}

impl TreeContainer {
    /// Validate `config` and build every node, in breadth-first order.
    pub fn new(config: NodeConfig) -> Result<Self, ContainerError> {
        config.validate()?;

        let topology = Arc::new(StaticTree::k_ary(config.nodes, config.branching)?);
        let network = Arc::new(InMemoryNetwork::new());
        let ledger = Arc::new(InMemoryLedger::new());

        let mut handles = Vec::with_capacity(topology.len());
        let mut nodes = Vec::with_capacity(topology.len());

        for id in topology.nodes() {
            let aggregator = Arc::new(SchnorrAggregator::generate());
            let dispatcher = Arc::new(ClientDispatcher::new(Arc::new(
                ChannelClientTransport::new(),
            )));
            let queue = Arc::new(RequestQueue::new());

            let ports = NodePorts {
                transport: Arc::new(BusTransport::new(id, Arc::clone(&network))),
                inbox: Box::new(BusInbox::new(network.register(id))),
                topology: Arc::clone(&topology),
                aggregator: Arc::clone(&aggregator),
                dispatcher: Arc::clone(&dispatcher),
                ledger: Arc::clone(&ledger),
            };

            handles.push(NodeHandle {
                id,
                queue: Arc::clone(&queue),
                dispatcher,
                public_key: aggregator.public_key(),
            });
            nodes.push(RoundNode::new(id, ports, queue, config.round.clone()));
            debug!(node = %id, "Node wired");
        }

        let keys: Vec<PointBytes> = handles.iter().map(|h| h.public_key).collect();
        let aggregate_key = add_points(&keys)?;

        info!(
            nodes = handles.len(),
            branching = config.branching,
            root = %topology.root(),
            "Aggregation tree built"
        );

        Ok(Self {
            config,
            network,
            topology,
            ledger,
            handles,
            nodes,
            aggregate_key,
        })
    }

    /// Per-node handles, in breadth-first order (root first).
    pub fn handles(&self) -> &[NodeHandle] {
        &self.handles
    }

    /// Sum of every node's public key; what a collective signature of the
    /// full tree verifies under.
    pub fn aggregate_key(&self) -> PointBytes {
        self.aggregate_key
    }

    /// Hand the round nodes over for spawning. Empty on the second call.
    pub fn take_nodes(&mut self) -> Vec<StampNode> {
        std::mem::take(&mut self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_every_node() {
        let config = NodeConfig {
            nodes: 5,
            branching: 2,
            ..NodeConfig::default()
        };
        let mut container = TreeContainer::new(config).unwrap();

        assert_eq!(container.handles().len(), 5);
        assert_eq!(container.handles()[0].id, container.topology.root());
        assert_eq!(container.network.stats().registered_nodes, 5);

        let nodes = container.take_nodes();
        assert_eq!(nodes.len(), 5);
        assert!(nodes[0].is_root());
        assert!(nodes[1..].iter().all(|n| !n.is_root()));
        assert!(container.take_nodes().is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = NodeConfig {
            branching: 0,
            ..NodeConfig::default()
        };
        assert!(matches!(
            TreeContainer::new(config),
            Err(ContainerError::Config(ConfigError::ZeroBranching))
        ));
    }

    #[test]
    fn test_aggregate_key_sums_node_keys() {
        let container = TreeContainer::new(NodeConfig {
            nodes: 3,
            ..NodeConfig::default()
        })
        .unwrap();
        let keys: Vec<_> = container.handles().iter().map(|h| h.public_key).collect();
        assert_eq!(container.aggregate_key(), add_points(&keys).unwrap());
        assert_ne!(container.aggregate_key(), PointBytes::identity());
    }
}
