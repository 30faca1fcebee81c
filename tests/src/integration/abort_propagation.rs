//! # Abort Propagation
//!
//! A node that cannot decode a frame fails its round and tells both its
//! parent and its children, so nobody sits on a fan-in barrier until the
//! phase timeout.
//!
//! ```text
//!   node-0 (root)        Announcement{timestamp: 3 bytes}
//!      │                        │
//!   node-1  ── Decode ──→ Abort to node-0 and node-2
//!      │
//!   node-2
//! ```
//!
//! Neighbours that are not under test are driven by hand straight on the bus.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::super::harness::fast_round;
    use cs_01_request_queue::RequestQueue;
    use cs_03_signature_aggregation::SchnorrAggregator;
    use cs_04_round_protocol::{
        BusInbox, BusTransport, DeliveryResult, InMemoryLedger, NodePorts, ProtocolMessage,
        ResponseDispatch, RoundError, RoundNode, StampResponse, StaticTree,
    };
    use shared_bus::{InMemoryNetwork, Mailbox};
    use shared_types::{DecodeError, NodeId, Request};

    struct Discard;

    impl ResponseDispatch for Discard {
        fn dispatch(&self, _request: &Request, _response: &StampResponse) -> DeliveryResult {
            DeliveryResult::Delivered
        }
    }

    type Node = RoundNode<BusTransport, StaticTree, SchnorrAggregator, Discard, InMemoryLedger>;

    fn chain() -> Arc<StaticTree> {
        Arc::new(StaticTree::k_ary(3, 1).unwrap())
    }

    fn node(id: u32, network: &Arc<InMemoryNetwork>, topology: &Arc<StaticTree>) -> Node {
        let node = NodeId(id);
        let ports = NodePorts {
            transport: Arc::new(BusTransport::new(node, Arc::clone(network))),
            inbox: Box::new(BusInbox::new(network.register(node))),
            topology: Arc::clone(topology),
            aggregator: Arc::new(SchnorrAggregator::from_seed([id as u8 + 1; 32])),
            dispatcher: Arc::new(Discard),
            ledger: Arc::new(InMemoryLedger::new()),
        };
        RoundNode::new(node, ports, Arc::new(RequestQueue::new()), fast_round())
    }

    async fn next_message(mailbox: &mut Mailbox) -> (NodeId, ProtocolMessage) {
        let frame = tokio::time::timeout(Duration::from_secs(2), mailbox.recv())
            .await
            .expect("frame arrives in time")
            .expect("network still open");
        (frame.from, ProtocolMessage::decode(&frame.bytes).unwrap())
    }

    #[tokio::test]
    async fn test_short_timestamp_aborts_parent_and_children() {
        let network = Arc::new(InMemoryNetwork::new());
        let topology = chain();
        let mut root_box = network.register(NodeId(0));
        let mut leaf_box = network.register(NodeId(2));
        let mut middle = node(1, &network, &topology);

        let announcement = ProtocolMessage::Announcement {
            round: 1,
            view: 0,
            timestamp: vec![1, 2, 3],
        };
        network
            .send(NodeId(0), NodeId(1), announcement.encode().unwrap())
            .unwrap();

        let result = middle.follow_round().await;
        assert!(matches!(
            result,
            Err(RoundError::Decode {
                round: 1,
                source: DecodeError::TimestampLength {
                    expected: 8,
                    actual: 3
                }
            })
        ));

        for mailbox in [&mut root_box, &mut leaf_box] {
            let (from, message) = next_message(mailbox).await;
            assert_eq!(from, NodeId(1));
            match message {
                ProtocolMessage::Abort { round, origin, .. } => {
                    assert_eq!(round, 1);
                    assert_eq!(origin, NodeId(1));
                }
                other => panic!("expected abort, got {}", other.kind()),
            }
        }
    }

    #[tokio::test]
    async fn test_garbage_commitment_aborts_up_to_root() {
        let network = Arc::new(InMemoryNetwork::new());
        let topology = chain();
        let mut root = node(0, &network, &topology);
        let mut middle = node(1, &network, &topology);
        let mut leaf_box = network.register(NodeId(2));

        let middle_task = tokio::spawn(async move { middle.follow_round().await });
        let leaf_task = tokio::spawn(async move {
            let (from, message) = next_message(&mut leaf_box).await;
            assert_eq!(from, NodeId(1));
            assert!(matches!(message, ProtocolMessage::Announcement { round: 1, .. }));

            network.send(NodeId(2), NodeId(1), vec![0xff; 3]).unwrap();
            next_message(&mut leaf_box).await
        });

        let root_result = root.lead_round().await;
        match root_result {
            Err(RoundError::Aborted { round, origin, .. }) => {
                assert_eq!(round, 1);
                assert_eq!(origin, NodeId(1));
            }
            other => panic!("expected abort at root, got {other:?}"),
        }

        assert!(matches!(
            middle_task.await.unwrap(),
            Err(RoundError::Decode { round: 1, .. })
        ));
        let (from, message) = leaf_task.await.unwrap();
        assert_eq!(from, NodeId(1));
        assert!(matches!(message, ProtocolMessage::Abort { round: 1, .. }));
    }

    #[tokio::test]
    async fn test_abort_from_below_is_forwarded_and_ends_round() {
        let network = Arc::new(InMemoryNetwork::new());
        let topology = chain();
        let mut root_box = network.register(NodeId(0));
        let mut leaf_box = network.register(NodeId(2));
        let mut middle = node(1, &network, &topology);

        let announcement = ProtocolMessage::Announcement {
            round: 4,
            view: 0,
            timestamp: 1_700_000_000i64.to_le_bytes().to_vec(),
        };
        network
            .send(NodeId(0), NodeId(1), announcement.encode().unwrap())
            .unwrap();
        let abort = ProtocolMessage::Abort {
            round: 4,
            origin: NodeId(2),
            reason: "disk full".into(),
        };
        network
            .send(NodeId(2), NodeId(1), abort.encode().unwrap())
            .unwrap();

        let result = middle.follow_round().await;
        assert!(matches!(
            result,
            Err(RoundError::Aborted { round: 4, origin: NodeId(2), .. })
        ));

        // Announcement went down before the abort arrived.
        let (_, message) = next_message(&mut leaf_box).await;
        assert!(matches!(message, ProtocolMessage::Announcement { round: 4, .. }));

        let (from, message) = next_message(&mut root_box).await;
        assert_eq!(from, NodeId(1));
        match message {
            ProtocolMessage::Abort { origin, reason, .. } => {
                assert_eq!(origin, NodeId(2));
                assert_eq!(reason, "disk full");
            }
            other => panic!("expected forwarded abort, got {}", other.kind()),
        }
    }
}
