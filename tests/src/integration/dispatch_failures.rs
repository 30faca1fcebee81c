//! # Delivery Failure Classification
//!
//! One round, five kinds of client at the same node:
//!
//! | Client | Transport state | Expected result |
//! |--------|-----------------|-----------------|
//! | `ok` | connected | `Delivered` |
//! | `gone` | receiver dropped | `ClientClosed`, channel removed |
//! | `pending` | reserved | `ClientNotEstablished` |
//! | `stranger` | never registered | `ClientNotEstablished` |
//! | `broken` | transport fault | `OtherTransportError` |
//!
//! None of the failures may stop delivery to the others or fail the round.

#[cfg(test)]
mod tests {
    use super::super::harness::{one_round, tree, TestClient};
    use shared_types::{ClientId, Request};

    #[tokio::test]
    async fn test_failed_deliveries_do_not_block_the_round() {
        let mut container = tree(3, 2);
        let handles = container.handles().to_vec();
        let node = &handles[1];
        let transport = node.transport();

        let mut ok = TestClient::connect(node, "ok");
        let gone = TestClient::connect(node, "gone");
        transport.reserve(ClientId::new("pending"));
        transport.break_client(ClientId::new("broken"), "socket reset");

        let gone_id = gone.id.clone();
        drop(gone);

        let submit = |client: &str, seq: u64| {
            node.queue
                .enqueue(Request::new(ClientId::new(client), seq, format!("{client}-{seq}").into_bytes()));
        };
        submit("gone", 0);
        submit("ok", 0);
        submit("pending", 0);
        submit("stranger", 0);
        submit("broken", 0);
        submit("ok", 1);

        let run = one_round(container.take_nodes()).await;
        assert!(run.all_ok());

        let node_outcome = run.followers[0].as_ref().unwrap();
        assert_eq!(node_outcome.batched, 6);
        assert_eq!(node_outcome.delivered, 2);
        assert_eq!(node_outcome.undelivered, 4);

        let responses = ok.drain();
        assert_eq!(responses.len(), 2);
        for response in &responses {
            let payload = format!("ok-{}", response.seq_no).into_bytes();
            assert!(response.verify(&payload, &container.aggregate_key()).is_ok());
        }

        let stats = node.dispatcher.stats();
        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.closed, 1);
        assert_eq!(stats.not_established, 2);
        assert_eq!(stats.other_errors, 1);
        assert_eq!(stats.attempted(), 6);

        assert!(!transport.is_registered(&gone_id));
        assert!(transport.is_registered(&ClientId::new("pending")));
        assert!(transport.is_registered(&ClientId::new("broken")));
    }

    #[tokio::test]
    async fn test_reconnected_client_is_served_next_round() {
        let mut container = tree(1, 2);
        let handles = container.handles().to_vec();
        let node = &handles[0];

        node.transport().reserve(ClientId::new("late"));
        node.queue
            .enqueue(Request::new(ClientId::new("late"), 0, b"first".to_vec()));
        let run = one_round(container.take_nodes()).await;
        assert_eq!(run.outcome().undelivered, 1);

        let mut late = TestClient::connect(node, "late");
        late.submit(node, 1, b"second");
        let run = one_round(run.nodes).await;
        assert_eq!(run.outcome().delivered, 1);

        let responses = late.drain();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].seq_no, 1);
        assert!(responses[0].verify(b"second", &container.aggregate_key()).is_ok());
    }
}
