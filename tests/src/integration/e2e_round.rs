//! # End-to-End Round Tests
//!
//! ```text
//!          R                    node-0
//!        /   \                 /      \
//!       A     B           node-1      node-2
//!                         /    \      /    \
//!                    node-3 node-4 node-5 node-6
//! ```
//!
//! 1. **3-node tree**: one request per node, one global root, three verified stamps
//! 2. **Empty interior node**: an idle node still forwards every phase
//! 3. **Empty round**: no requests anywhere, round still completes
//! 4. **Ledger anchoring**: any batched leaf can be proven after the round

#[cfg(test)]
mod tests {
    use super::super::harness::{one_round, tree, TestClient};
    use cs_02_merkle_batching::{check_proof, MerkleBatcher, SENTINEL_HASH};
    use cs_04_round_protocol::{StampResponse, StampVerificationError};
    use shared_crypto::merkle_leaf_hash;
    use shared_types::Hash;

    fn subtree_root(own: Hash, children: &[Hash]) -> Hash {
        MerkleBatcher::new().combine(own, children).root
    }

    fn single(responses: Vec<StampResponse>) -> StampResponse {
        assert_eq!(responses.len(), 1, "expected exactly one response");
        responses.into_iter().next().unwrap()
    }

    #[tokio::test]
    async fn test_three_node_round_signs_one_global_root() {
        let mut container = tree(3, 2);
        let handles = container.handles().to_vec();
        let names = ["r-client", "a-client", "b-client"];

        let mut clients: Vec<TestClient> = handles
            .iter()
            .zip(names)
            .map(|(h, name)| TestClient::connect(h, name))
            .collect();
        let payloads: Vec<Vec<u8>> = names.iter().map(|n| format!("{n}/doc").into_bytes()).collect();
        for ((client, handle), payload) in clients.iter().zip(&handles).zip(&payloads) {
            client.submit(handle, 7, payload);
        }

        let run = one_round(container.take_nodes()).await;
        assert!(run.all_ok());
        let outcome = run.outcome().clone();

        let leaves: Vec<Hash> = payloads.iter().map(|p| merkle_leaf_hash(p)).collect();
        assert_eq!(outcome.global_root, subtree_root(leaves[0], &leaves[1..]));
        assert_eq!(outcome.batched, 1);

        let mut signatures = Vec::new();
        for (client, payload) in clients.iter_mut().zip(&payloads) {
            let response = single(client.drain());
            assert_eq!(response.seq_no, 7);
            assert_eq!(response.global_root, outcome.global_root);
            assert_eq!(response.timestamp, outcome.timestamp);
            assert!(response.verify(payload, &container.aggregate_key()).is_ok());
            assert_eq!(
                response.verify(payload, &handles[0].public_key),
                Err(StampVerificationError::SignerMismatch)
            );
            assert!(check_proof(
                &outcome.global_root,
                &merkle_leaf_hash(payload),
                &response.proof
            ));
            signatures.push(response.signature);
        }
        assert!(signatures.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(signatures[0].aggregate_public_key, container.aggregate_key());

        for handle in &handles {
            assert_eq!(handle.queue.pending(), 0);
            assert_eq!(handle.dispatcher.stats().delivered, 1);
        }
    }

    #[tokio::test]
    async fn test_empty_interior_node_forwards_children() {
        let mut container = tree(7, 2);
        let handles = container.handles().to_vec();

        // node-1 stays idle; everyone else stamps one document.
        let mut clients = Vec::new();
        let mut leaves = vec![SENTINEL_HASH; 7];
        for (i, handle) in handles.iter().enumerate() {
            if i == 1 {
                continue;
            }
            let client = TestClient::connect(handle, &format!("client-{i}"));
            let payload = format!("doc-{i}").into_bytes();
            client.submit(handle, 0, &payload);
            leaves[i] = merkle_leaf_hash(&payload);
            clients.push((client, payload));
        }

        let run = one_round(container.take_nodes()).await;
        assert!(run.all_ok());
        let outcome = run.outcome();

        let left = subtree_root(SENTINEL_HASH, &[leaves[3], leaves[4]]);
        let right = subtree_root(leaves[2], &[leaves[5], leaves[6]]);
        assert_eq!(outcome.global_root, subtree_root(leaves[0], &[left, right]));

        assert_eq!(run.followers[0].as_ref().unwrap().batched, 0);
        for (client, payload) in clients.iter_mut() {
            let response = single(client.drain());
            assert_eq!(response.global_root, outcome.global_root);
            assert!(response.verify(payload, &container.aggregate_key()).is_ok());
        }
    }

    #[tokio::test]
    async fn test_round_without_requests_completes() {
        let mut container = tree(3, 2);
        let handles = container.handles().to_vec();
        let mut idle = TestClient::connect(&handles[1], "idle");

        let run = one_round(container.take_nodes()).await;
        assert!(run.all_ok());

        let expected = subtree_root(SENTINEL_HASH, &[SENTINEL_HASH, SENTINEL_HASH]);
        assert_eq!(run.outcome().global_root, expected);
        assert_eq!(run.outcome().delivered, 0);
        assert!(idle.drain().is_empty());
        assert_eq!(container.ledger.latest().map(|r| r.global_root), Some(expected));
    }

    #[tokio::test]
    async fn test_requests_land_in_exactly_one_round() {
        let mut container = tree(3, 2);
        let handles = container.handles().to_vec();
        let mut client = TestClient::connect(&handles[2], "steady");
        let mut nodes = container.take_nodes();
        let mut roots = Vec::new();

        for round in 0..3u64 {
            client.submit(&handles[2], round * 2, format!("a{round}").as_bytes());
            client.submit(&handles[2], round * 2 + 1, format!("b{round}").as_bytes());
            let run = one_round(nodes).await;
            assert!(run.all_ok());
            roots.push(run.outcome().global_root);
            nodes = run.nodes;

            let responses = client.drain();
            assert_eq!(responses.len(), 2, "round {round}");
            assert!(responses.iter().all(|r| r.global_root == roots[round as usize]));
        }

        roots.dedup();
        assert_eq!(roots.len(), 3);
    }

    #[tokio::test]
    async fn test_ledger_anchors_every_leaf() {
        let mut container = tree(3, 2);
        let handles = container.handles().to_vec();
        let client = TestClient::connect(&handles[1], "release-bot");
        let digests: Vec<Vec<u8>> = (0..5).map(|i| format!("release-1.{i}.tar.gz").into_bytes()).collect();
        for (seq, payload) in digests.iter().enumerate() {
            client.submit(&handles[1], seq as u64, payload);
        }

        let run = one_round(container.take_nodes()).await;
        assert!(run.all_ok());
        let record = container.ledger.round(1).expect("round recorded");
        assert_eq!(record.global_root, run.outcome().global_root);

        for payload in &digests {
            let leaf = merkle_leaf_hash(payload);
            let anchored = container.ledger.proof_for(&leaf).expect("leaf anchored");
            assert_eq!(anchored.record.round, 1);
            assert!(anchored.verify(&leaf, &container.aggregate_key()));
        }
        assert!(container.ledger.proof_for(&merkle_leaf_hash(b"never stamped")).is_none());
    }
}
