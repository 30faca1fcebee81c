//! # Proof Composition Order Regression
//!
//! A stamp's proof is `local ++ inherited`. Swapping the halves gives a
//! proof whose halves each check out on their own level but which never
//! reaches the global root. Both a live round and randomised trees are
//! checked.

#[cfg(test)]
mod tests {
    use super::super::harness::{one_round, tree, TestClient};
    use cs_02_merkle_batching::{check_proof, compose, MerkleProof, MerkleTree, RootCombination};
    use rand::Rng;
    use shared_crypto::merkle_leaf_hash;
    use shared_types::Hash;

    fn digests(tag: &str, n: usize) -> Vec<Hash> {
        (0..n)
            .map(|i| merkle_leaf_hash(format!("{tag}-{i}").as_bytes()))
            .collect()
    }

    #[tokio::test]
    async fn test_live_stamp_fails_when_halves_are_swapped() {
        // node-0 → node-1 → node-2
        let mut container = tree(3, 1);
        let handles = container.handles().to_vec();
        let mut client = TestClient::connect(&handles[2], "deep");
        let payloads: Vec<Vec<u8>> = (0..4).map(|i| vec![i; 12]).collect();
        for (seq, payload) in payloads.iter().enumerate() {
            client.submit(&handles[2], seq as u64, payload);
        }

        let run = one_round(container.take_nodes()).await;
        assert!(run.all_ok());

        // Four local leaves: the first two proof nodes are the local path.
        let local_len = 2;
        for response in client.drain() {
            let payload = &payloads[response.seq_no as usize];
            let leaf = merkle_leaf_hash(payload);
            let nodes = response.proof.nodes();
            assert!(nodes.len() > local_len);

            let local = MerkleProof::new(nodes[..local_len].to_vec());
            let inherited = MerkleProof::new(nodes[local_len..].to_vec());

            assert!(check_proof(&response.global_root, &leaf, &compose(&inherited, &local)));
            assert!(!check_proof(&response.global_root, &leaf, &compose(&local, &inherited)));
        }
    }

    #[test]
    fn test_reversed_composition_fails_for_random_trees() {
        let mut rng = rand::thread_rng();
        for case in 0..50 {
            let own_leaves = rng.gen_range(2..=9);
            let siblings = rng.gen_range(1..=4);
            let local_tree = MerkleTree::build(digests(&format!("own{case}"), own_leaves));
            let parent = RootCombination::new(local_tree.root(), &digests(&format!("sib{case}"), siblings));
            let upper = RootCombination::new(parent.root, &digests(&format!("upper{case}"), 1));

            let inherited = parent.path_for_self(&upper.path_for_self(&MerkleProof::empty()));
            let global = upper.root;

            let index = rng.gen_range(0..own_leaves);
            let leaf = local_tree.leaf(index).unwrap();
            let local = local_tree.proof(index).unwrap();

            assert!(check_proof(&global, &leaf, &compose(&inherited, &local)), "case {case}");
            assert!(!check_proof(&global, &leaf, &compose(&local, &inherited)), "case {case}");
        }
    }
}
