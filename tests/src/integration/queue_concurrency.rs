//! # Queue Concurrency Under Live Rounds
//!
//! Producer threads keep enqueueing while the tree runs back-to-back rounds.
//! Every request must come back exactly once, under exactly one round's root.

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::thread;

    use super::super::harness::{one_round, tree, TestClient};
    use shared_types::Hash;

    const PRODUCERS: usize = 4;
    const PER_PRODUCER: u64 = 300;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_enqueue_during_rounds_loses_nothing() {
        let mut container = tree(3, 2);
        let handles = container.handles().to_vec();

        let mut clients = Vec::new();
        let mut producers = Vec::new();
        for p in 0..PRODUCERS {
            let handle = handles[p % handles.len()].clone();
            let client = TestClient::connect(&handle, &format!("producer-{p}"));
            let id = client.id.clone();
            clients.push(client);

            producers.push(thread::spawn(move || {
                for seq in 0..PER_PRODUCER {
                    let payload = format!("{id}/{seq}").into_bytes();
                    handle
                        .queue
                        .enqueue(shared_types::Request::new(id.clone(), seq, payload));
                    if seq % 16 == 0 {
                        thread::yield_now();
                    }
                }
            }));
        }

        let mut nodes = container.take_nodes();
        let mut roots: Vec<Hash> = Vec::new();
        loop {
            let producing = producers.iter().any(|p| !p.is_finished());
            let run = one_round(nodes).await;
            assert!(run.all_ok());
            roots.push(run.outcome().global_root);
            nodes = run.nodes;
            if !producing {
                break;
            }
        }
        for producer in producers {
            producer.join().unwrap();
        }

        let mut per_round: HashMap<Hash, usize> = HashMap::new();
        for mut client in clients {
            let responses = client.drain();
            assert_eq!(responses.len() as u64, PER_PRODUCER, "{}", client.id);

            let seqs: HashSet<u64> = responses.iter().map(|r| r.seq_no).collect();
            assert_eq!(seqs.len() as u64, PER_PRODUCER, "duplicate stamp for {}", client.id);

            for response in &responses {
                let payload = format!("{}/{}", client.id, response.seq_no).into_bytes();
                assert!(response.verify(&payload, &container.aggregate_key()).is_ok());
                assert!(roots.contains(&response.global_root));
                *per_round.entry(response.global_root).or_default() += 1;
            }
        }

        let total: usize = per_round.values().sum();
        assert_eq!(total as u64, PRODUCERS as u64 * PER_PRODUCER);
        for handle in &handles {
            assert_eq!(handle.queue.pending(), 0);
        }
    }
}
