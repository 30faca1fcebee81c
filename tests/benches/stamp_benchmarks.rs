//! # Collective-Stamp Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | cs-01 Request Queue | enqueue burst + swap |
//! | cs-02 Merkle Batching | local tree + proofs, proof checks |
//! | cs-03 Signature Aggregation | one signing round over `n` signers, verification |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cs_01_request_queue::{ProcessingBuffer, RequestQueue};
use cs_02_merkle_batching::{check_proof, MerkleBatcher};
use cs_03_signature_aggregation::{SchnorrAggregator, SignatureAggregator};
use cs_04_round_protocol::signed_message;
use rand::Rng;
use shared_crypto::merkle_leaf_hash;
use shared_types::{ClientId, Request, Timestamp};
use std::time::Duration;

fn random_payloads(count: usize) -> Vec<Vec<u8>> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let mut payload = vec![0u8; 32];
            rng.fill(payload.as_mut_slice());
            payload
        })
        .collect()
}

// ============================================================================
// cs-01: Request Queue
// ============================================================================

fn bench_queue_swap(c: &mut Criterion) {
    let mut group = c.benchmark_group("cs-01-request-queue");

    for size in [100usize, 1_000, 10_000] {
        let requests: Vec<Request> = random_payloads(size)
            .into_iter()
            .enumerate()
            .map(|(i, p)| Request::new(ClientId::new("bench"), i as u64, p))
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("enqueue_then_swap", size), &requests, |b, reqs| {
            let queue = RequestQueue::new();
            let mut buffer = ProcessingBuffer::new();
            b.iter(|| {
                for r in reqs {
                    queue.enqueue(r.clone());
                }
                black_box(queue.swap_and_drain(&mut buffer).len())
            })
        });
    }

    group.finish();
}

// ============================================================================
// cs-02: Merkle Batching
// ============================================================================

fn bench_merkle_batching(c: &mut Criterion) {
    let mut group = c.benchmark_group("cs-02-merkle-batching");
    group.measurement_time(Duration::from_secs(10));
    let batcher = MerkleBatcher::new();

    for size in [16usize, 256, 4_096] {
        let payloads = random_payloads(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("build_tree", size), &payloads, |b, p| {
            b.iter(|| black_box(batcher.build_tree(p)))
        });

        let batch = batcher.build_tree(&payloads);
        group.bench_with_input(BenchmarkId::new("check_all_proofs", size), &batch, |b, batch| {
            b.iter(|| {
                let valid = batch
                    .leaves
                    .iter()
                    .zip(&batch.proofs)
                    .filter(|(leaf, proof)| check_proof(&batch.root, leaf, proof))
                    .count();
                black_box(valid)
            })
        });
    }

    group.bench_function("leaf_hash", |b| {
        let payload = [7u8; 64];
        b.iter(|| black_box(merkle_leaf_hash(&payload)))
    });

    group.finish();
}

// ============================================================================
// cs-03: Signature Aggregation
// ============================================================================

fn bench_collective_signature(c: &mut Criterion) {
    let mut group = c.benchmark_group("cs-03-signature-aggregation");
    let message = signed_message(&[3u8; 32], Timestamp(1_700_000_000));

    for signers in [3usize, 15, 63] {
        let nodes: Vec<SchnorrAggregator> = (0..signers)
            .map(|i| SchnorrAggregator::from_seed([i as u8 + 1; 32]))
            .collect();

        group.bench_with_input(BenchmarkId::new("sign_round", signers), &nodes, |b, nodes| {
            b.iter(|| {
                let (commitments, secrets): (Vec<_>, Vec<_>) =
                    nodes.iter().map(|n| n.new_contribution()).unzip();
                let root = &nodes[0];
                let aggregate = root.combine(&commitments[0], &commitments[1..]).unwrap();
                let challenge = root.challenge(&aggregate, &message);
                let responses: Vec<_> = nodes
                    .iter()
                    .zip(secrets)
                    .map(|(n, s)| n.respond(&challenge, s).unwrap())
                    .collect();
                let response = root.combine_responses(&responses[0], &responses[1..]).unwrap();
                black_box(root.assemble(&aggregate, &challenge, &response))
            })
        });
    }

    let signer = SchnorrAggregator::from_seed([1; 32]);
    let (commitment, secret) = signer.new_contribution();
    let challenge = signer.challenge(&commitment, &message);
    let response = signer.respond(&challenge, secret).unwrap();
    let signature = signer.assemble(&commitment, &challenge, &response);
    group.bench_function("verify", |b| b.iter(|| black_box(signature.verify(&message).is_ok())));

    group.finish();
}

criterion_group!(
    benches,
    bench_queue_swap,
    bench_merkle_batching,
    bench_collective_signature
);
criterion_main!(benches);
