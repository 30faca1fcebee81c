//! # In-Memory Ledger
//!
//! Keeps the signed output of the most recent rounds so external artifacts
//! can be anchored against a collectively signed root after the fact.
//! Older rounds are evicted LRU.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use cs_02_merkle_batching::MerkleProof;
use lru::LruCache;
use parking_lot::Mutex;
use shared_crypto::PointBytes;
use shared_types::{Hash, RoundNumber};
use tracing::debug;

use crate::domain::signed_message;
use crate::ports::{RoundLedger, RoundRecord};

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(n) => n,
    None => unreachable!(),
};

#[derive(Debug, Default)]
struct LedgerEntry {
    record: Option<RoundRecord>,
    proofs: HashMap<Hash, MerkleProof>,
}

/// Inclusion evidence for one leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerProof {
    pub record: RoundRecord,
    pub proof: MerkleProof,
}

impl LedgerProof {
    /// Check the inclusion path, the signer set and the round signature.
    pub fn verify(&self, leaf: &Hash, tree_key: &PointBytes) -> bool {
        self.proof.verifies(&self.record.global_root, leaf)
            && self.record.signature.aggregate_public_key == *tree_key
            && self
                .record
                .signature
                .verify(&signed_message(&self.record.global_root, self.record.timestamp))
                .is_ok()
    }
}

pub struct InMemoryLedger {
    rounds: Mutex<LruCache<RoundNumber, LedgerEntry>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            rounds: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn round(&self, round: RoundNumber) -> Option<RoundRecord> {
        self.rounds.lock().peek(&round).and_then(|e| e.record.clone())
    }

    /// Most recent signed round.
    pub fn latest(&self) -> Option<RoundRecord> {
        self.rounds
            .lock()
            .iter()
            .filter_map(|(_, e)| e.record.clone())
            .max_by_key(|r| r.round)
    }

    /// Signed root and composed proof for a leaf digest, newest round first.
    pub fn proof_for(&self, leaf: &Hash) -> Option<LedgerProof> {
        let rounds = self.rounds.lock();
        rounds
            .iter()
            .filter_map(|(_, entry)| {
                let record = entry.record.clone()?;
                let proof = entry.proofs.get(leaf)?.clone();
                Some(LedgerProof { record, proof })
            })
            .max_by_key(|p| p.record.round)
    }

    pub fn len(&self) -> usize {
        self.rounds.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.lock().is_empty()
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundLedger for InMemoryLedger {
    fn record_round(&self, record: RoundRecord) {
        let mut rounds = self.rounds.lock();
        let round = record.round;
        let entry = rounds.get_or_insert_mut(round, LedgerEntry::default);
        if entry.record.is_none() {
            debug!(round, "Ledger recorded round");
            entry.record = Some(record);
        }
    }

    fn record_proofs(&self, round: RoundNumber, proofs: Vec<(Hash, MerkleProof)>) {
        let mut rounds = self.rounds.lock();
        let entry = rounds.get_or_insert_mut(round, LedgerEntry::default);
        entry.proofs.extend(proofs);
    }
}
