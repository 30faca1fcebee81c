//! # Request Queue
//!
//! `incoming` lives behind a mutex shared with producers. `processing` is a
//! [`ProcessingBuffer`] owned by the round driver; the type system keeps it
//! out of reach of producers, so exactly one buffer is writable from outside
//! at any instant.

use parking_lot::Mutex;
use shared_types::Request;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Shared half of the double buffer.
pub struct RequestQueue {
    incoming: Mutex<Vec<Request>>,
    enqueued: AtomicU64,
    swaps: AtomicU64,
    drained: AtomicU64,
}

/// Frozen half of the double buffer, consumed by one round at a time.
///
/// Only [`RequestQueue::swap_and_drain`] changes its contents.
#[derive(Debug, Default)]
pub struct ProcessingBuffer {
    requests: Vec<Request>,
    generation: u64,
}

impl ProcessingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests of the current round, in arrival order.
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Number of swaps this buffer has taken part in.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Queue counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Requests accepted since creation.
    pub enqueued: u64,
    /// Swaps performed.
    pub swaps: u64,
    /// Requests handed to rounds.
    pub drained: u64,
    /// Requests currently waiting in `incoming`.
    pub pending: usize,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            incoming: Mutex::new(Vec::with_capacity(capacity)),
            enqueued: AtomicU64::new(0),
            swaps: AtomicU64::new(0),
            drained: AtomicU64::new(0),
        }
    }

    /// Append a request to `incoming`. Safe from any number of producers.
    pub fn enqueue(&self, request: Request) {
        self.incoming.lock().push(request);
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    /// Exchange `incoming` with `processing` and return the new snapshot.
    ///
    /// The previous round's requests are released before the lock is taken,
    /// so the critical section is a pointer swap. After the call `incoming`
    /// is empty (reusing the old snapshot's allocation) and `processing`
    /// holds everything enqueued since the previous swap, in arrival order.
    pub fn swap_and_drain<'a>(&self, processing: &'a mut ProcessingBuffer) -> &'a [Request] {
        processing.requests.clear();
        {
            let mut incoming = self.incoming.lock();
            std::mem::swap(&mut *incoming, &mut processing.requests);
        }
        processing.generation += 1;

        let count = processing.requests.len();
        self.swaps.fetch_add(1, Ordering::Relaxed);
        self.drained.fetch_add(count as u64, Ordering::Relaxed);
        debug!(
            generation = processing.generation,
            count, "Swapped request buffers"
        );

        &processing.requests
    }

    /// Requests waiting for the next swap.
    pub fn pending(&self) -> usize {
        self.incoming.lock().len()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            swaps: self.swaps.load(Ordering::Relaxed),
            drained: self.drained.load(Ordering::Relaxed),
            pending: self.pending(),
        }
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new()
    }
}
