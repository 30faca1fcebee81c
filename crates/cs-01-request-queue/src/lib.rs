//! # Request Queue Subsystem (cs-01)
//!
//! Concurrency-safe inbox for client requests. Any number of producers call
//! [`RequestQueue::enqueue`] while the round driver, once per round, exchanges
//! the inbox for its frozen processing snapshot.
//!
//! ## Double Buffer
//!
//! ```text
//!   producers ──enqueue──→ [ incoming ]      (shared, behind one lock)
//!                               ⇅  swap_and_drain()   O(1) under the lock
//!   round driver ←──────── [ processing ]    (owned by the driver, &mut only)
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement |
//! |----|-----------|-------------|
//! | INVARIANT-1 | A request is visible in exactly one buffer | `swap_and_drain` exchanges under the lock |
//! | INVARIANT-2 | Only `incoming` is writable by producers | `ProcessingBuffer` is owned, never shared |
//! | INVARIANT-3 | Arrival order is kept within a round | `Vec` append order |
//!
//! Enqueue never fails and never waits on round activity beyond the swap's
//! constant-time critical section. The buffer is unbounded.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;

pub use domain::{ProcessingBuffer, QueueStats, RequestQueue};
pub use ports::RequestIntake;
