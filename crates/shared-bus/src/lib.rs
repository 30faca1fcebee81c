//! # Shared Bus - Frame Network Between Tree Nodes
//!
//! Every node of the aggregation tree owns one [`Mailbox`]. Nodes never call
//! each other directly: a phase handler serialises its message into a byte
//! frame and hands it to the network, which routes it by [`NodeId`].
//!
//! ```text
//! ┌──────────┐  send(from, to, bytes)  ┌──────────────────┐  recv()  ┌──────────┐
//! │  Node A  │ ──────────────────────→ │ InMemoryNetwork  │ ───────→ │  Node B  │
//! └──────────┘                         │ NodeId → Mailbox │          └──────────┘
//!                                      └──────────────────┘
//! ```
//!
//! Delivery is in-order per sender/receiver pair. Retries and timeouts belong
//! to the caller; the network only reports whether a mailbox exists.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod network;

pub use network::{Frame, InMemoryNetwork, Mailbox, NetworkError, NetworkStats};
