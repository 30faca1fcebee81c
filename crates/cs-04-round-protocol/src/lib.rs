//! # Round Protocol Subsystem (cs-04)
//!
//! Drives the five-phase collective stamping round across a static
//! aggregation tree. Each node owns one [`RoundNode`]: it swaps its request
//! queue (cs-01), batches the snapshot into a Merkle tree (cs-02), takes part
//! in the collective signature (cs-03) and hands every request its composed
//! proof through a [`ResponseDispatch`] (cs-05).
//!
//! ## Message Flow
//!
//! ```text
//!              R                      Announcement   R → A, B
//!            /   \                    Commitment     A, B → R   (fan-in)
//!           A     B                   Challenge      R → A, B   (+ inherited path)
//!                                     Response       A, B → R   (fan-in)
//!                                     Broadcast      R → A, B
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement |
//! |----|-----------|-------------|
//! | INVARIANT-1 | One round at a time per node | `&mut self` drivers, mid-round announcements dropped |
//! | INVARIANT-2 | Phases advance strictly in order | `Round::advance` |
//! | INVARIANT-3 | Signed root = combination of every subtree root | `RootCombination` at each level |
//! | INVARIANT-4 | Every dispatched proof reaches the signed root | composed-proof check before any dispatch |
//! | INVARIANT-5 | No wait is unbounded | `phase_timeout` on every fan-in and fan-out wait |
//! | INVARIANT-6 | A failed node releases its neighbours | `Abort` sent to parent and children |
//!
//! ## Hexagonal Architecture
//!
//! - **Domain** (`domain/`): messages, round state, config, errors, stamps
//! - **Ports** (`ports/`): transport, topology, dispatch, ledger and clock
//!   (all outbound; the runtime drives `RoundNode` directly)
//! - **Adapters** (`adapters/`): `shared-bus` transport, `StaticTree`,
//!   `InMemoryLedger`
//! - **Service** (`service/`): `RoundNode` phase handlers and driver loop

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{BusInbox, BusTransport, InMemoryLedger, LedgerProof, StaticTree, TopologyError};
pub use domain::{
    signed_message, ProofCheckLevel, ProtocolMessage, Round, RoundConfig, RoundError, RoundPhase,
    RoundResult, StampResponse, StampVerificationError,
};
pub use ports::{
    DeliveryResult, InboundMessage, PeerInbox, PeerSendError, PeerTransport, ResponseDispatch,
    RoundLedger, RoundRecord, SystemTimeSource, TimeSource, TopologyProvider,
};
pub use service::{NodePorts, NodeSummary, RoundNode, RoundOutcome};
