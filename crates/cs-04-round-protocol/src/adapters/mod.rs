//! # Adapters

pub mod bus;
pub mod ledger;
pub mod topology;

pub use bus::{BusInbox, BusTransport};
pub use ledger::{InMemoryLedger, LedgerProof};
pub use topology::{StaticTree, TopologyError};
