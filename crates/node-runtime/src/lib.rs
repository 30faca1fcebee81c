//! # Node Runtime Library
//!
//! Runs a complete aggregation tree in one process. The binary in `main.rs`
//! is a thin wrapper around [`NodeRuntime`].
//!
//! ## Modules
//!
//! - `container/` - configuration and per-node wiring of every subsystem
//! - `clients` - simulated clients that submit payloads and verify stamps
//! - `runtime` - task spawning, round scheduling and shutdown
//!
//! ```text
//!   clients ──enqueue──→ RequestQueue ──swap──→ RoundNode ──stamp──→ ClientDispatcher ──→ clients
//!                                                  │  ▲
//!                                          frames  ▼  │
//!                                            InMemoryNetwork
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod clients;
pub mod container;
pub mod runtime;

pub use clients::{ClientReport, SimulatedClient};
pub use container::{ConfigError, ContainerError, NodeConfig, NodeHandle, StampNode, TreeContainer};
pub use runtime::{NodeRuntime, RuntimeReport, ShutdownHandle};
