//! # Collective-Stamp Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/          # Cross-crate round scenarios
//!     ├── harness.rs        # Tree fixtures shared by the scenarios
//!     ├── e2e_round.rs      # Full rounds over 3- and 7-node trees
//!     ├── queue_concurrency.rs
//!     ├── proof_order.rs
//!     ├── dispatch_failures.rs
//!     └── abort_propagation.rs
//!
//! tests/benches/
//! └── stamp_benchmarks.rs   # Batching, proof checks, signing
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p cs-tests
//!
//! # One scenario
//! cargo test -p cs-tests integration::abort_propagation::
//!
//! # Benchmarks
//! cargo bench -p cs-tests
//! ```

#![allow(dead_code)]

pub mod integration;
