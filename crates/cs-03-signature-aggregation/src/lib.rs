//! # Signature Aggregation Subsystem (cs-03)
//!
//! Orchestrates a collective signature across the aggregation tree. The
//! round protocol decides *when* to call each operation; this crate decides
//! *how* partial values combine.
//!
//! ```text
//!  Commitment:  leaf ──V_c,X_c──→ parent: V = V_own + ΣV_child ──→ ... ──→ root
//!  Challenge:   root: c = H(V || X || m) ──→ children ──→ ...
//!  Response:    leaf ──r_c──→ parent: r = r_own + Σr_child ──→ ... ──→ root
//!  Broadcast:   root: (c, r, V, X) ──→ children ──→ ...
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement |
//! |----|-----------|-------------|
//! | INVARIANT-1 | Nonce secrets answer one challenge only | `NonceSecret` is moved into `respond` |
//! | INVARIANT-2 | Combination is order independent | additive group operations |
//! | INVARIANT-3 | A missing partial invalidates the signature | verification equation |

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::SchnorrAggregator;
pub use domain::{AggregationError, Challenge, CollectiveSignature, Commitment, NonceSecret, Response};
pub use ports::SignatureAggregator;
