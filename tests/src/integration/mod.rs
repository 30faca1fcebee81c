//! # Integration Scenarios
//!
//! Every scenario runs real `RoundNode`s over the in-memory bus; nothing
//! below the round protocol is mocked.

#[cfg(test)]
mod harness;

pub mod abort_propagation;
pub mod dispatch_failures;
pub mod e2e_round;
pub mod proof_order;
pub mod queue_concurrency;
