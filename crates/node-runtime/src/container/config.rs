//! # Node Configuration
//!
//! Tree shape, client load and round parameters for one runtime.
//!
//! Built from [`NodeConfig::default`] and then overridden from the
//! environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `CS_NODES` | `nodes` |
//! | `CS_BRANCHING` | `branching` |
//! | `CS_ROUNDS` | `rounds` (`0` runs until Ctrl+C) |
//! | `CS_CLIENTS_PER_NODE` | `clients_per_node` |
//! | `CS_REQUESTS_PER_CLIENT` | `requests_per_client` |
//! | `CS_ROUND_INTERVAL_MS` | `round.round_interval` |
//! | `CS_PHASE_TIMEOUT_MS` | `round.phase_timeout` |
//! | `CS_PROOF_CHECK` | `round.proof_check` (`off`, `composed`, `full`) |

use std::str::FromStr;
use std::time::Duration;

use cs_04_round_protocol::{ProofCheckLevel, RoundConfig};
use thiserror::Error;
use tracing::warn;

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Number of tree nodes, root included.
    pub nodes: u32,
    /// Children per interior node.
    pub branching: u32,
    /// Rounds the root leads before shutting down. `None` runs until stopped.
    pub rounds: Option<u64>,
    pub clients_per_node: usize,
    /// Requests each client submits per round.
    pub requests_per_client: usize,
    /// Payload size of simulated requests, in bytes.
    pub payload_len: usize,
    pub round: RoundConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            nodes: 7,
            branching: 2,
            rounds: Some(10),
            clients_per_node: 2,
            requests_per_client: 4,
            payload_len: 32,
            round: RoundConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Defaults overridden by `CS_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Unparseable values are logged and
    /// ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(nodes) = parse_var(&lookup, "CS_NODES") {
            self.nodes = nodes;
        }
        if let Some(branching) = parse_var(&lookup, "CS_BRANCHING") {
            self.branching = branching;
        }
        if let Some(rounds) = parse_var::<u64, _>(&lookup, "CS_ROUNDS") {
            self.rounds = (rounds > 0).then_some(rounds);
        }
        if let Some(clients) = parse_var(&lookup, "CS_CLIENTS_PER_NODE") {
            self.clients_per_node = clients;
        }
        if let Some(requests) = parse_var(&lookup, "CS_REQUESTS_PER_CLIENT") {
            self.requests_per_client = requests;
        }
        if let Some(ms) = parse_var(&lookup, "CS_ROUND_INTERVAL_MS") {
            self.round.round_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var(&lookup, "CS_PHASE_TIMEOUT_MS") {
            self.round.phase_timeout = Duration::from_millis(ms);
        }
        if let Some(level) = parse_var::<ProofCheckLevel, _>(&lookup, "CS_PROOF_CHECK") {
            self.round.proof_check = level;
        }
        self
    }

    /// Reject shapes the runtime cannot build.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes == 0 {
            return Err(ConfigError::NoNodes);
        }
        if self.branching == 0 {
            return Err(ConfigError::ZeroBranching);
        }
        if self.round.phase_timeout.is_zero() {
            return Err(ConfigError::ZeroPhaseTimeout);
        }
        if self.payload_len == 0 && self.clients_per_node > 0 {
            return Err(ConfigError::EmptyPayload);
        }
        if self.requests_per_client == 0 && self.clients_per_node > 0 {
            return Err(ConfigError::EmptyBurst);
        }
        Ok(())
    }
}

fn parse_var<V, F>(lookup: &F, key: &str) -> Option<V>
where
    V: FromStr,
    V::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Ignoring unparseable override");
            None
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("tree must have at least one node")]
    NoNodes,

    #[error("branching factor must be at least 1")]
    ZeroBranching,

    #[error("phase timeout must be non-zero")]
    ZeroPhaseTimeout,

    #[error("simulated payloads must be at least one byte")]
    EmptyPayload,

    #[error("simulated clients must submit at least one request per burst")]
    EmptyBurst,
}
