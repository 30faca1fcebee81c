//! # Round Configuration

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How much proof checking a node does before handing out responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ProofCheckLevel {
    /// Dispatch without checking.
    Off,
    /// Check every composed proof against the broadcast global root, and the
    /// collective signature over it.
    #[default]
    Composed,
    /// `Composed`, plus re-verify every local leaf proof before signing.
    Full,
}

impl ProofCheckLevel {
    pub fn checks_composed(self) -> bool {
        self >= Self::Composed
    }

    pub fn checks_local(self) -> bool {
        self == Self::Full
    }
}

impl fmt::Display for ProofCheckLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Off => "off",
            Self::Composed => "composed",
            Self::Full => "full",
        };
        f.write_str(name)
    }
}

impl FromStr for ProofCheckLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "composed" => Ok(Self::Composed),
            "full" | "debug" => Ok(Self::Full),
            other => Err(format!("unknown proof check level: {other}")),
        }
    }
}

/// Per-node round parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Upper bound on every wait for a parent or for the children's fan-in.
    pub phase_timeout: Duration,
    pub proof_check: ProofCheckLevel,
    /// Pause between rounds (tree root only).
    pub round_interval: Duration,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            phase_timeout: Duration::from_secs(5),
            proof_check: ProofCheckLevel::default(),
            round_interval: Duration::from_secs(1),
        }
    }
}
