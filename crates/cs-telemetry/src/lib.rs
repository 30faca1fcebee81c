//! # Collective-Stamp Telemetry
//!
//! Logging setup shared by the node runtime and test harnesses.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cs_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//!     tracing::info!("node starting");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CS_SERVICE_NAME` | `collective-stamp` | Service name in logs |
//! | `CS_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `CS_JSON_LOGS` | `false` | JSON output (defaults on inside containers) |
//! | `CS_THREAD_IDS` | `true` | Thread ids in console output |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging. Hold the returned guard for the lifetime of the
/// process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    init_logging(&config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that marks telemetry as active. Logs a line on shutdown.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
