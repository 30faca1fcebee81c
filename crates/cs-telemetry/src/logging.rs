//! Structured logging.
//!
//! Every line carries consistent fields so logs from many nodes running in
//! one process can be filtered:
//! - `service`: service name from [`TelemetryConfig`]
//! - `node`: tree node emitting the line
//! - `round`: round number, when inside a round
//! - `phase`: protocol phase, when inside a round

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

use crate::{TelemetryConfig, TelemetryError};

/// Install the global `tracing` subscriber.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("bad log filter {:?}: {e}", config.log_level)))?;

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(config.thread_ids);

    let result = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;

    tracing::debug!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Structured logging configured"
    );
    Ok(())
}

/// Log a round-scoped event with the standard fields.
#[macro_export]
macro_rules! log_round_event {
    ($level:ident, $node:expr, $round:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            node = %$node,
            round = $round,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a client-scoped event with the standard fields.
#[macro_export]
macro_rules! log_client_event {
    ($level:ident, $client:expr, $seq:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            client = %$client,
            seq = $seq,
            $($($field)*,)?
            $msg
        )
    };
}
