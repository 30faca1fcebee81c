//! # Collective-Stamp Node Runtime
//!
//! Runs an in-process aggregation tree: the root leads stamping rounds,
//! every node batches its clients' requests, and each client receives a
//! proof plus the tree's collective signature over the global root.
//!
//! ## Startup Sequence
//!
//! 1. Initialise logging (`CS_LOG_LEVEL`, `CS_JSON_LOGS`)
//! 2. Load `NodeConfig` from defaults and `CS_*` overrides
//! 3. Build the tree and spawn every node and client
//! 4. Stop after `CS_ROUNDS` rounds, or on Ctrl+C when `CS_ROUNDS=0`

use anyhow::{Context, Result};
use cs_telemetry::{init_telemetry, TelemetryConfig};
use tracing::{error, info, warn};

use node_runtime::{NodeConfig, NodeRuntime};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())
        .context("Failed to initialise logging")?;

    let config = NodeConfig::from_env();
    info!(
        nodes = config.nodes,
        branching = config.branching,
        rounds = ?config.rounds,
        proof_check = %config.round.proof_check,
        "Loaded configuration"
    );

    let runtime = NodeRuntime::new(config).context("Failed to build aggregation tree")?;
    let shutdown = runtime.shutdown_handle();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received, stopping after the current round");
                shutdown.shutdown();
            }
            Err(e) => warn!(error = %e, "Cannot listen for Ctrl+C"),
        }
    });

    let report = runtime.run().await;

    info!(
        rounds = report.rounds_completed(),
        failed_rounds = report.rounds_failed(),
        submitted = report.clients.submitted,
        verified = report.clients.verified,
        unanswered = report.clients.unanswered,
        delivered = report.dispatch.delivered,
        frames = report.network.frames_sent,
        ledger_rounds = report.ledger_rounds,
        "Run finished"
    );

    if report.clients.rejected > 0 {
        error!(rejected = report.clients.rejected, "Clients rejected stamps");
        anyhow::bail!("{} stamps failed client verification", report.clients.rejected);
    }
    Ok(())
}
