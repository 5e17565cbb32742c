//! fwdagent entry point.
//!
//! Builds the engine and dispatcher and runs until interrupted. The shipped
//! binary logs outbound commands through a [`TracingSink`]; a real
//! switch-control transport plugs in by feeding the dispatcher and
//! implementing `CommandSink`.

use anyhow::Context;
use clap::Parser;
use fwd_orch_common::TracingSink;
use fwdagent::{ForwardingEngine, FwdDaemon, FwdDaemonConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Topology-aware forwarding engine daemon
#[derive(Parser, Debug)]
#[command(name = "fwdagent")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log filter (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Per-switch event channel capacity
    #[arg(short = 'c', long, default_value = "128")]
    channel_capacity: usize,
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("starting fwdagent");
    info!(channel_capacity = args.channel_capacity, "dispatcher configured");

    let engine = Arc::new(ForwardingEngine::new(Arc::new(TracingSink)));
    let daemon = FwdDaemon::new(
        engine,
        FwdDaemonConfig {
            channel_capacity: args.channel_capacity,
        },
    );

    info!("engine ready, waiting for transport events");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for interrupt")?;
    info!("received interrupt, shutting down");

    daemon.shutdown().await;
    info!("fwdagent shutdown complete");
    Ok(())
}
