//! Source/Destination Check Controller
//!
//! Keeps every EC2-backed node in the cluster able to forward traffic that is
//! not addressed to itself, as NAT and router workloads require.
//!
//! The controller watches `Node` objects. For each node without the
//! `srcdst-check-disabled` annotation it disables the source/destination check
//! on all of the instance's network interfaces in EC2, then annotates the node.

mod config;
mod controller;
mod error;
mod interfaces;
mod probes;
mod provider_id;
mod reconciler;
mod state_writer;
mod test_utils;
mod watcher;

use clap::Parser;
use config::Args;
use controller::Controller;
use crate::error::ControllerError;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Source/Destination Check Controller");

    let args = Args::parse();
    args.validate()?;

    info!("Configuration:");
    info!("  Resync period: {:?}", args.resync_period());
    info!("  AWS region: {}", args.aws_region.as_deref().unwrap_or("SDK default chain"));
    info!("  Node selector: {}", args.node_label_selector.as_deref().unwrap_or("all nodes"));
    info!("  Probe address: {}", args.probe_addr);

    // Initialize and run controller
    let controller = Controller::new(&args).await?;
    controller.run().await?;

    Ok(())
}
