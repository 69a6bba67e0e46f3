//! Main controller implementation.
//!
//! This module contains the `Controller` struct that builds the Kubernetes and
//! EC2 clients, wires them into the reconciler, and runs the Node watcher.

use crate::config::Args;
use crate::error::ControllerError;
use crate::probes::{self, Metrics};
use crate::reconciler::Reconciler;
use crate::state_writer::KubeNodeWriter;
use crate::watcher::Watcher;
use ec2_client::Ec2Client;
use k8s_openapi::api::core::v1::Node;
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for source/destination check management.
pub struct Controller {
    node_watcher: JoinHandle<Result<(), ControllerError>>,
    probe_server: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance and starts the Node watcher.
    pub async fn new(args: &Args) -> Result<Self, ControllerError> {
        info!("Initializing source/destination check controller");

        // Create Kubernetes client
        let kube_client = Client::try_default().await?;

        // Create EC2 client
        let ec2_client = Ec2Client::from_env(args.aws_region.clone()).await;
        let region = ec2_client.ensure_region()?;
        info!("Using AWS region {}", region);

        // Nodes are cluster-scoped
        let node_api: Api<Node> = Api::all(kube_client);

        let reconciler = Arc::new(Reconciler::new(
            Box::new(ec2_client),
            Box::new(KubeNodeWriter::new(node_api.clone())),
        ));

        let metrics = Arc::new(Metrics::new()?);

        let watcher_instance = Watcher::new(
            reconciler,
            metrics.clone(),
            node_api,
            args.watcher_config(),
            args.resync_period(),
        );

        let node_watcher = tokio::spawn(async move {
            watcher_instance.watch_nodes().await
        });

        let probe_server = tokio::spawn(probes::serve(args.probe_addr, metrics));

        Ok(Self {
            node_watcher,
            probe_server,
        })
    }

    /// Runs the controller until the watcher or probe server exits, or Ctrl-C is received.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("Source/destination check controller running");

        tokio::select! {
            result = &mut self.node_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("Node watcher panicked: {}", e)))??;
            }
            result = &mut self.probe_server => {
                self.node_watcher.abort();
                result.map_err(|e| ControllerError::Probe(format!("Probe server panicked: {}", e)))??;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, stopping Node watcher");
                self.node_watcher.abort();
                self.probe_server.abort();
            }
        }

        Ok(())
    }
}
