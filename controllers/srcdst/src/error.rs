//! Controller-specific error types.
//!
//! This module defines error types specific to the source/destination check
//! controller that are not covered by upstream library errors.

use thiserror::Error;
use kube::Error as KubeError;
use ec2_client::Ec2Error;

/// Errors that can occur in the source/destination check controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// EC2 API error
    #[error("EC2 error: {0}")]
    Ec2(#[from] Ec2Error),

    /// Describing the instance or modifying one of its interfaces failed
    #[error("Failed to disable source/destination check for EC2 instance {instance_id}: {source}")]
    DisableSourceDestCheck {
        instance_id: String,
        #[source]
        source: Ec2Error,
    },

    /// Writing the marker annotation back to the Node failed
    #[error("Failed to set {annotation} annotation on node {node}: {source}")]
    MarkNode {
        node: String,
        annotation: &'static str,
        #[source]
        source: KubeError,
    },

    /// Node is not managed by AWS; expected for mixed clusters
    #[error("Node is not in AWS EC2, skipping (providerID: {0:?})")]
    ForeignProvider(String),

    /// Provider ID claims AWS but does not carry a usable instance ID
    #[error("Invalid format for AWS instance ID ({0})")]
    InvalidProviderId(String),

    /// Node object violates basic expectations (e.g. no name)
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Metric registration or encoding failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Probe server could not start or stopped
    #[error("Probe server error: {0}")]
    Probe(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}

impl ControllerError {
    /// Foreign nodes are an expected skip, not a failure worth alerting on.
    pub fn is_foreign_node(&self) -> bool {
        matches!(self, Self::ForeignProvider(_))
    }
}
