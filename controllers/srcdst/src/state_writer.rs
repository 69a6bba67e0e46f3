//! Node annotation persistence.
//!
//! The reconciler records completed work by writing an annotation back onto the
//! Node. This trait isolates that single write so the reconciler can be tested
//! without an API server.

use k8s_openapi::api::core::v1::Node;
use kube::api::{Api, PostParams};
use tracing::debug;

/// Writes updated Node objects back to the cluster.
#[async_trait::async_trait]
pub trait NodeStateWriter: Send + Sync {
    /// Replace the Node named `name`, annotations included.
    ///
    /// Must surface conflicts (stale `resourceVersion`) and not-found as errors;
    /// callers do not retry.
    async fn update_node(&self, name: &str, node: &Node) -> Result<(), kube::Error>;
}

/// `NodeStateWriter` backed by the Kubernetes API.
pub struct KubeNodeWriter {
    node_api: Api<Node>,
}

impl KubeNodeWriter {
    pub fn new(node_api: Api<Node>) -> Self {
        Self { node_api }
    }
}

#[async_trait::async_trait]
impl NodeStateWriter for KubeNodeWriter {
    async fn update_node(&self, name: &str, node: &Node) -> Result<(), kube::Error> {
        debug!("Replacing node {} (resourceVersion {:?})", name, node.metadata.resource_version);
        self.node_api
            .replace(name, &PostParams::default(), node)
            .await?;

        Ok(())
    }
}
