//! Reconciliation logic for Nodes.
//!
//! For each delivered Node snapshot the reconciler decides whether the node's
//! EC2 network interfaces still need their source/destination check disabled,
//! does so, and records completion as an annotation on the Node.
//!
//! The annotation is the only memory of past work. It is read from the snapshot
//! on every delivery; nothing is cached in-process. Two controller replicas may
//! both act on an unmarked node, which is harmless because disabling the check
//! is idempotent on the EC2 side.

use crate::error::ControllerError;
use crate::interfaces::disable_source_dest_check;
use crate::provider_id::instance_id_from_provider_id;
use crate::state_writer::NodeStateWriter;
use ec2_client::Ec2ClientTrait;
use k8s_openapi::api::core::v1::Node;
use tracing::{debug, error, info, warn};

/// Node annotation marking that the source/destination check has been disabled.
pub const SRC_DST_CHECK_DISABLED_ANNOTATION: &str =
    "kubernetes-ec2-srcdst-controller.ottoyiu.com/srcdst-check-disabled";

/// Value written under `SRC_DST_CHECK_DISABLED_ANNOTATION`. Only presence of the key matters.
pub const SRC_DST_CHECK_DISABLED_VALUE: &str = "true";

/// Kind of delivery that triggered a reconciliation; only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEvent {
    /// Seen in the initial listing
    Added,
    /// Created or changed after the initial listing
    Updated,
    /// Removed from the cluster; the last known snapshot is delivered
    Deleted,
    /// Periodic re-delivery from the watch cache
    Resync,
}

impl NodeEvent {
    /// Lowercase name used as the metrics label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Resync => "resync",
        }
    }
}

/// What a successful reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The node already carried the marker annotation; nothing was called.
    AlreadyMarked,
    /// Remote interfaces were brought in line and the marker was written.
    Marked { interfaces_updated: Vec<String> },
}

/// Reconciles Nodes against EC2.
pub struct Reconciler {
    ec2_client: Box<dyn Ec2ClientTrait + Send + Sync>,
    state_writer: Box<dyn NodeStateWriter + Send + Sync>,
}

impl Reconciler {
    /// Creates a new reconciler instance.
    pub fn new(
        ec2_client: Box<dyn Ec2ClientTrait + Send + Sync>,
        state_writer: Box<dyn NodeStateWriter + Send + Sync>,
    ) -> Self {
        Self {
            ec2_client,
            state_writer,
        }
    }

    /// Handles one delivered Node snapshot. Never fails: every error is
    /// node-scoped, logged here, and retried only by a later delivery.
    pub async fn handle_node(&self, node: &Node, event: NodeEvent) {
        let name = node.metadata.name.as_deref().unwrap_or("<unknown>");
        debug!("Received {:?} of node: {}", event, name);

        match self.reconcile_node(node).await {
            Ok(ReconcileOutcome::Marked { interfaces_updated }) => {
                info!(
                    "Node {} reconciled, {} network interfaces updated",
                    name,
                    interfaces_updated.len()
                );
            }
            Ok(ReconcileOutcome::AlreadyMarked) => {}
            Err(e) if e.is_foreign_node() => {
                debug!("Skipping node {}: {}", name, e);
            }
            Err(e) if event == NodeEvent::Deleted => {
                warn!("Reconciliation of deleted node {} failed (ignored): {}", name, e);
            }
            Err(e) => {
                error!("Node {}: {}", name, e);
            }
        }
    }

    /// Reconciles a single Node snapshot.
    ///
    /// This method:
    /// 1. Returns early if the marker annotation is present
    /// 2. Parses the EC2 instance ID from `spec.providerID`
    /// 3. Disables the source/destination check on every interface that has it enabled
    /// 4. Writes the marker annotation onto a copy of the node
    ///
    /// The snapshot is shared with the watch cache and is never modified.
    /// A failure in step 3 leaves the marker unwritten so the next delivery
    /// starts over; a failure in step 4 leaves EC2 already fixed, so the next
    /// delivery finds nothing to change remotely and only writes the marker.
    pub async fn reconcile_node(&self, node: &Node) -> Result<ReconcileOutcome, ControllerError> {
        let name = node.metadata.name.as_deref()
            .ok_or_else(|| ControllerError::InvalidNode("Node missing name".to_string()))?;

        if Self::is_marked(node) {
            debug!(
                "Skipping node {} because it already has the {} annotation",
                name, SRC_DST_CHECK_DISABLED_ANNOTATION
            );
            return Ok(ReconcileOutcome::AlreadyMarked);
        }

        let provider_id = node.spec.as_ref()
            .and_then(|spec| spec.provider_id.as_deref())
            .unwrap_or_default();
        let instance_id = instance_id_from_provider_id(provider_id)?;

        let interfaces_updated = disable_source_dest_check(self.ec2_client.as_ref(), &instance_id)
            .await
            .map_err(|source| ControllerError::DisableSourceDestCheck {
                instance_id: instance_id.clone(),
                source,
            })?;

        let node_copy = Self::marked_copy(node);
        info!("Marking node {} with {}", name, SRC_DST_CHECK_DISABLED_ANNOTATION);
        self.state_writer.update_node(name, &node_copy).await
            .map_err(|source| ControllerError::MarkNode {
                node: name.to_string(),
                annotation: SRC_DST_CHECK_DISABLED_ANNOTATION,
                source,
            })?;

        Ok(ReconcileOutcome::Marked { interfaces_updated })
    }

    /// True if the marker annotation key is present, whatever its value.
    pub fn is_marked(node: &Node) -> bool {
        node.metadata.annotations.as_ref()
            .is_some_and(|annotations| annotations.contains_key(SRC_DST_CHECK_DISABLED_ANNOTATION))
    }

    /// Copy of `node` carrying the marker annotation alongside all existing annotations.
    pub fn marked_copy(node: &Node) -> Node {
        let mut node_copy = node.clone();
        node_copy.metadata.annotations
            .get_or_insert_with(Default::default)
            .insert(
                SRC_DST_CHECK_DISABLED_ANNOTATION.to_string(),
                SRC_DST_CHECK_DISABLED_VALUE.to_string(),
            );
        node_copy
    }
}
