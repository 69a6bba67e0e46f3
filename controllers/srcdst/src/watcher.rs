//! Kubernetes Node watcher.
//!
//! Feeds every Node snapshot to the reconciler: the initial listing and each
//! add/update/delete from the watch stream, plus a full re-delivery of the
//! cached Nodes every resync period. The resync is the only retry path for
//! nodes whose reconciliation failed.

use crate::error::ControllerError;
use crate::probes::Metrics;
use crate::reconciler::{NodeEvent, Reconciler};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Node;
use kube::Api;
use kube_runtime::{reflector, watcher, WatchStreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Watches Nodes and hands each snapshot to the reconciler.
pub struct Watcher {
    reconciler: Arc<Reconciler>,
    metrics: Arc<Metrics>,
    node_api: Api<Node>,
    watcher_config: watcher::Config,
    resync_period: Duration,
}

impl Watcher {
    /// Creates a new watcher instance.
    pub fn new(
        reconciler: Arc<Reconciler>,
        metrics: Arc<Metrics>,
        node_api: Api<Node>,
        watcher_config: watcher::Config,
        resync_period: Duration,
    ) -> Self {
        Self {
            reconciler,
            metrics,
            node_api,
            watcher_config,
            resync_period,
        }
    }

    /// Starts watching Node resources. Only returns if the watch stream ends.
    pub async fn watch_nodes(&self) -> Result<(), ControllerError> {
        info!("Starting Node watcher (resync every {:?})", self.resync_period);

        let (store, writer) = reflector::store();
        let mut stream = Box::pin(
            watcher(self.node_api.clone(), self.watcher_config.clone())
                .default_backoff()
                .reflect(writer),
        );

        let mut resync = interval_at(Instant::now() + self.resync_period, self.resync_period);
        resync.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                next = stream.next() => match next {
                    Some(Ok(event)) => dispatch_event(&self.reconciler, &self.metrics, event).await,
                    // default_backoff() already delays the next attempt
                    Some(Err(e)) => {
                        self.metrics.record_watch_error();
                        warn!("Node watch error, retrying: {}", e);
                    }
                    None => {
                        return Err(ControllerError::Watch("Node watch stream ended".to_string()));
                    }
                },
                _ = resync.tick() => {
                    resync_nodes(&self.reconciler, &self.metrics, store.state()).await;
                }
            }
        }
    }
}

/// Maps one watch event onto the reconciler. Adds, updates and deletes all reconcile.
pub async fn dispatch_event(reconciler: &Reconciler, metrics: &Metrics, event: watcher::Event<Node>) {
    let (node, node_event) = match event {
        watcher::Event::Apply(node) => (node, NodeEvent::Updated),
        watcher::Event::Delete(node) => {
            let name = node.metadata.name.as_deref().unwrap_or("<unknown>");
            info!("Node deleted: {}", name);
            (node, NodeEvent::Deleted)
        }
        watcher::Event::InitApply(node) => (node, NodeEvent::Added),
        watcher::Event::Init => {
            info!("Node watcher initialized, listing nodes");
            return;
        }
        watcher::Event::InitDone => {
            info!("Node watcher initial listing complete");
            metrics.set_ready();
            return;
        }
    };

    metrics.record_delivery(node_event);
    reconciler.handle_node(&node, node_event).await;
}

/// Re-delivers every cached Node.
pub async fn resync_nodes(reconciler: &Reconciler, metrics: &Metrics, nodes: Vec<Arc<Node>>) {
    debug!("Resyncing {} nodes", nodes.len());
    for node in nodes {
        metrics.record_delivery(NodeEvent::Resync);
        reconciler.handle_node(&node, NodeEvent::Resync).await;
    }
    metrics.record_resync();
}
