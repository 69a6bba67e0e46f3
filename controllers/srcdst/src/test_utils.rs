//! Test utilities for unit testing the reconciler
//!
//! This module provides Node fixtures and an in-memory `NodeStateWriter`.

#[cfg(test)]
use crate::reconciler::Reconciler;
#[cfg(test)]
use crate::state_writer::NodeStateWriter;
#[cfg(test)]
use ec2_client::MockEc2Client;
#[cfg(test)]
use k8s_openapi::api::core::v1::{Node, NodeSpec};
#[cfg(test)]
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
#[cfg(test)]
use std::collections::BTreeMap;
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// Helper to create a test Node
#[cfg(test)]
pub fn create_test_node(
    name: &str,
    provider_id: Option<&str>,
    annotations: Option<&[(&str, &str)]>,
) -> Node {
    Node {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            resource_version: Some("1000".to_string()),
            annotations: annotations.map(|pairs| {
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<_, _>>()
            }),
            ..Default::default()
        },
        spec: Some(NodeSpec {
            provider_id: provider_id.map(|s| s.to_string()),
            ..Default::default()
        }),
        status: None,
    }
}

/// Records every Node written; can be switched to fail.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct RecordingStateWriter {
    updates: Arc<Mutex<Vec<(String, Node)>>>,
    fail: Arc<Mutex<bool>>,
}

#[cfg(test)]
impl RecordingStateWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent updates fail (or succeed again)
    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// Successfully written nodes, in order
    pub fn updates(&self) -> Vec<(String, Node)> {
        self.updates.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl NodeStateWriter for RecordingStateWriter {
    async fn update_node(&self, name: &str, node: &Node) -> Result<(), kube::Error> {
        if *self.fail.lock().unwrap() {
            return Err(kube::Error::Service("mock conflict: the object has been modified".into()));
        }
        self.updates.lock().unwrap().push((name.to_string(), node.clone()));
        Ok(())
    }
}

/// Helper to create a reconciler wired to the given mocks
#[cfg(test)]
pub fn create_test_reconciler(ec2: &MockEc2Client, writer: &RecordingStateWriter) -> Reconciler {
    Reconciler::new(Box::new(ec2.clone()), Box::new(writer.clone()))
}
