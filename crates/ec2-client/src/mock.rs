//! Mock Ec2Client for unit testing
//!
//! Stores instances in memory, applies `modify_source_dest_check` to that
//! store, and records every call so tests can assert on exactly which
//! remote requests were issued.

use crate::ec2_trait::Ec2ClientTrait;
use crate::error::Ec2Error;
use crate::models::{Instance, NetworkInterface};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// A call recorded by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    DescribeInstances(Vec<String>),
    ModifySourceDestCheck { network_interface_id: String, enabled: bool },
}

/// Mock Ec2Client for testing
#[derive(Clone, Default)]
pub struct MockEc2Client {
    pub(crate) instances: Arc<Mutex<HashMap<String, Instance>>>,
    pub(crate) calls: Arc<Mutex<Vec<MockCall>>>,
    pub(crate) fail_describe: Arc<Mutex<bool>>,
    pub(crate) failing_interfaces: Arc<Mutex<HashSet<String>>>,
}

impl MockEc2Client {
    /// Create a new, empty mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an instance with the given interfaces (for test setup)
    pub fn add_instance(&self, instance_id: &str, interfaces: Vec<NetworkInterface>) {
        let aggregate = interfaces.iter().all(|iface| iface.source_dest_check);
        self.instances.lock().unwrap().insert(
            instance_id.to_string(),
            Instance {
                instance_id: instance_id.to_string(),
                source_dest_check: Some(aggregate),
                network_interfaces: interfaces,
            },
        );
    }

    /// Make every subsequent `describe_instances` call fail
    pub fn fail_describe(&self, fail: bool) {
        *self.fail_describe.lock().unwrap() = fail;
    }

    /// Make `modify_source_dest_check` fail for one interface
    pub fn fail_modify_for(&self, network_interface_id: &str) {
        self.failing_interfaces
            .lock()
            .unwrap()
            .insert(network_interface_id.to_string());
    }

    /// Stop failing `modify_source_dest_check` for one interface
    pub fn clear_modify_failure(&self, network_interface_id: &str) {
        self.failing_interfaces.lock().unwrap().remove(network_interface_id);
    }

    /// All calls issued so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Interface IDs passed to `modify_source_dest_check`, in order
    pub fn modified_interfaces(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::ModifySourceDestCheck { network_interface_id, .. } => {
                    Some(network_interface_id)
                }
                MockCall::DescribeInstances(_) => None,
            })
            .collect()
    }

    /// Forget recorded calls (keeps instances and failure settings)
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Current check flag of an interface in the mock store
    pub fn source_dest_check(&self, network_interface_id: &str) -> Option<bool> {
        self.instances
            .lock()
            .unwrap()
            .values()
            .flat_map(|instance| instance.network_interfaces.iter())
            .find(|iface| iface.network_interface_id == network_interface_id)
            .map(|iface| iface.source_dest_check)
    }
}

#[async_trait::async_trait]
impl Ec2ClientTrait for MockEc2Client {
    async fn describe_instances(&self, instance_ids: &[&str]) -> Result<Vec<Instance>, Ec2Error> {
        self.calls.lock().unwrap().push(MockCall::DescribeInstances(
            instance_ids.iter().map(|id| id.to_string()).collect(),
        ));

        if *self.fail_describe.lock().unwrap() {
            return Err(Ec2Error::Api {
                operation: "DescribeInstances",
                message: "mock describe failure".to_string(),
            });
        }

        let instances = self.instances.lock().unwrap();
        let mut found = Vec::new();
        for id in instance_ids {
            match instances.get(*id) {
                Some(instance) => found.push(instance.clone()),
                None => {
                    return Err(Ec2Error::Api {
                        operation: "DescribeInstances",
                        message: format!("InvalidInstanceID.NotFound: {}", id),
                    });
                }
            }
        }
        Ok(found)
    }

    async fn modify_source_dest_check(&self, network_interface_id: &str, enabled: bool) -> Result<(), Ec2Error> {
        self.calls.lock().unwrap().push(MockCall::ModifySourceDestCheck {
            network_interface_id: network_interface_id.to_string(),
            enabled,
        });

        if self.failing_interfaces.lock().unwrap().contains(network_interface_id) {
            return Err(Ec2Error::Api {
                operation: "ModifyNetworkInterfaceAttribute",
                message: format!("mock modify failure for {}", network_interface_id),
            });
        }

        let mut instances = self.instances.lock().unwrap();
        for instance in instances.values_mut() {
            if let Some(pos) = instance
                .network_interfaces
                .iter()
                .position(|iface| iface.network_interface_id == network_interface_id)
            {
                instance.network_interfaces[pos].source_dest_check = enabled;
                instance.source_dest_check = Some(
                    instance.network_interfaces.iter().all(|i| i.source_dest_check),
                );
                return Ok(());
            }
        }

        Err(Ec2Error::Api {
            operation: "ModifyNetworkInterfaceAttribute",
            message: format!("InvalidNetworkInterfaceID.NotFound: {}", network_interface_id),
        })
    }
}
