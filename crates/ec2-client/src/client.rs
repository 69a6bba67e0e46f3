//! EC2 API client
//!
//! Thin wrapper over `aws_sdk_ec2::Client` exposing the two operations the
//! controller consumes: `DescribeInstances` and `ModifyNetworkInterfaceAttribute`.

use crate::ec2_trait::Ec2ClientTrait;
use crate::error::Ec2Error;
use crate::models::{Instance, NetworkInterface};
use aws_config::BehaviorVersion;
use aws_sdk_ec2::config::Region;
use aws_sdk_ec2::types::AttributeBooleanValue;
use tracing::debug;

/// EC2 API client
#[derive(Debug, Clone)]
pub struct Ec2Client {
    client: aws_sdk_ec2::Client,
}

impl Ec2Client {
    /// Create a client from an already-loaded SDK config
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_ec2::Client::new(sdk_config),
        }
    }

    /// Create a client using the SDK's default credential and region chains.
    ///
    /// # Arguments
    /// * `region` - Explicit region override; `None` falls back to the
    ///   default provider chain (env, profile, IMDS)
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let sdk_config = loader.load().await;
        Self::new(&sdk_config)
    }

    /// Region the client resolved to, if any
    pub fn region(&self) -> Option<String> {
        self.client.config().region().map(ToString::to_string)
    }

    /// Fail fast when no region could be resolved; every EC2 call would fail otherwise.
    pub fn ensure_region(&self) -> Result<String, Ec2Error> {
        self.region().ok_or_else(|| {
            Ec2Error::Configuration(
                "no AWS region configured (set AWS_REGION or --aws-region)".to_string(),
            )
        })
    }
}

#[async_trait::async_trait]
impl Ec2ClientTrait for Ec2Client {
    async fn describe_instances(&self, instance_ids: &[&str]) -> Result<Vec<Instance>, Ec2Error> {
        debug!("Describing EC2 instances {:?}", instance_ids);

        let mut request = self.client.describe_instances();
        for id in instance_ids {
            request = request.instance_ids(*id);
        }
        let response = request
            .send()
            .await
            .map_err(|e| Ec2Error::api("DescribeInstances", e))?;

        let mut instances = Vec::new();
        for reservation in response.reservations() {
            for instance in reservation.instances() {
                let instance_id = instance
                    .instance_id()
                    .ok_or_else(|| Ec2Error::MissingField("InstanceId".to_string()))?
                    .to_string();

                let mut network_interfaces = Vec::new();
                for iface in instance.network_interfaces() {
                    let network_interface_id = iface.network_interface_id().ok_or_else(|| {
                        Ec2Error::MissingField(format!(
                            "NetworkInterfaceId on instance {}",
                            instance_id
                        ))
                    })?;
                    network_interfaces.push(NetworkInterface::new(
                        network_interface_id,
                        iface.source_dest_check().unwrap_or(false),
                    ));
                }

                instances.push(Instance {
                    instance_id,
                    source_dest_check: instance.source_dest_check(),
                    network_interfaces,
                });
            }
        }

        Ok(instances)
    }

    async fn modify_source_dest_check(&self, network_interface_id: &str, enabled: bool) -> Result<(), Ec2Error> {
        debug!(
            "Setting SourceDestCheck={} on network interface {}",
            enabled, network_interface_id
        );

        self.client
            .modify_network_interface_attribute()
            .network_interface_id(network_interface_id)
            .source_dest_check(AttributeBooleanValue::builder().value(enabled).build())
            .send()
            .await
            .map_err(|e| Ec2Error::api("ModifyNetworkInterfaceAttribute", e))?;

        Ok(())
    }
}
