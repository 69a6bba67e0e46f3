//! Ec2ClientTrait for mocking
//!
//! This trait abstracts the Ec2Client to enable mocking in unit tests.
//! The concrete Ec2Client implements this trait, and tests can use `MockEc2Client`.

use crate::error::Ec2Error;
use crate::models::Instance;

/// Trait for EC2 API client operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait Ec2ClientTrait: Send + Sync {
    /// Describe the given instances, flattening every reservation in the response.
    ///
    /// An instance ID unknown to EC2 surfaces as an `Ec2Error::Api`.
    async fn describe_instances(&self, instance_ids: &[&str]) -> Result<Vec<Instance>, Ec2Error>;

    /// Set the `SourceDestCheck` attribute of a single network interface.
    async fn modify_source_dest_check(&self, network_interface_id: &str, enabled: bool) -> Result<(), Ec2Error>;
}
