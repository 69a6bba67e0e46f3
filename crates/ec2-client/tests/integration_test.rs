//! Integration tests for the EC2 client
//!
//! These tests require AWS credentials and a real instance.
//! Set AWS_REGION and EC2_TEST_INSTANCE_ID environment variables to run.

use ec2_client::{Ec2Client, Ec2ClientTrait};

#[tokio::test]
#[ignore] // Requires AWS credentials
async fn test_client_resolves_region() {
    let client = Ec2Client::from_env(std::env::var("AWS_REGION").ok()).await;
    assert!(client.ensure_region().is_ok(), "No AWS region resolved");
}

#[tokio::test]
#[ignore] // Requires AWS credentials and a running instance
async fn test_describe_instance_interfaces() {
    let instance_id = std::env::var("EC2_TEST_INSTANCE_ID")
        .expect("EC2_TEST_INSTANCE_ID environment variable must be set");

    let client = Ec2Client::from_env(std::env::var("AWS_REGION").ok()).await;
    let instances = client
        .describe_instances(&[instance_id.as_str()])
        .await
        .expect("Failed to describe instance");

    assert_eq!(instances.len(), 1);
    println!(
        "Instance {} has {} network interfaces",
        instances[0].instance_id,
        instances[0].network_interfaces.len()
    );
}
