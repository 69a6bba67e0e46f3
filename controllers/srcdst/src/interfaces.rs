//! Network interface resolution and source/destination check mutation.

use ec2_client::{Ec2ClientTrait, Ec2Error};
use tracing::{debug, info};

/// IDs of the instance's network interfaces whose source/destination check is still enabled.
///
/// Every attached interface is inspected individually: the instance-level
/// `SourceDestCheck` reads `false` as soon as any single interface has it
/// disabled, so it says nothing about the others.
pub async fn interfaces_needing_update(
    ec2_client: &dyn Ec2ClientTrait,
    instance_id: &str,
) -> Result<Vec<String>, Ec2Error> {
    let instances = ec2_client.describe_instances(&[instance_id]).await?;

    let ifaces: Vec<String> = instances
        .iter()
        .flat_map(|instance| instance.network_interfaces.iter())
        .filter(|iface| iface.source_dest_check)
        .map(|iface| iface.network_interface_id.clone())
        .collect();

    debug!(
        "Instance {} has {} network interfaces with source/destination check enabled",
        instance_id,
        ifaces.len()
    );
    Ok(ifaces)
}

/// Disable the source/destination check on every interface of the instance that still has it.
///
/// Returns the interfaces that were changed; an empty list means there was nothing to do.
/// The first failing modify call aborts the pass. Interfaces already changed stay changed.
pub async fn disable_source_dest_check(
    ec2_client: &dyn Ec2ClientTrait,
    instance_id: &str,
) -> Result<Vec<String>, Ec2Error> {
    let ifaces = interfaces_needing_update(ec2_client, instance_id).await?;

    for iface in &ifaces {
        ec2_client.modify_source_dest_check(iface, false).await?;
        info!("Disabled source/destination check on {} (instance {})", iface, instance_id);
    }

    Ok(ifaces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec2_client::{MockEc2Client, NetworkInterface};
    use ec2_client::mock::MockCall;

    fn mixed_instance() -> MockEc2Client {
        let mock = MockEc2Client::new();
        mock.add_instance(
            "i-0123abcd",
            vec![
                NetworkInterface::new("eni-a", true),
                NetworkInterface::new("eni-b", false),
                NetworkInterface::new("eni-c", true),
            ],
        );
        mock
    }

    #[tokio::test]
    async fn test_only_enabled_interfaces_are_selected() {
        let mock = mixed_instance();
        let ifaces = interfaces_needing_update(&mock, "i-0123abcd").await.unwrap();
        assert_eq!(ifaces, vec!["eni-a".to_string(), "eni-c".to_string()]);
    }

    #[tokio::test]
    async fn test_aggregate_flag_is_not_trusted() {
        // Aggregate reads false because eni-b is disabled, yet eni-a and eni-c still need work
        let mock = mixed_instance();
        let instances = mock.describe_instances(&["i-0123abcd"]).await.unwrap();
        assert_eq!(instances[0].source_dest_check, Some(false));

        let changed = disable_source_dest_check(&mock, "i-0123abcd").await.unwrap();
        assert_eq!(changed.len(), 2);
    }

    #[tokio::test]
    async fn test_disable_issues_one_call_per_enabled_interface() {
        let mock = mixed_instance();
        let changed = disable_source_dest_check(&mock, "i-0123abcd").await.unwrap();

        assert_eq!(changed, vec!["eni-a".to_string(), "eni-c".to_string()]);
        assert_eq!(
            mock.calls(),
            vec![
                MockCall::DescribeInstances(vec!["i-0123abcd".to_string()]),
                MockCall::ModifySourceDestCheck { network_interface_id: "eni-a".to_string(), enabled: false },
                MockCall::ModifySourceDestCheck { network_interface_id: "eni-c".to_string(), enabled: false },
            ]
        );
        assert_eq!(mock.source_dest_check("eni-a"), Some(false));
        assert_eq!(mock.source_dest_check("eni-b"), Some(false));
        assert_eq!(mock.source_dest_check("eni-c"), Some(false));
    }

    #[tokio::test]
    async fn test_nothing_to_do_is_empty_not_error() {
        let mock = MockEc2Client::new();
        mock.add_instance(
            "i-0123abcd",
            vec![NetworkInterface::new("eni-a", false), NetworkInterface::new("eni-b", false)],
        );

        let changed = disable_source_dest_check(&mock, "i-0123abcd").await.unwrap();
        assert!(changed.is_empty());
        assert!(mock.modified_interfaces().is_empty());
    }

    #[tokio::test]
    async fn test_describe_failure_is_error() {
        let mock = mixed_instance();
        mock.fail_describe(true);

        let result = disable_source_dest_check(&mock, "i-0123abcd").await;
        assert!(matches!(result, Err(Ec2Error::Api { operation: "DescribeInstances", .. })));
        assert!(mock.modified_interfaces().is_empty());
    }

    #[tokio::test]
    async fn test_modify_failure_aborts_remaining() {
        let mock = MockEc2Client::new();
        mock.add_instance(
            "i-0123abcd",
            vec![
                NetworkInterface::new("eni-a", true),
                NetworkInterface::new("eni-b", true),
                NetworkInterface::new("eni-c", true),
            ],
        );
        mock.fail_modify_for("eni-b");

        let result = disable_source_dest_check(&mock, "i-0123abcd").await;
        assert!(result.is_err());
        // eni-c never attempted, eni-a not rolled back
        assert_eq!(mock.modified_interfaces(), vec!["eni-a".to_string(), "eni-b".to_string()]);
        assert_eq!(mock.source_dest_check("eni-a"), Some(false));
        assert_eq!(mock.source_dest_check("eni-c"), Some(true));
    }
}
