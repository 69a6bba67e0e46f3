//! EC2 data models
//!
//! Only the slice of `DescribeInstances` output the controller reads.

/// An EC2 instance and its attached network interfaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub instance_id: String,
    /// Instance-level aggregate flag. Reads `false` as soon as ANY attached
    /// interface has the check disabled, so it cannot be used to decide
    /// whether every interface is already done.
    pub source_dest_check: Option<bool>,
    pub network_interfaces: Vec<NetworkInterface>,
}

/// A network interface attached to an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    pub network_interface_id: String,
    pub source_dest_check: bool,
}

impl NetworkInterface {
    pub fn new(network_interface_id: impl Into<String>, source_dest_check: bool) -> Self {
        Self {
            network_interface_id: network_interface_id.into(),
            source_dest_check,
        }
    }
}
