//! EC2 Client
//!
//! A narrow client for the two EC2 control-plane operations the source/destination
//! check controller needs: describing an instance's attached network interfaces
//! and flipping the `SourceDestCheck` attribute on a single interface.
//!
//! # Example
//!
//! ```no_run
//! use ec2_client::{Ec2Client, Ec2ClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Ec2Client::from_env(Some("us-east-1".to_string())).await;
//!
//! let instances = client.describe_instances(&["i-0123abcd"]).await?;
//! for instance in &instances {
//!     for iface in &instance.network_interfaces {
//!         if iface.source_dest_check {
//!             client.modify_source_dest_check(&iface.network_interface_id, false).await?;
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod ec2_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::Ec2Client;
pub use error::Ec2Error;
pub use models::*;
pub use ec2_trait::Ec2ClientTrait;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockEc2Client;
