//! Controller configuration from flags and environment variables.

use crate::error::ControllerError;
use clap::Parser;
use kube_runtime::watcher;
use std::net::SocketAddr;
use std::time::Duration;

/// Disables EC2 source/destination checks on every node in the cluster.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Seconds between full re-deliveries of every cached Node
    #[arg(long, env = "RESYNC_PERIOD_SECS", default_value_t = 60)]
    pub resync_period_secs: u64,

    /// AWS region for EC2 calls (defaults to the SDK region provider chain)
    #[arg(long, env = "AWS_REGION")]
    pub aws_region: Option<String>,

    /// Only watch Nodes matching this label selector
    #[arg(long, env = "NODE_LABEL_SELECTOR")]
    pub node_label_selector: Option<String>,

    /// Listen address for /healthz, /readyz and /metrics
    #[arg(long, env = "PROBE_ADDR", default_value = "0.0.0.0:8080")]
    pub probe_addr: SocketAddr,
}

impl Args {
    /// Checks values clap cannot express on its own.
    pub fn validate(&self) -> Result<(), ControllerError> {
        if self.resync_period_secs == 0 {
            return Err(ControllerError::InvalidConfig(
                "resync period must be at least 1 second".to_string(),
            ));
        }
        if self.node_label_selector.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(ControllerError::InvalidConfig(
                "node label selector must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn resync_period(&self) -> Duration {
        Duration::from_secs(self.resync_period_secs)
    }

    /// Watch configuration for the Node watcher.
    pub fn watcher_config(&self) -> watcher::Config {
        match self.node_label_selector.as_deref() {
            Some(selector) => watcher::Config::default().labels(selector),
            None => watcher::Config::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["srcdst-controller"]).unwrap();
        assert_eq!(args.resync_period(), Duration::from_secs(60));
        assert!(args.node_label_selector.is_none());
        assert_eq!(args.probe_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_flags_override() {
        let args = Args::try_parse_from([
            "srcdst-controller",
            "--resync-period-secs",
            "15",
            "--aws-region",
            "eu-west-1",
            "--node-label-selector",
            "node-role.kubernetes.io/router=true",
            "--probe-addr",
            "127.0.0.1:9090",
        ])
        .unwrap();
        assert_eq!(args.resync_period(), Duration::from_secs(15));
        assert_eq!(args.aws_region.as_deref(), Some("eu-west-1"));
        assert_eq!(
            args.watcher_config().label_selector.as_deref(),
            Some("node-role.kubernetes.io/router=true")
        );
        assert_eq!(args.probe_addr.port(), 9090);
    }

    #[test]
    fn test_zero_resync_rejected() {
        let args = Args::try_parse_from(["srcdst-controller", "--resync-period-secs", "0"]).unwrap();
        assert!(matches!(args.validate(), Err(ControllerError::InvalidConfig(_))));
    }

    #[test]
    fn test_blank_selector_rejected() {
        let args = Args::try_parse_from(["srcdst-controller", "--node-label-selector", " "]).unwrap();
        assert!(matches!(args.validate(), Err(ControllerError::InvalidConfig(_))));
    }
}
