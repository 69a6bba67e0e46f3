//! Instance ID extraction from a node's `spec.providerID`.
//!
//! AWS nodes carry a provider ID of the form `aws:///<availability-zone>/<instance-id>`.
//! The triple slash is collapsed to a regular `scheme://authority/path` URI so the
//! zone lands in the authority and the instance ID in the path.

use crate::error::ControllerError;
use axum::http::uri::{Authority, Uri};

/// Provider tag every AWS provider ID starts with.
pub const AWS_PROVIDER_TAG: &str = "aws";

/// Prefix shared by both known instance ID formats (`i-12345678`, `i-12345678abcdef01`).
const INSTANCE_ID_PREFIX: &str = "i-";

/// Extract the EC2 instance ID from a node provider ID.
///
/// # Errors
/// * `ControllerError::ForeignProvider` - the provider ID is not an AWS one
/// * `ControllerError::InvalidProviderId` - it is AWS, but no well-formed instance ID
///   could be extracted
pub fn instance_id_from_provider_id(provider_id: &str) -> Result<String, ControllerError> {
    if !provider_id.starts_with(AWS_PROVIDER_TAG) {
        return Err(ControllerError::ForeignProvider(provider_id.to_string()));
    }

    let normalized = provider_id.replacen(":///", "://", 1);
    let uri: Uri = normalized.parse().map_err(|e| {
        ControllerError::InvalidProviderId(format!("unparseable providerID {}: {}", provider_id, e))
    })?;
    if let Some(authority) = uri.authority() {
        if !has_numeric_port(authority) {
            return Err(ControllerError::InvalidProviderId(format!(
                "invalid port in providerID {}",
                provider_id
            )));
        }
    }

    let path = decode_path(uri.path()).ok_or_else(|| {
        ControllerError::InvalidProviderId(format!("invalid escape in providerID {}", provider_id))
    })?;

    let instance_id = path.trim_matches('/');
    if instance_id.contains('/') || !instance_id.starts_with(INSTANCE_ID_PREFIX) {
        return Err(ControllerError::InvalidProviderId(instance_id.to_string()));
    }

    Ok(instance_id.to_string())
}

/// An authority port, when present, must be empty or all digits.
fn has_numeric_port(authority: &Authority) -> bool {
    let host_port = authority
        .as_str()
        .rsplit_once('@')
        .map_or(authority.as_str(), |(_, host_port)| host_port);
    let port = match host_port.rfind(']') {
        Some(end) => &host_port[end + 1..],
        None => host_port.find(':').map_or("", |idx| &host_port[idx..]),
    };
    port.is_empty()
        || port
            .strip_prefix(':')
            .is_some_and(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Percent-decoded path, or `None` on a truncated or non-hex escape.
fn decode_path(path: &str) -> Option<String> {
    let escapes_valid = path.split('%').skip(1).all(|chunk| {
        chunk.len() >= 2 && chunk.as_bytes()[..2].iter().all(u8::is_ascii_hexdigit)
    });
    if !escapes_valid {
        return None;
    }
    urlencoding::decode(path).ok().map(|decoded| decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_instance_id() {
        let id = instance_id_from_provider_id("aws:///us-east-1a/i-0123abcd").unwrap();
        assert_eq!(id, "i-0123abcd");
    }

    #[test]
    fn test_long_instance_id() {
        let id = instance_id_from_provider_id("aws:///eu-west-2c/i-0123456789abcdef0").unwrap();
        assert_eq!(id, "i-0123456789abcdef0");
    }

    #[test]
    fn test_valid_ids_across_zones() {
        let zones = ["us-east-1a", "ap-southeast-2b", "us-gov-west-1c", "cn-north-1a"];
        let ids = ["i-deadbeef", "i-00000000", "i-0abcdef1234567890", "i-ffffffffffffffff1"];
        for zone in zones {
            for id in ids {
                let provider_id = format!("aws:///{}/{}", zone, id);
                assert_eq!(
                    instance_id_from_provider_id(&provider_id).unwrap(),
                    id,
                    "providerID {}",
                    provider_id
                );
            }
        }
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let id = instance_id_from_provider_id("aws:///us-east-1a/i-0123abcd/").unwrap();
        assert_eq!(id, "i-0123abcd");
    }

    #[test]
    fn test_foreign_providers() {
        for provider_id in [
            "gce:///zone/instance-1",
            "gce://my-project/us-central1-a/instance-1",
            "azure:///subscriptions/x/resourceGroups/y",
            "kind://docker/kind/kind-control-plane",
            "",
            " aws:///us-east-1a/i-0123abcd",
        ] {
            let err = instance_id_from_provider_id(provider_id).unwrap_err();
            assert!(err.is_foreign_node(), "{:?} should be foreign, got {}", provider_id, err);
        }
    }

    #[test]
    fn test_internal_separator_is_malformed() {
        let err = instance_id_from_provider_id("aws:///us-east-1a/extra/i-0123abcd").unwrap_err();
        match err {
            ControllerError::InvalidProviderId(candidate) => {
                assert_eq!(candidate, "extra/i-0123abcd");
            }
            other => panic!("expected InvalidProviderId, got {}", other),
        }
    }

    #[test]
    fn test_missing_instance_prefix_is_malformed() {
        for provider_id in [
            "aws:///us-east-1a/0123abcd",
            "aws:///us-east-1a/",
            "aws:///us-east-1a",
            "aws:///us-east-1a/vol-0123abcd",
            "aws",
            "aws:i-0123abcd",
        ] {
            let err = instance_id_from_provider_id(provider_id).unwrap_err();
            assert!(
                matches!(err, ControllerError::InvalidProviderId(_)),
                "{:?} should be malformed, got {}",
                provider_id,
                err
            );
        }
    }

    #[test]
    fn test_control_characters_are_malformed() {
        let err = instance_id_from_provider_id("aws:///us-east-1a/i-0123\nabcd").unwrap_err();
        assert!(matches!(err, ControllerError::InvalidProviderId(_)));
    }

    #[test]
    fn test_bad_authority_is_malformed() {
        let err = instance_id_from_provider_id("aws:///[bad/i-0123abcd").unwrap_err();
        assert!(matches!(err, ControllerError::InvalidProviderId(_)), "got {}", err);
    }

    #[test]
    fn test_non_numeric_port_is_malformed() {
        let err = instance_id_from_provider_id("aws:///us-east-1a:notaport/i-0123abcd").unwrap_err();
        assert!(matches!(err, ControllerError::InvalidProviderId(_)), "got {}", err);
    }

    #[test]
    fn test_numeric_port_is_accepted() {
        let id = instance_id_from_provider_id("aws:///us-east-1a:443/i-0123abcd").unwrap();
        assert_eq!(id, "i-0123abcd");
    }

    #[test]
    fn test_percent_escapes_are_decoded() {
        let id = instance_id_from_provider_id("aws:///us-east-1a/i-abc%64").unwrap();
        assert_eq!(id, "i-abcd");
    }

    #[test]
    fn test_encoded_separator_is_malformed() {
        let err = instance_id_from_provider_id("aws:///us-east-1a/extra%2Fi-0123abcd").unwrap_err();
        assert!(matches!(err, ControllerError::InvalidProviderId(_)));
    }

    #[test]
    fn test_broken_escape_is_malformed() {
        for provider_id in ["aws:///us-east-1a/i-abc%6", "aws:///us-east-1a/i-abc%zz"] {
            let err = instance_id_from_provider_id(provider_id).unwrap_err();
            assert!(
                matches!(err, ControllerError::InvalidProviderId(_)),
                "{:?} should be malformed, got {}",
                provider_id,
                err
            );
        }
    }

    #[test]
    fn test_query_and_fragment_ignored() {
        let id = instance_id_from_provider_id("aws:///us-east-1a/i-0123abcd?x=1#frag").unwrap();
        assert_eq!(id, "i-0123abcd");
    }

    #[test]
    fn test_deterministic() {
        let a = instance_id_from_provider_id("aws:///us-east-1a/i-0123abcd").unwrap();
        let b = instance_id_from_provider_id("aws:///us-east-1a/i-0123abcd").unwrap();
        assert_eq!(a, b);
    }
}
