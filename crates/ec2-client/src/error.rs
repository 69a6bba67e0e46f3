//! EC2 client errors

use thiserror::Error;

/// Errors that can occur when interacting with the EC2 API
#[derive(Debug, Error)]
pub enum Ec2Error {
    /// EC2 API call failed (transport, throttling, auth, or service error)
    #[error("EC2 {operation} failed: {message}")]
    Api {
        operation: &'static str,
        message: String,
    },

    /// EC2 response was missing a field we rely on
    #[error("EC2 response missing field: {0}")]
    MissingField(String),

    /// Client could not be configured
    #[error("EC2 client configuration error: {0}")]
    Configuration(String),
}

impl Ec2Error {
    /// Build an `Api` error from any SDK error, keeping the full error chain.
    pub(crate) fn api<E>(operation: &'static str, err: E) -> Self
    where
        E: std::error::Error,
    {
        Self::Api {
            operation,
            message: aws_sdk_ec2::error::DisplayErrorContext(err).to_string(),
        }
    }
}
