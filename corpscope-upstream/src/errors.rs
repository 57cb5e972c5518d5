//! Error types for upstream API access.

use thiserror::Error;

/// Errors that can occur while talking to an upstream service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The request could not be completed after exhausting retries.
    #[error("Request failed: {reason}")]
    RequestFailed {
        /// The reason for the failure
        reason: String,
    },

    /// The upstream answered with a non-success status.
    #[error("Upstream returned HTTP {status}: {body}")]
    UpstreamStatus {
        /// HTTP status code of the response
        status: u16,
        /// Response body text, forwarded verbatim
        body: String,
    },

    /// The upstream payload could not be decoded.
    #[error("Malformed upstream payload: {reason}")]
    MalformedPayload {
        /// The reason for the decode failure
        reason: String,
    },

    /// The client is disabled because its credentials are not configured.
    #[error("{service} API key not configured")]
    NotConfigured {
        /// Name of the credential-gated service
        service: &'static str,
    },
}
