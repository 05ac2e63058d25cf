//! # Design
//!
//! - Constant error messages; the RPC method and offending values travel as fields.
//! - Preserve transport and decoding sources without interpolating them into messages.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for node RPC operations.
pub type IpfsResult<T> = Result<T, IpfsError>;

/// Errors raised while talking to the local node.
#[derive(Debug, Error)]
pub enum IpfsError {
    /// The configured RPC URL was not usable.
    #[error("invalid node rpc url")]
    InvalidUrl {
        /// URL that failed to parse or join.
        value: String,
        /// Underlying URL parse error.
        source: url::ParseError,
    },
    /// The request could not be sent or its body could not be read.
    #[error("node rpc request failed")]
    Request {
        /// RPC method that was invoked.
        method: &'static str,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The node answered with a non-success status.
    #[error("node rpc returned an error status")]
    Status {
        /// RPC method that was invoked.
        method: &'static str,
        /// Status code returned by the node.
        status: StatusCode,
        /// Response body, usually the node's error message.
        body: String,
    },
    /// The response body did not match the expected shape.
    #[error("node rpc response could not be decoded")]
    Decode {
        /// RPC method that was invoked.
        method: &'static str,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// A required field was absent from an otherwise valid response.
    #[error("node rpc response missing field")]
    MissingField {
        /// RPC method that was invoked.
        method: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },
}
