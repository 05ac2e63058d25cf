//! Verified content downloads.
//!
//! # Design
//! - Gateway URLs are resolved through the node itself; no HTTP round trip.
//! - Other URLs get at most two identical GET attempts. A response whose body
//!   length differs from its declared `Content-Length` counts as a failed attempt.
//! - Exhausted attempts degrade to `None`; callers decide what a missing file means.

use std::sync::Arc;

use percent_encoding::percent_decode_str;
use podnode_ipfs::StorageNode;
use reqwest::header::{CONTENT_LENGTH, HeaderMap};
use reqwest::{Client, Response, StatusCode, Url};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Public gateway resolved internally unless configured otherwise.
pub const DEFAULT_GATEWAY_HOST: &str = "ipfs.io";

const MAX_ATTEMPTS: u32 = 2;

/// Decides whether a URL names content the node can resolve itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResolver {
    hosts: Vec<String>,
}

impl Default for GatewayResolver {
    fn default() -> Self {
        Self::new([DEFAULT_GATEWAY_HOST])
    }
}

impl GatewayResolver {
    /// Treat the given hosts (and their subdomains) as path gateways.
    #[must_use]
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|host| host.as_ref().trim().to_ascii_lowercase())
                .filter(|host| !host.is_empty())
                .collect(),
        }
    }

    /// Internal `<cid>/<path>` for a gateway URL, or `None` when the URL must be
    /// fetched over HTTP.
    #[must_use]
    pub fn internal_path(&self, url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_ascii_lowercase();
        let known = self
            .hosts
            .iter()
            .any(|gateway| host == *gateway || host.ends_with(&format!(".{gateway}")));
        if !known {
            return None;
        }

        let rest = parsed.path().strip_prefix("/ipfs/")?;
        let decoded = percent_decode_str(rest).decode_utf8().ok()?;
        let path = decoded.trim_end_matches('/');
        (!path.is_empty()).then(|| path.to_string())
    }
}

#[derive(Debug, Error)]
enum AttemptFailure {
    #[error("download request failed")]
    Transport(#[source] reqwest::Error),
    #[error("download returned status {0}")]
    Status(StatusCode),
    #[error("download response did not declare a content length")]
    MissingLength,
    #[error("file size mismatch")]
    LengthMismatch { expected: u64, actual: u64 },
}

/// Resolves episode URLs into bytes.
#[derive(Clone)]
pub struct ContentFetcher {
    client: Client,
    node: Arc<dyn StorageNode>,
    gateways: GatewayResolver,
}

impl ContentFetcher {
    /// Fetch over `client`, resolving gateway URLs through `node`.
    #[must_use]
    pub fn new(client: Client, node: Arc<dyn StorageNode>, gateways: GatewayResolver) -> Self {
        Self {
            client,
            node,
            gateways,
        }
    }

    /// Fetch the content behind `url`; `None` when it could not be obtained intact.
    pub async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        if let Some(path) = self.gateways.internal_path(url) {
            debug!(url, path = %path, "resolving gateway url through node");
            return self.node.cat(&path).await;
        }
        self.download(url).await
    }

    async fn download(&self, url: &str) -> Option<Vec<u8>> {
        for attempt in 1..=MAX_ATTEMPTS {
            match self.attempt(url).await {
                Ok(bytes) => return Some(bytes),
                Err(AttemptFailure::LengthMismatch { expected, actual }) => {
                    error!(url, attempt, expected, actual, "file size mismatch");
                }
                Err(failure) => {
                    warn!(url, attempt, error = %failure, "download attempt failed");
                }
            }
        }
        error!(url, "error downloading");
        None
    }

    async fn attempt(&self, url: &str) -> Result<Vec<u8>, AttemptFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(AttemptFailure::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptFailure::Status(status));
        }

        let expected = declared_length(response.headers()).ok_or(AttemptFailure::MissingLength)?;
        let body = read_body(response, expected).await?;
        verify_length(expected, body.len())?;
        Ok(body)
    }
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Collect the body chunk by chunk so a connection that closes early still
/// reports how many bytes arrived.
async fn read_body(mut response: Response, expected: u64) -> Result<Vec<u8>, AttemptFailure> {
    let mut body = Vec::new();
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            Ok(None) => return Ok(body),
            Err(err) => {
                debug!(error = %err, received = body.len(), "download body ended early");
                verify_length(expected, body.len())?;
                return Err(AttemptFailure::Transport(err));
            }
        }
    }
}

fn verify_length(expected: u64, received: usize) -> Result<(), AttemptFailure> {
    let actual = u64::try_from(received).unwrap_or(u64::MAX);
    if actual == expected {
        Ok(())
    } else {
        Err(AttemptFailure::LengthMismatch { expected, actual })
    }
}
