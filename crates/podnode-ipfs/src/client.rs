//! HTTP implementation of [`StorageNode`] against the node's `/api/v0` RPC surface.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{IpfsError, IpfsResult};
use crate::model::{AddedEntry, ContentAddress, LinkListing, PeerDescriptor, RepoStats};
use crate::service::StorageNode;

const API_PREFIX: &str = "api/v0/";

/// Client for a node's RPC API (for example `http://127.0.0.1:5001`).
#[derive(Clone)]
pub struct NodeClient {
    client: Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct PinResponse {
    #[serde(rename = "Pins", default)]
    pins: Vec<ContentAddress>,
}

#[derive(Deserialize)]
struct IdResponse {
    #[serde(rename = "ID")]
    id: String,
}

#[derive(Deserialize)]
struct VersionResponse {
    #[serde(rename = "Version")]
    version: String,
}

#[derive(Deserialize)]
struct SwarmPeers {
    #[serde(rename = "Peers", default)]
    peers: Option<Vec<PeerDescriptor>>,
}

impl NodeClient {
    /// Wrap an existing HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error when `rpc_url` is not an absolute URL.
    pub fn new(client: Client, rpc_url: &str) -> IpfsResult<Self> {
        let mut base_url = Url::parse(rpc_url).map_err(|source| IpfsError::InvalidUrl {
            value: rpc_url.to_string(),
            source,
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, method: &'static str, args: &[(&str, &str)]) -> IpfsResult<Url> {
        let path = format!("{API_PREFIX}{method}");
        let mut url = self
            .base_url
            .join(&path)
            .map_err(|source| IpfsError::InvalidUrl {
                value: format!("{}{path}", self.base_url),
                source,
            })?;
        if !args.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in args {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn post(
        &self,
        method: &'static str,
        args: &[(&str, &str)],
        form: Option<Form>,
    ) -> IpfsResult<Response> {
        let url = self.endpoint(method, args)?;
        let request = self.client.post(url);
        let request = match form {
            Some(form) => request.multipart(form),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|source| IpfsError::Request { method, source })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(IpfsError::Status {
                method,
                status,
                body,
            })
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        args: &[(&str, &str)],
    ) -> IpfsResult<T> {
        let bytes = self
            .post(method, args, None)
            .await?
            .bytes()
            .await
            .map_err(|source| IpfsError::Request { method, source })?;
        serde_json::from_slice(&bytes).map_err(|source| IpfsError::Decode { method, source })
    }
}

/// Decode the newline-delimited JSON emitted by `add`.
fn parse_add_stream(body: &str) -> IpfsResult<Vec<AddedEntry>> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            serde_json::from_str(line).map_err(|source| IpfsError::Decode {
                method: "add",
                source,
            })
        })
        .collect()
}

#[async_trait]
impl StorageNode for NodeClient {
    async fn store(&self, name: &str, bytes: Vec<u8>) -> IpfsResult<Vec<AddedEntry>> {
        let part = Part::bytes(bytes).file_name(name.to_string());
        let form = Form::new().part("file", part);
        let body = self
            .post(
                "add",
                &[("pin", "true"), ("wrap-with-directory", "true")],
                Some(form),
            )
            .await?
            .text()
            .await
            .map_err(|source| IpfsError::Request {
                method: "add",
                source,
            })?;
        parse_add_stream(&body)
    }

    async fn list_links(&self, address: &ContentAddress) -> IpfsResult<LinkListing> {
        self.call("ls", &[("arg", address.as_str())]).await
    }

    async fn cat(&self, path: &str) -> Option<Vec<u8>> {
        let response = match self.post("cat", &[("arg", path)], None).await {
            Ok(response) => response,
            Err(err) => {
                warn!(path, error = %err, "cat request failed");
                return None;
            }
        };
        match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(err) => {
                warn!(path, error = %err, "cat body could not be read");
                None
            }
        }
    }

    async fn pin(&self, address: &ContentAddress) -> IpfsResult<ContentAddress> {
        let response: PinResponse = self.call("pin/add", &[("arg", address.as_str())]).await?;
        response
            .pins
            .into_iter()
            .next()
            .ok_or(IpfsError::MissingField {
                method: "pin/add",
                field: "Pins",
            })
    }

    async fn unpin(&self, address: &ContentAddress) -> IpfsResult<ContentAddress> {
        match self
            .call::<PinResponse>("pin/rm", &[("arg", address.as_str())])
            .await
        {
            Ok(response) => {
                if let Some(confirmed) = response.pins.into_iter().next() {
                    return Ok(confirmed);
                }
                debug!(%address, "unpin response carried no confirmation");
            }
            Err(err @ IpfsError::Request { .. }) => return Err(err),
            Err(err) => {
                debug!(%address, error = %err, "unpin not confirmed");
            }
        }
        Ok(address.clone())
    }

    async fn identity(&self) -> IpfsResult<String> {
        let response: IdResponse = self.call("id", &[]).await?;
        Ok(response.id)
    }

    async fn agent_version(&self) -> IpfsResult<String> {
        let response: VersionResponse = self.call("version", &[]).await?;
        Ok(response.version)
    }

    async fn peers(&self) -> IpfsResult<Vec<PeerDescriptor>> {
        let response: SwarmPeers = self.call("swarm/peers", &[]).await?;
        Ok(response.peers.unwrap_or_default())
    }

    async fn repo_stats(&self) -> IpfsResult<RepoStats> {
        self.call("repo/stat", &[]).await
    }
}
