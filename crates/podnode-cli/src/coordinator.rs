//! Coordinator protocol: request one unit of work, report its outcome.

use anyhow::anyhow;
use podnode_core::{ReportPayload, WorkAssignment, WorkResponse};
use podnode_ipfs::StorageNode;
use reqwest::{Client, Response, Url};

use crate::client::{CliError, CliResult};

/// Client version string announced to the coordinator.
pub(crate) const CLIENT_VERSION: &str = "0.6p";

const REQUEST_PATH: &str = "/Request";
const RESPONSE_PATH: &str = "/Response";

/// Node identity announced with every coordinator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AgentIdentity {
    pub(crate) email: String,
    pub(crate) ipfs_id: String,
    pub(crate) ipfs_ver: String,
    pub(crate) peer_count: usize,
}

impl AgentIdentity {
    /// Query the node for its identity, version and connected peers.
    pub(crate) async fn collect(node: &dyn StorageNode, email: &str) -> CliResult<Self> {
        let ipfs_id = node
            .identity()
            .await
            .map_err(|err| CliError::failure(anyhow!(err).context("failed to query node id")))?;
        let ipfs_ver = node.agent_version().await.map_err(|err| {
            CliError::failure(anyhow!(err).context("failed to query node version"))
        })?;
        let peer_count = node
            .peers()
            .await
            .map_err(|err| CliError::failure(anyhow!(err).context("failed to query node peers")))?
            .len();

        Ok(Self {
            email: email.to_string(),
            ipfs_id,
            ipfs_ver,
            peer_count,
        })
    }

    pub(crate) const fn online(&self) -> bool {
        self.peer_count > 0
    }

    /// Form fields in the order the coordinator expects them.
    pub(crate) fn form_fields(&self) -> Vec<(&'static str, String)> {
        // Booleans are capitalised on the wire.
        let online = if self.online() { "True" } else { "False" };
        vec![
            ("email", self.email.clone()),
            ("version", CLIENT_VERSION.to_string()),
            ("ipfs_id", self.ipfs_id.clone()),
            ("ipfs_ver", self.ipfs_ver.clone()),
            ("online", online.to_string()),
            ("peers", self.peer_count.to_string()),
        ]
    }
}

/// HTTP client for the coordinator service.
#[derive(Clone)]
pub(crate) struct CoordinatorClient {
    client: Client,
    base_url: Url,
}

impl CoordinatorClient {
    pub(crate) const fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> CliResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| CliError::failure(anyhow!("invalid coordinator URL: {err}")))
    }

    /// Ask the coordinator for the next unit of work.
    pub(crate) async fn request_work(&self, identity: &AgentIdentity) -> CliResult<WorkAssignment> {
        let url = self.endpoint(REQUEST_PATH)?;
        let response = self
            .client
            .post(url)
            .form(&identity.form_fields())
            .send()
            .await
            .map_err(|err| CliError::failure(anyhow!("request to {REQUEST_PATH} failed: {err}")))?;

        if !response.status().is_success() {
            return Err(unexpected_status(REQUEST_PATH, response).await);
        }

        let work = response.json::<WorkResponse>().await.map_err(|err| {
            CliError::failure(anyhow!("failed to parse work response: {err}"))
        })?;
        Ok(work.classify())
    }

    /// Send the outcome of a cycle; returns the coordinator's reply text.
    pub(crate) async fn send_report(
        &self,
        identity: &AgentIdentity,
        report: &ReportPayload,
    ) -> CliResult<String> {
        let url = self.endpoint(RESPONSE_PATH)?;
        let mut fields = identity.form_fields();
        fields.extend(report.form_fields());

        let response = self
            .client
            .post(url)
            .form(&fields)
            .send()
            .await
            .map_err(|err| {
                CliError::failure(anyhow!("request to {RESPONSE_PATH} failed: {err}"))
            })?;

        if !response.status().is_success() {
            return Err(unexpected_status(RESPONSE_PATH, response).await);
        }

        response.text().await.map_err(|err| {
            CliError::failure(anyhow!("failed to read {RESPONSE_PATH} reply: {err}"))
        })
    }
}

async fn unexpected_status(path: &str, response: Response) -> CliError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    if body.is_empty() {
        CliError::failure(anyhow!("{path} failed with status {status}"))
    } else {
        CliError::failure(anyhow!("{path} failed with status {status}: {body}"))
    }
}
