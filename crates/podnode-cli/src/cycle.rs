//! One polling cycle: identify, request work, execute, report.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use podnode_core::{ContentFetcher, ReportAssembler, ReportPayload, WorkAssignment, WorkExecutor};
use podnode_ipfs::{NodeClient, StorageNode};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::cli::AgentSettings;
use crate::client::{CliError, CliResult, build_http_client};
use crate::coordinator::{AgentIdentity, CoordinatorClient};

/// Random pause before contacting the coordinator; `None` in debug mode or
/// when the maximum is zero.
pub(crate) fn start_delay(debug: bool, max_secs: u64) -> Option<Duration> {
    if debug || max_secs == 0 {
        return None;
    }
    let secs = rand::rng().random_range(1..=max_secs);
    Some(Duration::from_secs(secs))
}

pub(crate) async fn wait_before_work(delay: Option<Duration>) {
    if let Some(delay) = delay {
        info!(seconds = delay.as_secs(), "sleeping before requesting work");
        tokio::time::sleep(delay).await;
    }
}

/// Collaborators for a single cycle, sharing one HTTP client.
pub(crate) struct AgentDependencies {
    pub(crate) email: String,
    pub(crate) debug: bool,
    pub(crate) node: Arc<dyn StorageNode>,
    pub(crate) coordinator: CoordinatorClient,
    pub(crate) executor: WorkExecutor,
    pub(crate) assembler: ReportAssembler,
}

impl AgentDependencies {
    pub(crate) fn from_settings(settings: &AgentSettings) -> CliResult<Self> {
        let client = build_http_client(settings.timeout)?;
        let node: Arc<dyn StorageNode> = Arc::new(
            NodeClient::new(client.clone(), settings.rpc_url.as_str())
                .map_err(|err| CliError::failure(anyhow!(err).context("invalid node RPC URL")))?,
        );
        let fetcher =
            ContentFetcher::new(client.clone(), Arc::clone(&node), settings.gateways.clone());

        Ok(Self {
            email: settings.email.clone(),
            debug: settings.debug,
            coordinator: CoordinatorClient::new(client, settings.coordinator_url.clone()),
            executor: WorkExecutor::new(Arc::clone(&node), fetcher),
            assembler: ReportAssembler::new(Arc::clone(&node), settings.disk_root.clone()),
            node,
        })
    }
}

/// How a cycle ended.
#[derive(Debug)]
pub(crate) enum CycleOutcome {
    RequestError,
    NoWork,
    Reported {
        report: ReportPayload,
        response: String,
    },
}

/// Run exactly one request/execute/report cycle.
pub(crate) async fn run_cycle(deps: &AgentDependencies) -> CliResult<CycleOutcome> {
    let identity = AgentIdentity::collect(deps.node.as_ref(), &deps.email).await?;
    debug!(
        ipfs_id = %identity.ipfs_id,
        ipfs_ver = %identity.ipfs_ver,
        peers = identity.peer_count,
        "node identity"
    );

    let work = match deps.coordinator.request_work(&identity).await? {
        WorkAssignment::RequestError => {
            warn!("coordinator reported a request error");
            return Ok(CycleOutcome::RequestError);
        }
        WorkAssignment::NoWork { message } => {
            info!(%message, "no work");
            return Ok(CycleOutcome::NoWork);
        }
        WorkAssignment::Work(work) => work,
    };
    if deps.debug {
        debug!(?work, "work assignment");
    }

    let report = deps
        .executor
        .execute(&work)
        .await
        .map_err(|err| CliError::failure(anyhow!(err).context("work execution failed")))?;
    let report = deps
        .assembler
        .assemble(report)
        .await
        .map_err(|err| CliError::failure(anyhow!(err).context("telemetry collection failed")))?;
    if deps.debug {
        debug!(?report, "report payload");
    }

    let response = deps.coordinator.send_report(&identity, &report).await?;
    if deps.debug {
        debug!(%response, "coordinator response");
    }

    Ok(CycleOutcome::Reported { report, response })
}
