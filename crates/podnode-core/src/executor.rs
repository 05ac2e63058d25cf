//! Add, pin and unpin stages for a single work item.
//!
//! # Design
//! - Stages run in a fixed order (add, pin, unpin); each consumes the report
//!   snapshot and returns the next one.
//! - Soft failures are recorded in the report and never stop later stages.
//! - Node RPC failures abort the whole cycle.

use std::sync::Arc;

use podnode_ipfs::{AddResult, StorageNode};
use tracing::{debug, error, info, warn};

use crate::error::{CoreError, CoreResult};
use crate::fetch::ContentFetcher;
use crate::report::ReportPayload;
use crate::work::WorkDescriptor;

/// Drives the storage node through the actions of one work item.
#[derive(Clone)]
pub struct WorkExecutor {
    node: Arc<dyn StorageNode>,
    fetcher: ContentFetcher,
}

impl WorkExecutor {
    /// Build an executor over `node`, downloading through `fetcher`.
    #[must_use]
    pub fn new(node: Arc<dyn StorageNode>, fetcher: ContentFetcher) -> Self {
        Self { node, fetcher }
    }

    /// Run every requested action and return the resulting report.
    ///
    /// # Errors
    ///
    /// Returns an error when a node RPC call fails; no report is produced then.
    pub async fn execute(&self, work: &WorkDescriptor) -> CoreResult<ReportPayload> {
        let report = ReportPayload::default();
        let report = self.add_stage(work, report).await?;
        let report = self.pin_stage(work, report).await?;
        self.unpin_stage(work, report).await
    }

    async fn add_stage(
        &self,
        work: &WorkDescriptor,
        report: ReportPayload,
    ) -> CoreResult<ReportPayload> {
        let Some((url, filename)) = work.add_request() else {
            return Ok(report);
        };
        info!(episode = %work.label(), url, "adding episode");

        let Some(bytes) = self
            .fetcher
            .fetch(url)
            .await
            .filter(|bytes| !bytes.is_empty())
        else {
            warn!(url, "download unavailable; skipping add");
            return Ok(report);
        };

        let entries = self
            .node
            .store(filename, bytes)
            .await
            .map_err(|source| CoreError::node("executor.store", source))?;

        let Some(added) = AddResult::from_entries(&entries) else {
            error!(
                filename,
                entries = entries.len(),
                "store returned fewer than two addresses"
            );
            return Ok(report.with_store_error());
        };
        info!(wrapper = %added.wrapper, file = %added.file, "added to node");

        let length = self
            .node
            .size(&added.file)
            .await
            .map_err(|source| CoreError::node("executor.size", source))?;
        Ok(report.with_download(&added, length))
    }

    async fn pin_stage(
        &self,
        work: &WorkDescriptor,
        report: ReportPayload,
    ) -> CoreResult<ReportPayload> {
        let Some(target) = work.pin_request() else {
            return Ok(report);
        };
        info!(address = %target, "pinning");

        let confirmed = self
            .node
            .pin(target)
            .await
            .map_err(|source| CoreError::node("executor.pin", source))?;

        debug!(address = %target, "checking linked addresses");
        let listing = self
            .node
            .list_links(target)
            .await
            .map_err(|source| CoreError::node("executor.list_links", source))?;
        let first_link = listing
            .first_link()
            .cloned()
            .ok_or_else(|| CoreError::EmptyListing {
                address: target.clone(),
            })?;

        let length = self
            .node
            .size(&confirmed)
            .await
            .map_err(|source| CoreError::node("executor.size", source))?;
        Ok(report.with_pin(&first_link, target, length))
    }

    async fn unpin_stage(
        &self,
        work: &WorkDescriptor,
        report: ReportPayload,
    ) -> CoreResult<ReportPayload> {
        let Some(target) = work.unpin_request() else {
            return Ok(report);
        };
        info!(address = %target, "unpinning");

        let confirmed = self
            .node
            .unpin(target)
            .await
            .map_err(|source| CoreError::node("executor.unpin", source))?;
        if confirmed != *target {
            debug!(requested = %target, confirmed = %confirmed, "unpin confirmed a different address");
        }
        Ok(report.with_deleted(target))
    }
}
