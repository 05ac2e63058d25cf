//! Node and disk telemetry appended to every report.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use nix::sys::statvfs::statvfs;
use podnode_ipfs::StorageNode;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::report::ReportPayload;

/// Adds repository usage (`used`) and free disk space (`avail`) to a report.
#[derive(Clone)]
pub struct ReportAssembler {
    node: Arc<dyn StorageNode>,
    disk_root: PathBuf,
}

impl ReportAssembler {
    /// Measure free space on the filesystem holding `disk_root`.
    #[must_use]
    pub fn new(node: Arc<dyn StorageNode>, disk_root: impl Into<PathBuf>) -> Self {
        Self {
            node,
            disk_root: disk_root.into(),
        }
    }

    /// Append telemetry to `report`.
    ///
    /// # Errors
    ///
    /// Returns an error when the node cannot report repository statistics or the
    /// filesystem cannot be inspected.
    pub async fn assemble(&self, report: ReportPayload) -> CoreResult<ReportPayload> {
        let stats = self
            .node
            .repo_stats()
            .await
            .map_err(|source| CoreError::node("assembler.repo_stats", source))?;
        let avail = free_space(&self.disk_root)?;
        debug!(used = stats.repo_size, avail, "collected disk telemetry");
        Ok(report.with_telemetry(stats.repo_size, avail))
    }
}

/// Bytes available to unprivileged users on the filesystem holding `path`.
///
/// # Errors
///
/// Returns an error when `statvfs` fails for `path`.
#[allow(clippy::useless_conversion)]
pub fn free_space(path: &Path) -> CoreResult<u64> {
    let stats = statvfs(path).map_err(|source| CoreError::DiskStat {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(u64::from(stats.blocks_available()).saturating_mul(u64::from(stats.fragment_size())))
}
