//! # Design
//!
//! - Errors that abort the pipeline for the current invocation.
//! - Soft outcomes (absent downloads, malformed store responses, unconfirmed
//!   unpins) are recorded in the report instead and never reach this type.

use std::path::PathBuf;

use podnode_ipfs::{ContentAddress, IpfsError};
use thiserror::Error;

/// Result alias for pipeline operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that abort a work cycle.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A node RPC call failed.
    #[error("storage node operation failed")]
    Node {
        /// Pipeline operation that issued the call.
        operation: &'static str,
        /// Underlying node error.
        source: IpfsError,
    },
    /// A pinned object had no links to report.
    #[error("pinned object has no links")]
    EmptyListing {
        /// Address that was listed.
        address: ContentAddress,
    },
    /// Free space on the disk root could not be read.
    #[error("failed to read filesystem statistics")]
    DiskStat {
        /// Filesystem root that was inspected.
        path: PathBuf,
        /// Underlying syscall error.
        source: nix::Error,
    },
}

impl CoreError {
    pub(crate) const fn node(operation: &'static str, source: IpfsError) -> Self {
        Self::Node { operation, source }
    }
}
