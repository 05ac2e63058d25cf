//! Node operations consumed by the work pipeline.

use async_trait::async_trait;

use crate::error::IpfsResult;
use crate::model::{AddedEntry, ContentAddress, LinkListing, PeerDescriptor, RepoStats};

/// Content-addressing primitives offered by the local node.
///
/// Every operation except [`StorageNode::cat`] surfaces transport failures to
/// the caller.
#[async_trait]
pub trait StorageNode: Send + Sync {
    /// Add `bytes` as `name`, pinned and wrapped in a directory.
    ///
    /// Returns the entries in the order the node streamed them.
    async fn store(&self, name: &str, bytes: Vec<u8>) -> IpfsResult<Vec<AddedEntry>>;

    /// List the immediate links under `address`.
    async fn list_links(&self, address: &ContentAddress) -> IpfsResult<LinkListing>;

    /// Total size in bytes of the immediate links under `address`.
    async fn size(&self, address: &ContentAddress) -> IpfsResult<u64> {
        Ok(self.list_links(address).await?.total_size())
    }

    /// Fetch the bytes behind an internal path; `None` on any failure.
    async fn cat(&self, path: &str) -> Option<Vec<u8>>;

    /// Pin `address`, returning the address the node confirmed.
    async fn pin(&self, address: &ContentAddress) -> IpfsResult<ContentAddress>;

    /// Unpin `address`, returning the confirmed address or `address` itself
    /// when the node did not confirm.
    async fn unpin(&self, address: &ContentAddress) -> IpfsResult<ContentAddress>;

    /// Peer identifier of the node.
    async fn identity(&self) -> IpfsResult<String>;

    /// Version string reported by the node.
    async fn agent_version(&self) -> IpfsResult<String>;

    /// Currently connected swarm peers.
    async fn peers(&self) -> IpfsResult<Vec<PeerDescriptor>>;

    /// Repository statistics, including total repo size.
    async fn repo_stats(&self) -> IpfsResult<RepoStats>;
}
