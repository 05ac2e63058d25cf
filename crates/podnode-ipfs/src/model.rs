//! Content addresses and the node RPC response shapes the agent relies on.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Opaque, immutable identifier for an object stored on the node (a CID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentAddress(String);

impl ContentAddress {
    /// Wrap a raw CID string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw CID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContentAddress {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl AsRef<str> for ContentAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContentAddress {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ContentAddress {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One line of the node's streaming `add` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddedEntry {
    /// Entry name; the synthetic wrapper directory has an empty name.
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Address assigned to the entry.
    #[serde(rename = "Hash")]
    pub hash: ContentAddress,
}

/// Wrapper and inner-file addresses produced by a wrapped store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddResult {
    /// Address of the first entry reported by the node (the directory wrapper).
    pub wrapper: ContentAddress,
    /// Address of the second entry reported by the node (the stored file).
    pub file: ContentAddress,
}

impl AddResult {
    /// Build a result from the node's entries, taking them positionally.
    ///
    /// Returns `None` when fewer than two entries were reported; the store is
    /// then considered failed.
    #[must_use]
    pub fn from_entries(entries: &[AddedEntry]) -> Option<Self> {
        match entries {
            [wrapper, file, ..] => Some(Self {
                wrapper: wrapper.hash.clone(),
                file: file.hash.clone(),
            }),
            _ => None,
        }
    }

    /// `<wrapper>/<file>` as reported to the coordinator.
    #[must_use]
    pub fn qualified_path(&self) -> String {
        format!("{}/{}", self.wrapper, self.file)
    }
}

/// Response of the `ls` RPC call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LinkListing {
    /// Listed objects, one per requested argument.
    #[serde(rename = "Objects", default)]
    pub objects: Vec<ListedObject>,
}

impl LinkListing {
    /// Sum of the sizes of the immediate links under the first listed object.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.objects
            .first()
            .map_or(0, |object| object.links.iter().map(|link| link.size).sum())
    }

    /// Address of the first link under the first listed object.
    #[must_use]
    pub fn first_link(&self) -> Option<&ContentAddress> {
        self.objects
            .first()
            .and_then(|object| object.links.first())
            .map(|link| &link.hash)
    }
}

/// A single object within an `ls` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListedObject {
    /// Address (or path) that was listed.
    #[serde(rename = "Hash", default)]
    pub hash: String,
    /// Immediate children of the object.
    #[serde(rename = "Links", default)]
    pub links: Vec<ListedLink>,
}

/// A child link of a listed object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListedLink {
    /// Link name within the parent directory.
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Address of the linked object.
    #[serde(rename = "Hash")]
    pub hash: ContentAddress,
    /// Size in bytes of the linked object.
    #[serde(rename = "Size", default)]
    pub size: u64,
}

/// A connected swarm peer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PeerDescriptor {
    /// Multiaddress of the connection.
    #[serde(rename = "Addr", default)]
    pub addr: String,
    /// Peer identifier.
    #[serde(rename = "Peer", default)]
    pub peer: String,
}

/// Response of the `repo/stat` RPC call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RepoStats {
    /// Total bytes used by the repository.
    #[serde(rename = "RepoSize")]
    pub repo_size: u64,
}
