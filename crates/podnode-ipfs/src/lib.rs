#![forbid(unsafe_code)]
#![deny(
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! Typed RPC client for a local IPFS (Kubo) node.
//!
//! Layout: `model.rs` (content addresses and RPC response shapes), `service.rs`
//! (`StorageNode` trait consumed by the work pipeline), `client.rs` (`NodeClient`,
//! the HTTP implementation), `error.rs` (`IpfsError`).

pub mod client;
pub mod error;
pub mod model;
pub mod service;

pub use client::NodeClient;
pub use error::{IpfsError, IpfsResult};
pub use model::{
    AddResult, AddedEntry, ContentAddress, LinkListing, ListedLink, ListedObject, PeerDescriptor,
    RepoStats,
};
pub use service::StorageNode;
