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
#![allow(clippy::redundant_pub_crate)]

//! Agent that executes one unit of coordinator work against a local IPFS node.
//!
//! Layout:
//! - `cli.rs`: argument parsing, settings validation and the `run()` entrypoint
//! - `client.rs`: shared HTTP client and error types
//! - `coordinator.rs`: work request and result reporting
//! - `cycle.rs`: start delay and the single work cycle
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod coordinator;
pub(crate) mod cycle;

pub use cli::run;
