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

//! Work-item execution pipeline for the podnode agent.
//!
//! Layout: `work.rs` (coordinator work classification and descriptors),
//! `fetch.rs` (verified downloads and gateway resolution), `executor.rs`
//! (add/pin/unpin stages), `report.rs` (report snapshots), `assembler.rs`
//! (node and disk telemetry), `error.rs` (`CoreError`).

pub mod assembler;
pub mod error;
pub mod executor;
pub mod fetch;
pub mod report;
pub mod work;

#[cfg(test)]
pub(crate) mod testing;

pub use assembler::{ReportAssembler, free_space};
pub use error::{CoreError, CoreResult};
pub use executor::WorkExecutor;
pub use fetch::{ContentFetcher, DEFAULT_GATEWAY_HOST, GatewayResolver};
pub use report::{ReportPayload, STORE_ERROR_CODE};
pub use work::{NO_WORK_PREFIX, REQUEST_ERROR_MESSAGE, WorkAssignment, WorkDescriptor, WorkResponse};
