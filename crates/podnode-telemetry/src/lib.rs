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

//! Logging primitives shared across the podnode workspace.
//!
//! Layout: `init.rs` (subscriber installation and log destinations),
//! `error.rs` (telemetry error type).

pub mod error;
pub mod init;

pub use error::{Result, TelemetryError};
pub use init::{
    DEBUG_LOG_LEVEL, DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging, open_log_file,
};
