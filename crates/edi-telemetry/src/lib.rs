#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Logging and process-level diagnostics shared by the connector crates.
//!
//! This crate installs the global `tracing` subscriber for each configured log
//! sink, records build information, and routes panics into the log stream.

pub mod build_info;
pub mod context;
pub mod error;
pub mod init;
pub mod panic;

pub use build_info::{BuildInfo, build_info, user_agent};
pub use context::GlobalContextGuard;
pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LOG_FILE_NAME, LogSink, LoggingConfig, init_logging};
pub use panic::{install_panic_hook, panic_message};
