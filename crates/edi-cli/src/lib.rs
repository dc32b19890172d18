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
#![allow(clippy::redundant_pub_crate)]

//! Command-line entrypoint for the EDI connector.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `commands/`: `run` supervisor, `service`, and `version` handlers
//! - `error.rs`: CLI error type and exit codes
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod commands;
pub(crate) mod error;

pub use cli::run;
