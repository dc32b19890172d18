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

//! Reconciliation loop moving payloads between local transports and the EDI
//! platform.
//!
//! Layout: `engine.rs` (construction, tick loop, failure logging),
//! `outbound.rs` and `inbound.rs` (per-direction steps), `guard.rs`
//! (per-operation deadlines and shutdown), `options.rs`, `ids.rs`, `error.rs`.

pub mod engine;
pub mod error;
mod guard;
pub mod ids;
mod inbound;
pub mod options;
mod outbound;

pub use engine::{Engine, TickReport};
pub use error::{EngineError, EngineResult};
pub use ids::random_id;
pub use options::{DEFAULT_OPERATION_TIMEOUT, EngineOptions};
