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

//! Client for the EDI platform REST API.
//!
//! Layout: `platform.rs` (the [`Platform`] seam used by the engine),
//! `client.rs` (reqwest-backed implementation), `settings.rs` (connection,
//! TLS, and proxy inputs), `model.rs` (wire types), `disposition.rs`
//! (`Content-Disposition` handling), `error.rs`.

pub mod client;
pub mod disposition;
pub mod error;
pub mod model;
pub mod platform;
pub mod settings;

pub use client::PlatformClient;
pub use error::{PlatformError, PlatformResult};
pub use model::{AttachmentPayload, Hash, MessageAttachment, Transmission};
pub use platform::Platform;
pub use settings::PlatformSettings;
