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

//! Pluggable local endpoints that exchange payloads with the connector engine.
//!
//! Layout: `object.rs` (payload crossing the transport boundary),
//! `transport.rs` (role and capability traits), `registry.rs` (type string to
//! constructor table), `file/` (directory-backed inbound and outbound
//! transports), `error.rs`.

pub mod error;
pub mod file;
pub mod object;
pub mod registry;
pub mod transport;

pub use error::{TransportError, TransportResult};
pub use object::Object;
pub use registry::TransportRegistry;
pub use transport::{
    AttachmentLister, AttachmentProcessor, FinalizeError, Finalizer, InboundTransport,
    OutboundTransport,
};
