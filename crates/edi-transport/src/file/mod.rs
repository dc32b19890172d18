//! Directory-backed transports.
//!
//! # Design
//! - [`FileOutbound`] scans watched folders for aged files and disposes of
//!   them once the upload finished.
//! - [`FileInbound`] writes downloaded payloads into destination folders.
//! - Settings are validated at construction; missing directories are fatal.

mod fsio;
mod inbound;
mod outbound;
pub mod settings;

pub use inbound::FileInbound;
pub use outbound::FileOutbound;
pub use settings::{
    DEFAULT_WAIT_TIME, ExistMode, FolderSettings, InboundSettings, OutboundSettings,
};

/// Process type handled by the file transports.
pub const TRANSPORT_TYPE: &str = "FILE";
