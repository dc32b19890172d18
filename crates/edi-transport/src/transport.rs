//! Transport roles and optional capabilities.
//!
//! # Design
//! - Two required roles: [`OutboundTransport`] produces payloads and
//!   [`InboundTransport`] consumes them.
//! - Optional capabilities are discovered through accessor methods that
//!   default to `None`; a missing capability means the engine skips the call.
//! - Operations take no cancellation context; callers bound them by dropping
//!   the future.

use std::error::Error;

use async_trait::async_trait;

use crate::error::TransportResult;
use crate::object::Object;

/// Error handed to [`Finalizer::finalize`] when an upload failed.
pub type FinalizeError = dyn Error + Send + Sync + 'static;

/// Local source of payloads uploaded to the platform.
#[async_trait]
pub trait OutboundTransport: Send + Sync {
    /// Payloads ready for upload as transmissions.
    async fn list_messages(&self) -> TransportResult<Vec<Object>>;

    /// Attachment listing capability, when supported.
    fn attachment_lister(&self) -> Option<&dyn AttachmentLister> {
        None
    }

    /// Post-upload disposition capability, when supported.
    fn finalizer(&self) -> Option<&dyn Finalizer> {
        None
    }
}

/// Local destination for payloads downloaded from the platform.
#[async_trait]
pub trait InboundTransport: Send + Sync {
    /// Store one transmission body.
    async fn process_message(&self, object: Object) -> TransportResult<()>;

    /// Attachment storage capability, when supported.
    fn attachment_processor(&self) -> Option<&dyn AttachmentProcessor> {
        None
    }

    /// Post-processing disposition capability, when supported.
    fn finalizer(&self) -> Option<&dyn Finalizer> {
        None
    }
}

/// Outbound capability: produce attachment payloads.
#[async_trait]
pub trait AttachmentLister: Send + Sync {
    /// Payloads ready for upload as attachments.
    async fn list_attachments(&self) -> TransportResult<Vec<Object>>;

    /// Whether attachment listing is configured for this instance.
    fn handle_attachments(&self) -> bool;
}

/// Inbound capability: store attachment payloads.
#[async_trait]
pub trait AttachmentProcessor: Send + Sync {
    /// Store one attachment.
    async fn process_attachment(&self, object: Object) -> TransportResult<()>;

    /// Whether attachment storage is configured for this instance.
    fn handle_attachments(&self) -> bool;

    /// Whether an attachment at `url` may be downloaded.
    fn accepts_attachment_url(&self, url: &str) -> bool {
        let _ = url;
        true
    }
}

/// Capability: dispose of a payload once the platform call completed.
#[async_trait]
pub trait Finalizer: Send + Sync {
    /// Dispose of `object`; `error` is the failure of the platform call, if any.
    async fn finalize(&self, object: &Object, error: Option<&FinalizeError>) -> TransportResult<()>;
}
