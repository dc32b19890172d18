//! # Design
//!
//! - Every variant names the operation and the offending subject (config id,
//!   file path, transmission id, or URL) so one log line identifies the item.
//! - Messages stay constant; causes are preserved as sources.

use std::time::Duration;

use edi_platform::PlatformError;
use edi_transport::TransportError;
use thiserror::Error;

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the connector engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A platform call failed.
    #[error("platform call failed")]
    Platform {
        /// Operation identifier.
        operation: &'static str,
        /// Offending config id, transmission id, path, or URL.
        subject: String,
        /// Underlying platform error.
        source: PlatformError,
    },
    /// A transport call failed.
    #[error("transport call failed")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// Offending config id, transmission id, path, or URL.
        subject: String,
        /// Underlying transport error.
        source: TransportError,
    },
    /// An operation exceeded its deadline.
    #[error("operation timed out")]
    Timeout {
        /// Operation identifier.
        operation: &'static str,
        /// Offending item.
        subject: String,
        /// Deadline that expired.
        after: Duration,
    },
    /// An operation was abandoned because shutdown was requested.
    #[error("operation cancelled by shutdown")]
    Cancelled {
        /// Operation identifier.
        operation: &'static str,
        /// Offending item.
        subject: String,
    },
    /// An attachment URL did not match the inbound whitelist.
    #[error("attachment url rejected")]
    RejectedUrl {
        /// Rejected URL.
        url: String,
    },
    /// An attachment download did not announce a file name.
    #[error("attachment has no file name")]
    MissingFilename {
        /// Attachment URL.
        url: String,
    },
    /// The platform client could not be constructed.
    #[error("platform client setup failed")]
    PlatformSetup {
        /// Underlying platform error.
        source: PlatformError,
    },
}

impl EngineError {
    /// Config id, path, transmission id, or URL the error is about.
    #[must_use]
    pub fn subject(&self) -> &str {
        match self {
            Self::Platform { subject, .. }
            | Self::Transport { subject, .. }
            | Self::Timeout { subject, .. }
            | Self::Cancelled { subject, .. } => subject,
            Self::RejectedUrl { url } | Self::MissingFilename { url } => url,
            Self::PlatformSetup { .. } => "",
        }
    }

    /// Whether the error stems from a shutdown request.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Wraps a collaborator error with engine context.
pub(crate) trait Cause {
    fn wrap(self, operation: &'static str, subject: &str) -> EngineError;
}

impl Cause for PlatformError {
    fn wrap(self, operation: &'static str, subject: &str) -> EngineError {
        EngineError::Platform {
            operation,
            subject: subject.to_string(),
            source: self,
        }
    }
}

impl Cause for TransportError {
    fn wrap(self, operation: &'static str, subject: &str) -> EngineError {
        EngineError::Transport {
            operation,
            subject: subject.to_string(),
            source: self,
        }
    }
}

impl Cause for EngineError {
    fn wrap(self, _operation: &'static str, _subject: &str) -> EngineError {
        self
    }
}
