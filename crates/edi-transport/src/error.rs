//! # Design
//!
//! - Constant-message errors for transport construction and file handling.
//! - Operation, path, and field context travel as structured fields.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors produced by transports and the transport registry.
#[derive(Debug, Error)]
pub enum TransportError {
    /// IO failures while interacting with the filesystem.
    #[error("transport io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Transport settings did not decode.
    #[error("transport settings could not be decoded")]
    Settings {
        /// Config id of the offending process.
        id: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// Transport settings decoded but failed validation.
    #[error("invalid transport setting")]
    InvalidSetting {
        /// Setting that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// No constructor is registered for the requested type.
    #[error("unknown transport type")]
    UnknownType {
        /// Direction (`inbound` or `outbound`).
        direction: &'static str,
        /// Requested type.
        kind: String,
    },
    /// The source of a move is not a regular file.
    #[error("only regular files can be moved")]
    NotRegularFile {
        /// Offending path.
        path: PathBuf,
    },
    /// A payload name cannot be used as a file name.
    #[error("invalid file name")]
    InvalidFilename {
        /// Rejected name.
        value: String,
    },
}

impl TransportError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_setting(
        field: &'static str,
        reason: &'static str,
        value: Option<impl Into<String>>,
    ) -> Self {
        Self::InvalidSetting {
            field,
            reason,
            value: value.map(Into::into),
        }
    }
}
