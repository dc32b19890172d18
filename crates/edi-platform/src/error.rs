//! Error types for platform calls.
//!
//! # Design
//! - Construction failures (TLS material, proxy, URL) are separated from
//!   per-call failures so startup can treat them as fatal.
//! - Per-call variants carry the operation and URL for log context.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Primary error type for the platform client.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// A configured URL could not be parsed.
    #[error("invalid platform url")]
    InvalidUrl {
        /// Raw URL input.
        url: String,
        /// Parser failure.
        source: url::ParseError,
    },
    /// The base URL cannot carry path segments.
    #[error("platform url cannot be used as a base")]
    UnsupportedUrl {
        /// Offending URL.
        url: String,
    },
    /// TLS material could not be read from disk.
    #[error("tls material could not be read")]
    TlsRead {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// TLS material was read but is not valid PEM.
    #[error("tls material is invalid")]
    TlsParse {
        /// File holding the rejected material.
        path: PathBuf,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The proxy URL was rejected.
    #[error("invalid proxy configuration")]
    Proxy {
        /// Proxy URL.
        url: String,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// Building the HTTP client failed.
    #[error("failed to build http client")]
    ClientBuild {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// An attachment filename cannot be carried in a header.
    #[error("attachment filename is not a valid header value")]
    InvalidFilename {
        /// Rejected filename.
        filename: String,
    },
    /// The request failed before a response was received.
    #[error("platform request failed")]
    Request {
        /// Operation identifier.
        operation: &'static str,
        /// Request URL.
        url: String,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The platform answered with a non-success status.
    #[error("platform returned an error status")]
    Status {
        /// Operation identifier.
        operation: &'static str,
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body, lossily decoded.
        body: String,
    },
    /// The response body did not match the expected JSON shape.
    #[error("platform response could not be decoded")]
    Decode {
        /// Operation identifier.
        operation: &'static str,
        /// Request URL.
        url: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

impl PlatformError {
    /// HTTP status code when the platform rejected the request.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
