//! Error types for configuration loading and validation.
//!
//! # Design
//! - Constant messages; the offending field, value, or path travels as context.
//! - Parser errors are preserved as sources rather than flattened into strings.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("configuration file could not be read")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path of the configuration file.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// The YAML document could not be decoded.
    #[error("invalid yaml configuration")]
    Yaml {
        /// Path of the document when loaded from disk.
        path: Option<PathBuf>,
        /// Source YAML error.
        source: serde_yaml::Error,
    },
    /// The JSON document could not be decoded.
    #[error("invalid json configuration")]
    Json {
        /// Path of the document when loaded from disk.
        path: Option<PathBuf>,
        /// Source JSON error.
        source: serde_json::Error,
    },
    /// The file extension did not map to a supported format.
    #[error("unsupported configuration format")]
    UnknownFormat {
        /// Path whose extension was not recognised.
        path: PathBuf,
    },
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// Two processes in the same direction share an id.
    #[error("duplicate process id")]
    DuplicateId {
        /// Direction (`inbounds` or `outbounds`).
        section: &'static str,
        /// Repeated id.
        id: String,
    },
    /// A duration string could not be parsed.
    #[error("invalid duration")]
    InvalidDuration {
        /// Raw duration input.
        value: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid_field(
        field: &'static str,
        reason: &'static str,
        value: Option<impl Into<String>>,
    ) -> Self {
        Self::InvalidField {
            field,
            reason,
            value: value.map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_preserves_sources() -> Result<(), Box<dyn Error>> {
        let io_err = ConfigError::Io {
            operation: "config.read",
            path: PathBuf::from("config.yaml"),
            source: io::Error::other("io"),
        };
        assert!(io_err.source().is_some());

        let Err(json_error) = serde_json::from_str::<serde_json::Value>("invalid") else {
            return Err(io::Error::other("expected invalid json").into());
        };
        let json_err = ConfigError::Json {
            path: None,
            source: json_error,
        };
        assert!(json_err.source().is_some());

        let field = ConfigError::invalid_field("url", "unparseable", Some("::"));
        assert!(matches!(
            field,
            ConfigError::InvalidField {
                field: "url",
                reason: "unparseable",
                value: Some(_)
            }
        ));
        Ok(())
    }
}
