//! YAML and JSON front-ends for [`ConnectorConfig`].
//!
//! Both formats decode into the same model and pass through
//! [`validate_config`] before being handed to callers.

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::model::ConnectorConfig;
use crate::validate::validate_config;

/// Serialization format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML (`.yaml`, `.yml`).
    Yaml,
    /// JSON (`.json`).
    Json,
}

impl ConfigFormat {
    /// Infer the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownFormat`] for any other extension.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnknownFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Load and validate the configuration at `path`, inferring the format from
/// its extension.
///
/// # Errors
///
/// Returns an error if the format is unknown, the file cannot be read, the
/// document does not decode, or validation fails.
pub fn load_config(path: &Path) -> ConfigResult<ConnectorConfig> {
    let format = ConfigFormat::from_path(path)?;
    load_config_with_format(path, format)
}

/// Load and validate the configuration at `path` using an explicit format.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the document does not decode,
/// or validation fails.
pub fn load_config_with_format(path: &Path, format: ConfigFormat) -> ConfigResult<ConnectorConfig> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "config.read",
        path: path.to_path_buf(),
        source,
    })?;
    let config = decode(&raw, format).map_err(|err| with_path(err, path))?;
    validate_config(&config)?;
    Ok(config)
}

/// Decode and validate a configuration document held in memory.
///
/// # Errors
///
/// Returns an error if the document does not decode or validation fails.
pub fn parse_config(raw: &str, format: ConfigFormat) -> ConfigResult<ConnectorConfig> {
    let config = decode(raw, format)?;
    validate_config(&config)?;
    Ok(config)
}

fn decode(raw: &str, format: ConfigFormat) -> ConfigResult<ConnectorConfig> {
    match format {
        ConfigFormat::Yaml => {
            serde_yaml::from_str(raw).map_err(|source| ConfigError::Yaml { path: None, source })
        }
        ConfigFormat::Json => {
            serde_json::from_str(raw).map_err(|source| ConfigError::Json { path: None, source })
        }
    }
}

fn with_path(err: ConfigError, path: &Path) -> ConfigError {
    match err {
        ConfigError::Yaml { source, .. } => ConfigError::Yaml {
            path: Some(path.to_path_buf()),
            source,
        },
        ConfigError::Json { source, .. } => ConfigError::Json {
            path: Some(path.to_path_buf()),
            source,
        },
        other => other,
    }
}
