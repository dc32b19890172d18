//! Typed configuration document.
//!
//! # Design
//! - Pure data carriers decoded from YAML or JSON with camelCase keys.
//! - Transport settings stay free-form (`serde_json::Value`); each transport
//!   decodes its own view of them.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::defaults;
use crate::error::ConfigError;

/// Root configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorConfig {
    /// Platform base URL.
    #[serde(default = "defaults::url")]
    pub url: String,
    /// Basic-auth user name.
    #[serde(default)]
    pub username: String,
    /// Basic-auth password.
    #[serde(default)]
    pub password: String,
    /// PEM bundle (certificate and private key) presented for mutual TLS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_certificate: Option<PathBuf>,
    /// PEM bundle replacing the system trust roots.
    #[serde(default, rename = "cafile", skip_serializing_if = "Option::is_none")]
    pub ca_file: Option<PathBuf>,
    /// Explicit proxy URL; environment variables are consulted when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// Interval between reconciliation ticks.
    #[serde(
        default = "defaults::run_wait_time",
        with = "crate::duration::serde_format"
    )]
    pub run_wait_time: Duration,
    /// Label used for OS service registration.
    #[serde(default = "defaults::service_name")]
    pub service_name: String,
    /// Logging sink configuration.
    #[serde(default)]
    pub log: LogSettings,
    /// Processes writing platform transmissions to local destinations.
    #[serde(default)]
    pub inbounds: Vec<ProcessConfig>,
    /// Processes uploading local files to the platform.
    #[serde(default)]
    pub outbounds: Vec<ProcessConfig>,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            url: defaults::url(),
            username: String::new(),
            password: String::new(),
            client_certificate: None,
            ca_file: None,
            proxy: None,
            run_wait_time: defaults::run_wait_time(),
            service_name: defaults::service_name(),
            log: LogSettings::default(),
            inbounds: Vec::new(),
            outbounds: Vec::new(),
        }
    }
}

/// Logging sink configuration (`log.*`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Minimum level emitted.
    #[serde(default)]
    pub level: LogLevel,
    /// Sink selection.
    #[serde(default, rename = "type")]
    pub kind: LogKind,
    /// Directory receiving log files when `kind` is [`LogKind::File`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<PathBuf>,
}

/// Log verbosity accepted in configuration (`ERROR`, `INFO`, `DEBUG`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Informational messages and errors.
    #[default]
    Info,
    /// Everything, including per-item diagnostics.
    Debug,
}

impl LogLevel {
    /// Canonical configuration spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }

    /// Directive understood by `tracing` filters.
    #[must_use]
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ERROR" => Ok(Self::Error),
            "INFO" => Ok(Self::Info),
            "DEBUG" => Ok(Self::Debug),
            _ => Err(ConfigError::invalid_field(
                "log.level",
                "unknown_level",
                Some(value),
            )),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, <LogLevel as TryFrom<String>>::Error> {
        value.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Logging sink (`FILE`, `EVENT`, `STDOUT_TEXT`, `STDOUT_JSON`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogKind {
    /// Append to a file inside `log.folder`.
    File,
    /// Operating-system event log.
    Event,
    /// Human-readable lines on stdout.
    #[default]
    StdoutText,
    /// One JSON object per line on stdout.
    StdoutJson,
}

/// One transport instance (`inbounds[]` / `outbounds[]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Engine-local id, echoed to the platform as `configID`.
    pub id: String,
    /// Transport type, resolved through the transport registry.
    #[serde(rename = "type")]
    pub kind: String,
    /// Free-form settings consumed by the transport constructor.
    #[serde(default)]
    pub settings: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn log_level_parses_case_insensitively() -> Result<(), ConfigError> {
        assert_eq!("error".parse::<LogLevel>()?, LogLevel::Error);
        assert_eq!(" Info ".parse::<LogLevel>()?, LogLevel::Info);
        assert_eq!("DEBUG".parse::<LogLevel>()?, LogLevel::Debug);
        assert!("TRACE".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Debug.as_filter(), "debug");
        Ok(())
    }

    #[test]
    fn log_settings_round_trip_through_json() -> Result<(), serde_json::Error> {
        let settings: LogSettings =
            serde_json::from_value(json!({"level": "DEBUG", "type": "STDOUT_JSON"}))?;
        assert_eq!(settings.level, LogLevel::Debug);
        assert_eq!(settings.kind, LogKind::StdoutJson);
        assert_eq!(
            serde_json::to_value(&settings)?,
            json!({"level": "DEBUG", "type": "STDOUT_JSON"})
        );
        Ok(())
    }

    #[test]
    fn process_config_defaults_settings_to_null() -> Result<(), serde_json::Error> {
        let process: ProcessConfig = serde_json::from_value(json!({"id": "a", "type": "FILE"}))?;
        assert_eq!(process.kind, "FILE");
        assert!(process.settings.is_null());
        Ok(())
    }
}
