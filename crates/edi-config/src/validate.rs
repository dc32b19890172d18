//! Startup validation for decoded configuration documents.

use std::collections::HashSet;
use std::time::Duration;

use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{ConnectorConfig, LogKind, ProcessConfig};

/// Validate a decoded configuration.
///
/// # Errors
///
/// Returns the first violation found: an unparseable or non-HTTP(S) `url`, a
/// zero `runWaitTime`, `FILE` logging without a folder, an unparseable
/// `proxy`, or an empty, duplicate, or untyped process entry.
pub fn validate_config(config: &ConnectorConfig) -> ConfigResult<()> {
    validate_url(&config.url)?;

    if config.run_wait_time == Duration::ZERO {
        return Err(ConfigError::invalid_field(
            "runWaitTime",
            "must_be_positive",
            Some("0s"),
        ));
    }

    if config.log.kind == LogKind::File && config.log.folder.is_none() {
        return Err(ConfigError::invalid_field(
            "log.folder",
            "required_for_file_logging",
            None::<String>,
        ));
    }

    if let Some(proxy) = config
        .proxy
        .as_deref()
        .filter(|value| !value.trim().is_empty())
    {
        Url::parse(proxy)
            .map_err(|_| ConfigError::invalid_field("proxy", "unparseable", Some(proxy)))?;
    }

    validate_processes("inbounds", &config.inbounds)?;
    validate_processes("outbounds", &config.outbounds)?;
    Ok(())
}

fn validate_url(raw: &str) -> ConfigResult<()> {
    let url = Url::parse(raw).map_err(|_| ConfigError::invalid_field("url", "unparseable", Some(raw)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid_field(
            "url",
            "unsupported_scheme",
            Some(raw),
        ));
    }
    Ok(())
}

fn validate_processes(section: &'static str, processes: &[ProcessConfig]) -> ConfigResult<()> {
    let mut seen = HashSet::new();
    for process in processes {
        if process.id.trim().is_empty() {
            return Err(ConfigError::invalid_field(
                "id",
                "empty",
                Some(section),
            ));
        }
        if process.kind.trim().is_empty() {
            return Err(ConfigError::invalid_field(
                "type",
                "empty",
                Some(process.id.as_str()),
            ));
        }
        if !seen.insert(process.id.as_str()) {
            return Err(ConfigError::DuplicateId {
                section,
                id: process.id.clone(),
            });
        }
    }
    Ok(())
}
