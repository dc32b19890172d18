//! Default values and locations for the connector configuration.
//!
//! # Design
//! - Centralize defaults so the model, loader, and CLI agree on them.
//! - Keep platform-specific locations behind a single lookup function.

use std::path::PathBuf;
use std::time::Duration;

/// Platform endpoint used when `url` is not configured.
pub const DEFAULT_URL: &str = "https://edi.myopenfactory.net";
/// Interval between reconciliation ticks when `runWaitTime` is not configured.
pub const DEFAULT_RUN_WAIT_TIME: Duration = Duration::from_secs(60);
/// Label used for OS service registration when `serviceName` is not configured.
pub const DEFAULT_SERVICE_NAME: &str = "EDI-Connector";
/// File name of the configuration document inside the default directories.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

const WINDOWS_CONFIG_DIR: [&str; 2] = ["myOpenFactory", "EDI-Connector"];
const UNIX_CONFIG_DIR: &str = "/etc/myopenfactory/edi-connector";

/// Default configuration location for the current platform.
#[must_use]
pub fn default_config_path() -> PathBuf {
    default_config_path_with(|name| std::env::var(name).ok())
}

pub(crate) fn default_config_path_with<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if cfg!(windows) {
        return lookup("ProgramData")
            .filter(|value| !value.trim().is_empty())
            .map_or_else(
                || PathBuf::from(CONFIG_FILE_NAME),
                |program_data| {
                    let mut path = PathBuf::from(program_data);
                    path.extend(WINDOWS_CONFIG_DIR);
                    path.push(CONFIG_FILE_NAME);
                    path
                },
            );
    }
    if cfg!(unix) {
        return PathBuf::from(UNIX_CONFIG_DIR).join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub(crate) fn url() -> String {
    DEFAULT_URL.to_string()
}

pub(crate) const fn run_wait_time() -> Duration {
    DEFAULT_RUN_WAIT_TIME
}

pub(crate) fn service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}
