//! Tunables for the reconciliation loop.

use std::time::Duration;

use edi_config::{ConnectorConfig, DEFAULT_RUN_WAIT_TIME};

/// Deadline applied to every platform and transport call.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(15);

/// Loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Period between ticks; the first tick fires one period after start.
    pub run_wait_time: Duration,
    /// Deadline for each individual call.
    pub operation_timeout: Duration,
}

impl EngineOptions {
    /// Options derived from the connector configuration.
    #[must_use]
    pub const fn from_config(config: &ConnectorConfig) -> Self {
        Self {
            run_wait_time: config.run_wait_time,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            run_wait_time: DEFAULT_RUN_WAIT_TIME,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}
