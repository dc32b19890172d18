//! Engine construction and the reconciliation loop.
//!
//! # Design
//! - One task owns [`Engine::run`]; ticks execute sequentially and never
//!   overlap, so the shared platform client is used by one call at a time.
//! - Transports live in two maps keyed by config id; iteration order is the
//!   key order but callers must not rely on cross-transport ordering.
//! - Tick failures are logged per config id and never stop the loop.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use edi_config::{ConnectorConfig, format_duration};
use edi_platform::{Platform, PlatformClient, PlatformResult, PlatformSettings};
use edi_transport::{InboundTransport, OutboundTransport, TransportRegistry};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info};

use crate::error::{Cause, EngineError, EngineResult};
use crate::guard::{Guard, wait_for_shutdown};
use crate::options::EngineOptions;

/// Counters collected during one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Outbound files uploaded as transmissions.
    pub uploaded_messages: usize,
    /// Outbound files uploaded as attachments.
    pub uploaded_attachments: usize,
    /// Inbound transmissions written and confirmed.
    pub received_messages: usize,
    /// Inbound attachments written.
    pub received_attachments: usize,
    /// Logged failures (aborted batches and skipped downloads).
    pub failures: usize,
}

/// Periodic reconciliation between local transports and the platform.
pub struct Engine {
    pub(crate) platform: Arc<dyn Platform>,
    outbounds: BTreeMap<String, Box<dyn OutboundTransport>>,
    inbounds: BTreeMap<String, Box<dyn InboundTransport>>,
    options: EngineOptions,
    pub(crate) guard: Guard,
}

impl Engine {
    /// Assemble an engine from pre-built parts.
    #[must_use]
    pub fn new(
        platform: Arc<dyn Platform>,
        outbounds: BTreeMap<String, Box<dyn OutboundTransport>>,
        inbounds: BTreeMap<String, Box<dyn InboundTransport>>,
        options: EngineOptions,
    ) -> Self {
        let (_, shutdown) = watch::channel(false);
        Self {
            platform,
            outbounds,
            inbounds,
            guard: Guard::new(options.operation_timeout, shutdown),
            options,
        }
    }

    /// Build the platform client through `platform_factory` and every
    /// configured transport through `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PlatformSetup`] when the factory fails and
    /// [`EngineError::Transport`] (subject = config id) when a transport type
    /// is unknown or its settings are invalid.
    pub fn from_config<F>(
        config: &ConnectorConfig,
        registry: &TransportRegistry,
        platform_factory: F,
    ) -> EngineResult<Self>
    where
        F: FnOnce(&ConnectorConfig) -> PlatformResult<Arc<dyn Platform>>,
    {
        let platform =
            platform_factory(config).map_err(|source| EngineError::PlatformSetup { source })?;

        let mut outbounds = BTreeMap::new();
        for process in &config.outbounds {
            let transport = registry
                .build_outbound(process)
                .map_err(|err| err.wrap("outbound.build", &process.id))?;
            debug!(config_id = %process.id, kind = %process.kind, "outbound transport ready");
            outbounds.insert(process.id.clone(), transport);
        }

        let mut inbounds = BTreeMap::new();
        for process in &config.inbounds {
            let transport = registry
                .build_inbound(process)
                .map_err(|err| err.wrap("inbound.build", &process.id))?;
            debug!(config_id = %process.id, kind = %process.kind, "inbound transport ready");
            inbounds.insert(process.id.clone(), transport);
        }

        Ok(Self::new(
            platform,
            outbounds,
            inbounds,
            EngineOptions::from_config(config),
        ))
    }

    /// [`Engine::from_config`] with the HTTPS [`PlatformClient`].
    ///
    /// # Errors
    ///
    /// See [`Engine::from_config`].
    pub fn connect(config: &ConnectorConfig, registry: &TransportRegistry) -> EngineResult<Self> {
        Self::from_config(config, registry, |config| {
            let client = PlatformClient::new(&PlatformSettings::from_config(config))?;
            Ok(Arc::new(client) as Arc<dyn Platform>)
        })
    }

    /// Configured timing.
    #[must_use]
    pub const fn options(&self) -> EngineOptions {
        self.options
    }

    /// Config ids of the outbound transports, in iteration order.
    pub fn outbound_ids(&self) -> impl Iterator<Item = &str> {
        self.outbounds.keys().map(String::as_str)
    }

    /// Config ids of the inbound transports, in iteration order.
    pub fn inbound_ids(&self) -> impl Iterator<Item = &str> {
        self.inbounds.keys().map(String::as_str)
    }

    /// Tick every `run_wait_time` until `true` is published on `shutdown`.
    ///
    /// The first tick fires one period after start; late ticks are delayed
    /// rather than bursted. In-flight listing, upload, and download calls are
    /// abandoned on shutdown while an already downloaded transmission is
    /// still written and confirmed.
    ///
    /// # Errors
    ///
    /// Tick failures are logged, not returned; the loop currently always
    /// finishes with `Ok(())`.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> EngineResult<()> {
        self.guard = Guard::new(self.options.operation_timeout, shutdown.clone());
        let period = self.options.run_wait_time;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            outbounds = self.outbounds.len(),
            inbounds = self.inbounds.len(),
            period = %format_duration(period),
            "connector engine started"
        );
        loop {
            tokio::select! {
                biased;
                () = wait_for_shutdown(&mut shutdown) => break,
                _ = ticker.tick() => {
                    self.run_once().await;
                }
            }
        }
        info!("connector engine stopped");
        Ok(())
    }

    /// Execute exactly one tick: outbound transports first, then inbound.
    pub async fn run_once(&self) -> TickReport {
        let mut report = TickReport::default();
        for (config_id, transport) in &self.outbounds {
            if self.guard.shutdown_requested() {
                break;
            }
            self.process_outbound(config_id, transport.as_ref(), &mut report)
                .await;
        }
        for (config_id, transport) in &self.inbounds {
            if self.guard.shutdown_requested() {
                break;
            }
            self.process_inbound(config_id, transport.as_ref(), &mut report)
                .await;
        }
        debug!(?report, "tick finished");
        report
    }

    pub(crate) fn record_failure(
        step: &'static str,
        config_id: &str,
        err: &EngineError,
        report: &mut TickReport,
    ) {
        if err.is_cancelled() {
            info!(config_id, step, subject = err.subject(), "work abandoned on shutdown");
            return;
        }
        report.failures += 1;
        error!(
            config_id,
            step,
            subject = err.subject(),
            error = ?err,
            "connector batch aborted"
        );
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Engine")
            .field("outbounds", &self.outbounds.keys().collect::<Vec<_>>())
            .field("inbounds", &self.inbounds.keys().collect::<Vec<_>>())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
