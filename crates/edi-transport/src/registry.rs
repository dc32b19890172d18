//! Lookup table from transport type strings to constructors.
//!
//! # Design
//! - Types are matched case-insensitively and stored upper-case.
//! - [`TransportRegistry::default`] registers the built-in `FILE` transports;
//!   embedders add their own types without touching the engine.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use edi_config::ProcessConfig;

use crate::error::{TransportError, TransportResult};
use crate::file;
use crate::transport::{InboundTransport, OutboundTransport};

/// Constructor for outbound transports.
pub type OutboundConstructor =
    Arc<dyn Fn(&ProcessConfig) -> TransportResult<Box<dyn OutboundTransport>> + Send + Sync>;
/// Constructor for inbound transports.
pub type InboundConstructor =
    Arc<dyn Fn(&ProcessConfig) -> TransportResult<Box<dyn InboundTransport>> + Send + Sync>;

/// Registered transport constructors, keyed by type.
#[derive(Clone)]
pub struct TransportRegistry {
    outbound: HashMap<String, OutboundConstructor>,
    inbound: HashMap<String, InboundConstructor>,
}

impl TransportRegistry {
    /// Registry without any transport types.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            outbound: HashMap::new(),
            inbound: HashMap::new(),
        }
    }

    /// Register (or replace) the outbound constructor for `kind`.
    pub fn register_outbound<F>(&mut self, kind: &str, constructor: F) -> &mut Self
    where
        F: Fn(&ProcessConfig) -> TransportResult<Box<dyn OutboundTransport>> + Send + Sync + 'static,
    {
        self.outbound
            .insert(normalize(kind), Arc::new(constructor));
        self
    }

    /// Register (or replace) the inbound constructor for `kind`.
    pub fn register_inbound<F>(&mut self, kind: &str, constructor: F) -> &mut Self
    where
        F: Fn(&ProcessConfig) -> TransportResult<Box<dyn InboundTransport>> + Send + Sync + 'static,
    {
        self.inbound.insert(normalize(kind), Arc::new(constructor));
        self
    }

    /// Construct the outbound transport described by `process`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::UnknownType`] for unregistered types, or the
    /// constructor's own error.
    pub fn build_outbound(
        &self,
        process: &ProcessConfig,
    ) -> TransportResult<Box<dyn OutboundTransport>> {
        let constructor =
            self.outbound
                .get(&normalize(&process.kind))
                .ok_or_else(|| TransportError::UnknownType {
                    direction: "outbound",
                    kind: process.kind.clone(),
                })?;
        constructor(process)
    }

    /// Construct the inbound transport described by `process`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::UnknownType`] for unregistered types, or the
    /// constructor's own error.
    pub fn build_inbound(&self, process: &ProcessConfig) -> TransportResult<Box<dyn InboundTransport>> {
        let constructor =
            self.inbound
                .get(&normalize(&process.kind))
                .ok_or_else(|| TransportError::UnknownType {
                    direction: "inbound",
                    kind: process.kind.clone(),
                })?;
        constructor(process)
    }

    /// Registered outbound types, sorted.
    #[must_use]
    pub fn outbound_types(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.outbound.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Registered inbound types, sorted.
    #[must_use]
    pub fn inbound_types(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.inbound.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl Default for TransportRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register_outbound(file::TRANSPORT_TYPE, |process| {
                Ok(Box::new(file::FileOutbound::from_process(process)?))
            })
            .register_inbound(file::TRANSPORT_TYPE, |process| {
                Ok(Box::new(file::FileInbound::from_process(process)?))
            });
        registry
    }
}

impl fmt::Debug for TransportRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TransportRegistry")
            .field("outbound", &self.outbound_types())
            .field("inbound", &self.inbound_types())
            .finish()
    }
}

fn normalize(kind: &str) -> String {
    kind.trim().to_ascii_uppercase()
}
