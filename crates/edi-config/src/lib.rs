#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! File-backed configuration for the EDI connector.
//!
//! Layout: `model.rs` (typed configuration document), `defaults.rs` (default
//! values and locations), `duration.rs` (duration strings), `loader.rs`
//! (YAML/JSON front-ends), `validate.rs` (startup validation).

pub mod defaults;
pub mod duration;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use defaults::{DEFAULT_RUN_WAIT_TIME, DEFAULT_SERVICE_NAME, DEFAULT_URL, default_config_path};
pub use duration::{format_duration, parse_duration};
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, load_config, load_config_with_format, parse_config};
pub use model::{ConnectorConfig, LogKind, LogLevel, LogSettings, ProcessConfig};
pub use validate::validate_config;
