//! Build identification reported by `version`, the root span, and the HTTP
//! `User-Agent`.
//!
//! Date and commit are injected at build time through the
//! `EDI_CONNECTOR_BUILD_DATE` and `EDI_CONNECTOR_BUILD_COMMIT` environment
//! variables; unset values read as `unknown`.

use std::fmt::{self, Display, Formatter};

use once_cell::sync::Lazy;

const UNKNOWN: &str = "unknown";

static USER_AGENT: Lazy<String> = Lazy::new(|| {
    format!(
        "EDI-Connector/{} {} {}",
        build_info().version,
        std::env::consts::OS,
        std::env::consts::ARCH
    )
});

/// Version, build date, and commit of the running binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    /// Crate version.
    pub version: &'static str,
    /// Build date.
    pub date: &'static str,
    /// Source commit.
    pub commit: &'static str,
}

impl Display for BuildInfo {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "version: {}\ndate: {}\ncommit: {}",
            self.version, self.date, self.commit
        )
    }
}

/// Build information compiled into this binary.
#[must_use]
pub const fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        date: match option_env!("EDI_CONNECTOR_BUILD_DATE") {
            Some(date) => date,
            None => UNKNOWN,
        },
        commit: match option_env!("EDI_CONNECTOR_BUILD_COMMIT") {
            Some(commit) => commit,
            None => UNKNOWN,
        },
    }
}

/// `User-Agent` header value: `EDI-Connector/<version> <os> <arch>`.
#[must_use]
pub fn user_agent() -> &'static str {
    USER_AGENT.as_str()
}
