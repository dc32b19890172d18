//! Process-wide span carrying the run mode and build identity.

use tracing::{Span, span::Entered};

use crate::build_info::build_info;

/// Guard that keeps the process-level span entered for its lifetime.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the `connector` span tagged with `mode`, version, and commit.
    #[must_use]
    pub fn new(mode: impl Into<String>) -> Self {
        let mode = mode.into();
        let info = build_info();
        let span: &'static Span = Box::leak(Box::new(tracing::info_span!(
            "connector",
            mode = %mode,
            version = info.version,
            commit = info.commit
        )));
        let guard = span.enter();
        Self { _guard: guard }
    }
}
