//! Command handlers.

pub(crate) mod run;
pub(crate) mod service;
pub(crate) mod version;
