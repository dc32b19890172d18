//! `service` commands. Service control is not wired into this build.

use crate::cli::ServiceAction;
use crate::error::{CliError, CliResult};

pub(crate) fn handle(action: ServiceAction) -> CliResult<()> {
    Err(CliError::validation(format!(
        "service {} is not available in this build",
        action.as_str()
    )))
}
