//! `run` command: load configuration, install logging, and drive the engine
//! until an interrupt arrives.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use edi_config::{LogKind, LogSettings, load_config};
use edi_engine::{Engine, EngineResult};
use edi_telemetry::{
    GlobalContextGuard, LogSink, LoggingConfig, build_info, init_logging, install_panic_hook,
    panic_message,
};
use edi_transport::TransportRegistry;
use tokio::sync::watch;
use tokio::task::JoinError;
use tracing::{error, info, warn};

use crate::error::{CliError, CliResult};

/// Time the engine gets to finish its current step after a shutdown request.
pub(crate) const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

pub(crate) async fn run(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path).map_err(|err| {
        CliError::validation(format!(
            "failed to load configuration {}: {err}",
            config_path.display()
        ))
    })?;

    let sink = sink_for(&config.log)?;
    init_logging(&LoggingConfig {
        level: config.log.level.as_filter(),
        sink,
    })
    .context("failed to initialise logging")
    .map_err(CliError::failure)?;
    install_panic_hook();
    let _context = GlobalContextGuard::new("run");

    info!(
        build = %build_info(),
        config = %config_path.display(),
        outbounds = config.outbounds.len(),
        inbounds = config.inbounds.len(),
        "connector starting"
    );

    let engine = Engine::connect(&config, &TransportRegistry::default())
        .context("failed to start connector")
        .map_err(CliError::failure)?;
    supervise(engine, shutdown_signal(), SHUTDOWN_GRACE).await
}

/// Map the configured log sink onto a telemetry sink.
pub(crate) fn sink_for(settings: &LogSettings) -> CliResult<LogSink> {
    match settings.kind {
        LogKind::StdoutText => Ok(LogSink::StdoutText),
        LogKind::StdoutJson => Ok(LogSink::StdoutJson),
        LogKind::Event => Ok(LogSink::Event),
        LogKind::File => settings
            .folder
            .clone()
            .filter(|folder| !folder.as_os_str().is_empty())
            .map(|folder| LogSink::File { folder })
            .ok_or_else(|| CliError::validation("log.folder is required when log.type is FILE")),
    }
}

/// Run `engine` until `signal` resolves, then request shutdown and wait up to
/// `grace` for the engine to stop.
pub(crate) async fn supervise<S>(engine: Engine, signal: S, grace: Duration) -> CliResult<()>
where
    S: Future<Output = ()>,
{
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut task = tokio::spawn(engine.run(shutdown_rx));

    tokio::select! {
        joined = &mut task => return report_exit(joined),
        () = signal => info!("shutdown requested"),
    }

    let _ = shutdown_tx.send(true);
    match tokio::time::timeout(grace, &mut task).await {
        Ok(joined) => report_exit(joined),
        Err(_) => {
            warn!(grace_secs = grace.as_secs(), "engine did not stop in time; aborting");
            task.abort();
            Err(CliError::failure(anyhow::anyhow!(
                "engine did not stop within {}s",
                grace.as_secs()
            )))
        }
    }
}

pub(crate) fn report_exit(joined: Result<EngineResult<()>, JoinError>) -> CliResult<()> {
    match joined {
        Ok(Ok(())) => {
            info!("connector stopped");
            Ok(())
        }
        Ok(Err(err)) => {
            error!(error = ?err, "connector stopped with error");
            Err(CliError::failure(err))
        }
        Err(join) if join.is_panic() => {
            let message = panic_message(&*join.into_panic());
            error!(panic = %message, "connector task panicked");
            Err(CliError::failure(anyhow::anyhow!(
                "connector task panicked: {message}"
            )))
        }
        Err(join) => Err(CliError::failure(
            anyhow::Error::new(join).context("connector task was cancelled"),
        )),
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(err) => {
                warn!(error = %err, "SIGTERM handler unavailable; waiting for ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::Arc;

    use edi_config::LogLevel;
    use edi_engine::EngineOptions;
    use edi_platform::Platform;
    use edi_test_support::platform::FakePlatform;

    fn idle_engine() -> Engine {
        let platform: Arc<dyn Platform> = Arc::new(FakePlatform::new());
        Engine::new(
            platform,
            BTreeMap::new(),
            BTreeMap::new(),
            EngineOptions {
                run_wait_time: Duration::from_secs(60),
                operation_timeout: Duration::from_secs(1),
            },
        )
    }

    #[test]
    fn sinks_follow_log_type() -> Result<(), String> {
        let mut settings = LogSettings {
            level: LogLevel::Debug,
            kind: LogKind::StdoutJson,
            folder: None,
        };
        assert_eq!(
            sink_for(&settings).map_err(|err| err.display_message())?,
            LogSink::StdoutJson
        );

        settings.kind = LogKind::File;
        let missing = sink_for(&settings).err().map(|err| err.display_message());
        assert_eq!(
            missing.as_deref(),
            Some("log.folder is required when log.type is FILE")
        );

        settings.folder = Some(PathBuf::from("/var/log/edi"));
        assert_eq!(
            sink_for(&settings).map_err(|err| err.display_message())?,
            LogSink::File {
                folder: PathBuf::from("/var/log/edi")
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn supervise_stops_engine_on_signal() {
        let result = supervise(idle_engine(), async {}, Duration::from_secs(5)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn panicking_task_is_reported_as_failure() {
        let joined = tokio::spawn(async {
            if true {
                panic!("engine exploded");
            }
            Ok(())
        })
        .await;
        let message = report_exit(joined).err().map(|err| err.display_message());
        assert_eq!(
            message.as_deref(),
            Some("connector task panicked: engine exploded")
        );
    }

    #[tokio::test]
    async fn missing_configuration_is_a_validation_error() -> Result<(), std::io::Error> {
        let dir = tempfile::tempdir()?;
        let result = run(&dir.path().join("missing.yaml")).await;
        assert!(matches!(result, Err(CliError::Validation(_))));
        Ok(())
    }
}
