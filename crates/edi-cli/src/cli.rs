//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use edi_config::default_config_path;

use crate::commands;
use crate::error::CliResult;

#[derive(Debug, Parser)]
#[command(
    name = "edi-connector",
    about = "Exchange EDI files between local folders and the EDI platform"
)]
pub(crate) struct Cli {
    /// Configuration file (YAML or JSON).
    #[arg(short = 'c', long, global = true, env = "EDI_CONNECTOR_CONFIG")]
    pub(crate) config: Option<PathBuf>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

impl Cli {
    pub(crate) fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Run the connector in the foreground until interrupted.
    Run,
    /// Control the operating-system service.
    Service {
        #[arg(value_enum)]
        action: ServiceAction,
    },
    /// Print version, build date, and commit.
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ServiceAction {
    Install,
    Uninstall,
    Start,
    Stop,
    Restart,
}

impl ServiceAction {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }
}

/// Parse arguments, execute the command, and return the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let config_path = cli.config_path();
    match cli.command {
        Command::Run => commands::run::run(&config_path).await,
        Command::Service { action } => commands::service::handle(action),
        Command::Version => {
            commands::version::print();
            Ok(())
        }
    }
}
