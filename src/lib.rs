pub mod cli;
pub mod commands;
pub mod core;
mod progress;
mod prompt;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::core::config::SetupConfig;
use crate::core::error::SetupResult;
use crate::core::state::SetupState;

const WORKER_THREADS: usize = 4;

pub fn run() -> ExitCode {
    // Logs go to stderr so they never mix with prompts.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,server_setup_lib=info")),
        )
        .init();

    let cli = Cli::parse();
    match execute(cli.into_command()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Command) -> SetupResult<bool> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(WORKER_THREADS)
        .thread_name("server-setup-worker")
        .enable_all()
        .build()?;
    let state = Arc::new(SetupState::new(SetupConfig::from_env())?);

    tracing::info!("Minecraft Server Setup {} starting", env!("CARGO_PKG_VERSION"));
    let result = match command {
        Command::Versions { software } => commands::run_versions(&runtime, &state, software),
        Command::Start(args) => commands::run_start(&runtime, &state, args),
    };

    drop(state);
    runtime.shutdown_timeout(Duration::from_secs(2));
    result
}
