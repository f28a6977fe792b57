// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! `initd`: a small process supervisor intended to run as PID 1 in a
//! container, forking and execing the programs declared in its YAML
//! manifest according to their dependency order.

mod exit_error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use exit_error::{ExitError, EXIT_CHILD_CRASHED, EXIT_SETUP_FAILED};
use initd_supervisor::{ShutdownReason, Supervisor, TracingLogSink};

#[derive(Parser, Debug)]
#[command(name = "initd", about = "Process supervisor for containers", version)]
struct Cli {
    /// Path to a YAML config file, or a directory of them.
    #[arg(long, default_value = "config.yml")]
    config: PathBuf,

    /// Enable debug-level logging.
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            let exit_error = err.downcast_ref::<ExitError>();
            let code = exit_error.map_or(EXIT_SETUP_FAILED, |e| e.code);
            ExitCode::from(code as u8)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let specs = initd_config::load_from_path(&cli.config)
        .map_err(|e| ExitError::new(EXIT_SETUP_FAILED, e.to_string()))?;

    if specs.is_empty() {
        tracing::warn!("no programs declared in '{}'", cli.config.display());
    }

    let mut supervisor = Supervisor::new(specs, TracingLogSink)
        .map_err(|e| ExitError::new(EXIT_SETUP_FAILED, e.to_string()))?;

    match supervisor.run().map_err(|e| ExitError::new(EXIT_SETUP_FAILED, e.to_string()))? {
        ShutdownReason::Clean => Ok(()),
        ShutdownReason::ChildCrashed => {
            Err(ExitError::new(EXIT_CHILD_CRASHED, "a supervised process crashed").into())
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
