//! `bot-upkeep`: cron entry point for the entitlement reconciler and the
//! metrics sampler.
//!
//! ```bash
//! bot-upkeep --config /etc/bot-upkeep.toml entitlements
//! bot-upkeep graphs --log-level debug
//! bot-upkeep migrate
//! ```

mod args;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use upkeep_app::{
    AppConfig, AppError, AppState, DiscordApi, HttpLatencyProbe, Probes, Result, RunClock,
    SystemProcessStats,
};

use args::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(&cli.log_level) {
        eprintln!("{err}");
        return ExitCode::from(2);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, command = ?cli.command, "job failed");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = AppConfig::load(&cli.config)?;
    let state = AppState::new(config);
    let mut db = state.open_db()?;

    match cli.command {
        Command::Migrate => {
            let applied = db.applied_migrations()?;
            info!(applied = applied.len(), "schema up to date");
        }
        Command::Entitlements => {
            let api = DiscordApi::new(&state.config.discord)?;
            state
                .services
                .entitlements
                .reconcile(&mut db, &api, chrono::Utc::now())?;
        }
        Command::Graphs => {
            let api = DiscordApi::new(&state.config.discord)?;
            let latency =
                HttpLatencyProbe::new(&api, state.config.sampler.internal_api_url.as_deref());
            let probes = Probes {
                processes: &SystemProcessStats,
                latency: &latency,
            };
            state
                .services
                .sampler
                .run(&mut db, &probes, RunClock::now())?;
        }
    }
    Ok(())
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> std::result::Result<(), AppError> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|err| AppError::Config(format!("invalid log level: {err}")))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();

    Ok(())
}
