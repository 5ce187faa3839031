//! Objectives replay host
//!
//! Replays a recorded session script through the objective tracker and
//! prints the objective panel after every round.
//!
//! Run with: cargo run -p objectives_replay -- session.json [--config objectives.toml] [--json]

mod session;

use std::path::PathBuf;
use std::process::ExitCode;

use objectives_tracker::{ObjectiveRouter, ObjectiveTracker, ObjectivesConfig};

use crate::session::{format_objective, replay, ReplayError, SessionScript};

/// Command line options
#[derive(Debug, Default)]
struct Options {
    session: Option<PathBuf>,
    config: Option<PathBuf>,
    json: bool,
}

impl Options {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut options = Self::default();
        let mut args = args.skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = args.next().ok_or("--config needs a path")?;
                    options.config = Some(PathBuf::from(path));
                }
                "--json" => options.json = true,
                flag if flag.starts_with("--") => return Err(format!("Unknown flag: {}", flag)),
                path if options.session.is_none() => options.session = Some(PathBuf::from(path)),
                other => return Err(format!("Unexpected argument: {}", other)),
            }
        }
        Ok(options)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = match Options::parse(std::env::args()) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("usage: objectives-replay <session.json> [--config objectives.toml] [--json]");
            return ExitCode::from(2);
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(options: &Options) -> Result<(), ReplayError> {
    let config = ObjectivesConfig::load(options.config.as_deref())?;
    log::info!("Tracking as {}", config.network.role);

    let router = ObjectiveRouter::new(ObjectiveTracker::from_config(&config)?);
    let script = match &options.session {
        Some(path) => SessionScript::load(path)?,
        None => {
            log::warn!("No session script given, nothing to replay");
            SessionScript::default()
        }
    };

    let reports = replay(&script, &router);
    if options.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        println!("== {} ==", report.name);
        if report.objectives.is_empty() {
            println!("  (no objectives)");
        }
        for objective in &report.objectives {
            println!("  {}", format_objective(objective));
        }
    }
    Ok(())
}
