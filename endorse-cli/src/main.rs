mod cli;
mod commands;

use crate::cli::{Cli, Command};
use endorse_core::foundation::EndorseError;
use endorse_core::infrastructure::config::{load_app_config, load_app_config_from_path, AppConfig};
use endorse_core::infrastructure::logging::init_logger;
use log::{error, info};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Cli::parse_args();
    let config = match setup(&args) {
        Ok(config) => config,
        // No logger yet; stderr is the only sink.
        Err(err) => return report_failure(&err, false),
    };
    match run(&args, &config) {
        Ok(code) => code,
        Err(err) => report_failure(&err, true),
    }
}

/// Load configuration and start logging. Nothing is logged if this fails.
fn setup(args: &Cli) -> Result<AppConfig, EndorseError> {
    let config = load_config(args)?;
    let filters = args.log_filters.as_deref().unwrap_or(&config.logging.filters);
    let log_dir = args.log_dir.as_deref().or(config.logging.log_dir.as_deref());
    init_logger(log_dir, filters)?;
    info!("endorse {} command={:?}", env!("CARGO_PKG_VERSION"), args.command);
    Ok(config)
}

fn report_failure(err: &EndorseError, logger_ready: bool) -> ExitCode {
    if logger_ready {
        error!("command failed code={:?} error={}", err.code(), err);
    }
    eprintln!("error: {err}");
    ExitCode::FAILURE
}

fn run(args: &Cli, config: &AppConfig) -> Result<ExitCode, EndorseError> {
    match &args.command {
        Command::Digest(input) => println!("{}", commands::resolve_digest(input)?),
        Command::Sign { key, input, raw } => {
            let digest = commands::resolve_digest(input)?;
            println!("{}", commands::sign(key, &digest, *raw)?);
        }
        Command::Normalize { signature } => println!("{}", commands::normalize(signature)?),
        Command::Verify { public_key, digest, signature } => {
            let valid = commands::verify(public_key, digest, signature)?;
            println!("{}", if valid { "valid" } else { "invalid" });
            if !valid {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::PublicKey { key } => println!("{}", commands::public_key(key)?),
        Command::Config { json } => print!("{}", commands::render_config(config, *json)?),
    }
    Ok(ExitCode::SUCCESS)
}

fn load_config(args: &Cli) -> Result<AppConfig, EndorseError> {
    match &args.config {
        Some(path) => load_app_config_from_path(path),
        None => {
            let cwd = std::env::current_dir().map_err(|err| EndorseError::config(format!("cannot resolve working directory: {err}")))?;
            load_app_config(&cwd)
        }
    }
}
