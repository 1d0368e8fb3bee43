//! CLI entry point for envconf
//!
//! Resolves the deployment environment from the command line, loads the
//! matching configuration section, and prints the effective settings.

use clap::Parser;
use envconf::{AppConfig, ConfigSettings, Environment, UnknownEnvironment};
use serde_yaml::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// envconf - per-environment application configuration resolver
#[derive(Parser, Debug)]
#[command(name = "envconf")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Deployment environment (Development, Testing, Staging, Production)
    environment: String,

    /// Override the configured port (0 keeps the loaded value)
    #[arg(short, long, default_value_t = 0)]
    port: u16,

    /// Path to the settings file
    #[arg(short, long, default_value = "config/settings.yml")]
    config: PathBuf,
}

/// Error type for configuration resolution
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Environment(#[from] UnknownEnvironment),

    #[error(transparent)]
    Config(#[from] envconf::ConfigError),
}

/// Parse the environment, load its configuration, and apply overrides
///
/// Override precedence is settings file < PORT env var < --port. Overrides
/// replace the port only; the approot keeps the port derived during loading.
fn resolve(args: &Args) -> Result<AppConfig<Environment, Value>, CliError> {
    let environment: Environment = args.environment.parse()?;

    let path = args.config.clone();
    let mut config = ConfigSettings::new(environment)
        .config_file(move |_| path.clone())
        .load()?;

    config.apply_env_overrides();
    if args.port != 0 {
        config.port = args.port;
    }

    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();

    println!(
        "Loading {} configuration from {}",
        args.environment,
        args.config.display()
    );

    match resolve(&args) {
        Ok(config) => {
            println!("Environment: {}", config.environment);
            println!("Port: {}", config.port);
            println!("Approot: {}", config.approot);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            ExitCode::FAILURE
        }
    }
}
