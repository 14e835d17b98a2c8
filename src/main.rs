/*!
 * Tether CLI - service bootstrap
 *
 * Connects the backend (and optional cache) at startup, holds the
 * connection until Ctrl-C, then disconnects under its own retry budget.
 */

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tether::{
    config::{LogLevel, ServiceConfig},
    error::{Result, EXIT_SUCCESS},
    logging, resilience::RetryDefaults, service,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "tether")]
#[command(version, about = "Backend service bootstrap with a retry-bounded connection lifecycle", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend URI (overrides config and TETHER_BACKEND_URI)
    #[arg(short = 'u', long = "uri", value_name = "URI")]
    uri: Option<String>,

    /// Database to select after connecting
    #[arg(short = 'd', long = "database", value_name = "NAME")]
    database: Option<String>,

    /// Connect retry budget (default: MONGO_CONNECT_RETRY)
    #[arg(long = "connect-retry", value_name = "N")]
    connect_retry: Option<u32>,

    /// Disconnect retry budget (default: MONGO_DISCONNECT_RETRY)
    #[arg(long = "disconnect-retry", value_name = "N")]
    disconnect_retry: Option<u32>,

    /// Log level
    #[arg(long = "log-level", value_enum)]
    log_level: Option<LogLevelArg>,

    /// Log file path (JSON lines; default stdout)
    #[arg(long = "log-file", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Verbose logging (debug level)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            error!(error = %e, "Service failed");
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init_logging(&config)?;

    // Snapshot retry defaults once, before anything connects
    let defaults = RetryDefaults::from_env()?;
    info!(
        connect_retry = config.connect_retry.unwrap_or(defaults.connect_retry),
        disconnect_retry = config.disconnect_retry.unwrap_or(defaults.disconnect_retry),
        "Retry budgets resolved"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(service::run(config, &defaults, shutdown_signal()))
}

/// Defaults, then config file, then environment, then flags
fn resolve_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut config = match cli.config {
        Some(ref path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default(),
    };
    config.apply_env()?;

    if let Some(ref uri) = cli.uri {
        config.backend_uri = uri.clone();
    }
    if let Some(ref database) = cli.database {
        config.database = database.clone();
    }
    if cli.connect_retry.is_some() {
        config.connect_retry = cli.connect_retry;
    }
    if cli.disconnect_retry.is_some() {
        config.disconnect_retry = cli.disconnect_retry;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    if cli.log_file.is_some() {
        config.log_file = cli.log_file.clone();
    }
    config.verbose |= cli.verbose;

    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
