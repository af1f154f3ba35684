//! CLI command implementations
//!
//! Every command loads the config first, then opens the catalog. Only
//! `init` may create the storage directory.

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde_json::json;

use crate::api::ApiHandler;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::observability::{Event, Logger};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, read_requests, write_error, write_json};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Exec { config } => exec(&config),
        Command::Session { config } => session(&config),
    }
}

/// Loads the config file, falling back to defaults when it does not exist,
/// and applies its log level.
pub fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = if config_path.exists() {
        Config::load(config_path)?
    } else {
        Config::default()
    };
    Logger::set_min_severity(config.severity()?);
    Ok(config)
}

fn is_initialized(config: &Config) -> bool {
    config
        .storage_dir
        .join(format!("{}.json", config.default_database))
        .exists()
}

/// Create the storage directory and write the empty default database
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let response = init_storage(config)?;
    write_json(&mut io::stdout().lock(), &response.to_string())
}

pub(crate) fn init_storage(config: Config) -> CliResult<serde_json::Value> {
    if is_initialized(&config) {
        return Err(CliError::already_initialized());
    }

    let catalog = Catalog::open(config)?;
    let path = catalog.save_database(catalog.active_name())?;

    Ok(json!({
        "status": "ok",
        "data": {
            "initialized": true,
            "database": catalog.active_name(),
            "path": path.display().to_string(),
        }
    }))
}

/// Execute one request from stdin
pub fn exec(config_path: &Path) -> CliResult<()> {
    let mut handler = boot(config_path)?;
    let stdin = io::stdin();

    match read_request(&mut stdin.lock()) {
        Ok(request) => {
            let response = handler.handle(&request);
            write_json(&mut io::stdout().lock(), &response.to_json())
        }
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Execute requests from stdin until EOF
pub fn session(config_path: &Path) -> CliResult<()> {
    let handler = boot(config_path)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(handler, stdin.lock(), &mut stdout.lock())
}

/// Request loop shared by `session` and tests
pub(crate) fn serve<R: BufRead, W: Write>(
    mut handler: ApiHandler,
    input: R,
    out: &mut W,
) -> CliResult<()> {
    Logger::event(Event::SessionStart, &[("database", handler.catalog().active_name())]);

    let mut handled = 0usize;
    for request in read_requests(input) {
        match request {
            Ok(request) => {
                let response = handler.handle(&request);
                write_json(out, &response.to_json())?;
                handled += 1;
            }
            Err(e) => {
                // stdin failure is fatal
                let line = json!({"status": "error", "code": e.code_str(), "message": e.message()});
                write_json(out, &line.to_string())?;
                return Err(e);
            }
        }
    }

    Logger::event(Event::SessionEnd, &[("requests", &handled.to_string())]);
    Ok(())
}

fn boot(config_path: &Path) -> CliResult<ApiHandler> {
    let config = load_config(config_path)?;
    if !config.storage_dir.is_dir() {
        return Err(CliError::not_initialized());
    }
    Ok(ApiHandler::new(Catalog::open(config)?))
}
