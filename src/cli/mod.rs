//! CLI module for tabledb
//!
//! Provides command-line interface for:
//! - init: Create the storage directory and default database
//! - exec: One-shot request execution
//! - session: Line-delimited request loop over stdin/stdout

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{exec, init, load_config, run, run_command, session};
pub use errors::{CliError, CliErrorCode, CliResult};
