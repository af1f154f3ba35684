//! CLI argument definitions using clap
//!
//! Commands:
//! - tabledb init --config <path>
//! - tabledb exec --config <path>
//! - tabledb session --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tabledb - typed tables with schema-reconciling unions
#[derive(Parser, Debug)]
#[command(name = "tabledb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the storage directory and the default database
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./tabledb.json")]
        config: PathBuf,
    },

    /// Execute a single JSON request from stdin and exit
    Exec {
        /// Path to configuration file
        #[arg(long, default_value = "./tabledb.json")]
        config: PathBuf,
    },

    /// Execute newline-delimited JSON requests until EOF
    Session {
        /// Path to configuration file
        #[arg(long, default_value = "./tabledb.json")]
        config: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exec_with_config() {
        let cli = Cli::try_parse_from(["tabledb", "exec", "--config", "/etc/tdb.json"]).unwrap();
        match cli.command {
            Command::Exec { config } => assert_eq!(config, PathBuf::from("/etc/tdb.json")),
            other => panic!("Expected Exec, got {:?}", other),
        }
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::try_parse_from(["tabledb", "session"]).unwrap();
        match cli.command {
            Command::Session { config } => assert_eq!(config, PathBuf::from("./tabledb.json")),
            other => panic!("Expected Session, got {:?}", other),
        }
    }
}
