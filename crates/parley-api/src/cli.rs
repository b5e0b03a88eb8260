//! CLI definition for the `parley` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Users, chats and messages over a JSON HTTP API.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long, global = true, env = "PARLEY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed logs (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Address to bind.
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on.
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite database file, or `:memory:`.
        #[arg(long)]
        db: Option<String>,
    },

    /// Apply the database schema and exit.
    Migrate {
        /// SQLite database file.
        #[arg(long)]
        db: Option<String>,
    },
}

impl Cli {
    /// Log filter implied by `-v` / `--quiet`, if either was given.
    pub fn log_filter(&self) -> Option<&'static str> {
        match self.verbose {
            0 if self.quiet => Some("error"),
            0 => None,
            1 => Some("info,parley=debug"),
            _ => Some("trace"),
        }
    }
}
