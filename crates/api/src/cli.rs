//! Command line for the `agora-api` binary.

use clap::{Parser, Subcommand};

/// Agora boards and posts API
#[derive(Debug, Parser)]
#[command(name = "agora-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Serve HTTP (the default)
    Serve,

    /// Recompute every board's post counter from live posts, then exit
    ResyncCounters,
}

impl Cli {
    /// The command to run; no subcommand means serve.
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Serve)
    }
}
