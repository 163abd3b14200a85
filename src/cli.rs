//! CLI command definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// portgrab - show which processes are using which ports.
///
/// Without a subcommand, lists bound TCP and UDP sockets once.
#[derive(Parser, Debug)]
#[command(name = "portgrab")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(flatten)]
    pub scan: ScanArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options for a socket scan.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Output as JSON for scripting
    #[arg(long)]
    pub json: bool,

    /// Run native tools through the elevation helper (sudo by default)
    #[arg(long)]
    pub sudo: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List bound TCP and UDP sockets with their owning processes.
    #[command(visible_alias = "s")]
    Scan(ScanArgs),

    /// Print lines appended to a file, like `tail -f`.
    #[command(visible_alias = "t")]
    Tail {
        /// Path to the log file
        file: PathBuf,

        /// Polling interval in seconds (defaults to the configured interval)
        #[arg(long)]
        sleep: Option<f64>,
    },

    /// Show the effective configuration.
    #[command(visible_alias = "c")]
    Config {
        /// Show the config file path
        #[arg(long)]
        path: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
