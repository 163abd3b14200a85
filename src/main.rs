//! portgrab CLI - list bound sockets and the processes that own them.

mod cli;
mod config;
mod display;
mod error;
mod model;
mod normalize;
mod parse;
mod ports;
mod runner;
mod tail;

use std::path::PathBuf;

use clap::Parser;
use log::debug;

use cli::{Cli, Command, ScanArgs};
use config::{interval_from_secs, load_settings, settings_path, Settings};
use display::{display_config, display_config_json, display_sockets, display_sockets_json};
use error::{Error, Result, TailError};
use ports::get_listening_sockets;
use runner::running_as_root;
use tail::tail_file;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        match e {
            Error::Tail(TailError::NotFound(_)) => eprintln!("{e}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None => cmd_scan(cli.scan),
        Some(Command::Scan(args)) => cmd_scan(args),
        Some(Command::Tail { file, sleep }) => cmd_tail(file, sleep),
        Some(Command::Config { path, json }) => cmd_config(path, json),
    }
}

fn cmd_scan(args: ScanArgs) -> Result<()> {
    let settings = load_settings()?;

    let sockets = get_listening_sockets(elevation_helper(&args, &settings));

    if args.json || settings.json {
        display_sockets_json(&sockets)?;
    } else {
        display_sockets(&sockets);
    }
    Ok(())
}

/// The helper to prefix native tools with, if elevation is wanted and needed.
fn elevation_helper(args: &ScanArgs, settings: &Settings) -> Option<Vec<String>> {
    if !(args.sudo || settings.elevate) {
        return None;
    }
    if running_as_root() {
        debug!("already running as root, not elevating");
        return None;
    }
    Some(settings.elevation_command.clone())
}

fn cmd_tail(file: PathBuf, sleep: Option<f64>) -> Result<()> {
    let settings = load_settings()?;
    let interval = interval_from_secs(sleep.unwrap_or(settings.tail.interval))?;
    tail_file(&file, interval)
}

fn cmd_config(show_path: bool, json: bool) -> Result<()> {
    let settings = load_settings()?;
    let path = if show_path {
        Some(settings_path()?)
    } else {
        None
    };

    if json {
        display_config_json(&settings, path.as_deref())?;
    } else {
        display_config(&settings, path.as_deref());
    }
    Ok(())
}
