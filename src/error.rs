//! Error types for the portgrab CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for portgrab operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Tail(#[from] TailError),

    #[error("Failed to serialize to JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Errors raised by the log tailer.
#[derive(Error, Debug)]
pub enum TailError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single discovery strategy produced nothing.
///
/// These never leave the orchestrator; they are logged and counted as an
/// empty result.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("{0} not found on PATH")]
    ToolUnavailable(String),

    #[error("{tool} exited with {}", describe_exit(.code))]
    ToolFailed { tool: String, code: Option<i32> },

    #[error("connection enumeration failed: {0}")]
    Library(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "no exit code".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
