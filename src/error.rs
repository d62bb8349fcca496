//! Error types for the command line tool.
//!
//! Library errors are [`crate::bundler::Error`]; this module wraps them together
//! with argument and config file problems.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type of the binary
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Bundler errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// Config file could not be loaded
    #[error("Cannot load config file {}: {reason}", .path.display())]
    ConfigFile {
        /// Config file path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

impl BundlerError {
    /// Process exit code: 2 for input problems, 1 for failed builds.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cli(_) | Self::Toml(_) => 2,
            Self::Bundler(e) if e.is_configuration() => 2,
            _ => 1,
        }
    }
}
