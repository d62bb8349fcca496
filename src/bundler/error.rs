//! Error types for bundling operations.
//!
//! Configuration problems are reported before anything is executed. Execution
//! problems carry the failing command and its captured stderr.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for bundling operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while preparing or running a bundling request.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid combination of options, detected before any execution.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A locally installed tool has the wrong major version.
    ///
    /// Only raised when local execution is actually attempted.
    #[error("Expected {tool} version {expected}.x but got {found}")]
    ToolVersionMismatch {
        /// Tool name (e.g. "esbuild")
        tool: String,
        /// Expected major version
        expected: u64,
        /// Version string reported by the tool
        found: String,
    },

    /// A local or container run exited unsuccessfully.
    #[error("Bundling failed: `{command}` exited with code {exit_code}{}", format_stderr(.stderr))]
    BuildExecution {
        /// Command that was run
        command: String,
        /// Exit code (-1 when terminated by a signal)
        exit_code: i32,
        /// Captured stderr lines
        stderr: Vec<String>,
    },

    /// A required resource (lock file, package.json, module version) could not be found.
    #[error("{0}")]
    ResourceResolution(String),

    /// File system error with context about the operation.
    #[error("Failed {context} `{path}`: {error}")]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        error: std::io::Error,
    },

    /// Plain I/O error.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// JSON error (package.json, tsconfig.json).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

fn format_stderr(stderr: &[String]) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{}", stderr.join("\n"))
    }
}

impl Error {
    /// Shorthand for a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// True for errors raised before any execution took place.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::ResourceResolution(_))
    }
}

/// Attach file system context to I/O results.
pub trait ErrorExt<T> {
    /// Wrap the error with what was being done and on which path.
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Return early with a [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
