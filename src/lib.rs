//! Node.js function handler bundler
//!
//! This library decides how a handler is bundled with esbuild:
//! - which package manager governs the project (from the lock file)
//! - whether esbuild runs on the host or inside a build container
//! - whether `tsc` pre-compiles the entry first
//!
//! and stages the output as a hashed build artifact. It can be used both as a
//! CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod docker;
pub mod error;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
