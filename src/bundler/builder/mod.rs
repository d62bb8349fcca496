//! Bundling decision and command assembly.
//!
//! This module provides the [`BundlingEngine`] that turns validated
//! [`BundlingOptions`](crate::bundler::BundlingOptions) into a
//! [`BuildArtifactRequest`](crate::bundler::BuildArtifactRequest).
//!
//! # Overview
//!
//! The engine:
//! 1. Selects the package manager from the lock file
//! 2. Probes `esbuild` (and `tsc`) on the host, once per tool
//! 3. Renders the bundling command for the host and for the container
//! 4. Hands both strategies to the asset stager
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 of the bundled output tree
//! - [`command`] - `&&` chain of hooks, install, tsc and esbuild
//! - [`dependencies`] - node module versions from package.json
//! - [`orchestrator`] - Main [`BundlingEngine`]
//! - [`tool_detection`] - Host tool probes and their cache
//! - [`tsconfig`] - `compilerOptions` to `tsc` flags

pub mod checksum;
pub mod command;
pub mod dependencies;
mod orchestrator;
pub mod tool_detection;
pub mod tsconfig;

pub use command::{BundlingCommand, CommandContext};
pub use orchestrator::{BundlingEngine, ESBUILD_MAJOR_VERSION};
pub use tool_detection::{Installation, ToolCache};
