//! Node.js handler bundling.
//!
//! Decides how a function handler is bundled with esbuild, on the host or in a
//! container, and stages the output as a hashed build artifact.
//!
//! # Module Structure
//!
//! - `asset` - Build artifact requests and staging
//! - `builder` - Decision engine, command assembly and tool probes
//! - `error` - Error types
//! - `package_manager` - Lock file detection and command templates
//! - `settings` - Validated bundling options
//! - `utils` - File system, shell fragments and process execution

pub mod asset;
pub mod builder;
pub mod error;
pub mod package_manager;
pub mod settings;
pub mod utils;

pub use asset::{AssetStager, BuildArtifact, BuildArtifactRequest, LocalBundling};
pub use builder::{BundlingEngine, Installation, ToolCache};
pub use error::{Error, ErrorExt, Result};
pub use package_manager::{LOCK_FILES, LockFile, PackageManager};
pub use settings::{
    Architecture, AssetHash, BundlingOptions, BundlingOptionsBuilder, Charset, CommandHooks,
    EsbuildArg, LogLevel, OutputFormat, Runtime, SourceMapMode, TemplateHooks,
};
