//! Command line argument parsing.
//!
//! Flags override values from the config file; see [`super::config`].

use crate::bundler::{Architecture, OutputFormat, Runtime, SourceMapMode};
use clap::Parser;
use std::path::PathBuf;

/// Bundles a Node.js function handler with esbuild
#[derive(Parser, Debug, Default)]
#[command(
    name = "handler_bundler",
    version,
    about = "Bundles a Node.js function handler with esbuild",
    long_about = "Bundles a Node.js function handler with esbuild, on the host when a compatible
esbuild is installed, otherwise inside a build container.

The package manager is chosen from the lock file. Options can also be read from
a TOML file (handler-bundler.toml in the working directory by default).

Usage:
  handler_bundler --entry lib/handler.ts --out-dir cdk.out
  handler_bundler --entry lib/handler.ts --node-module delay --force-docker
  handler_bundler --config bundling.toml --dry-run

The path of the staged bundle is printed on success."
)]
pub struct Args {
    /// TOML config file
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Handler entry file (.js, .ts, .mjs, ...)
    #[arg(short = 'e', long, value_name = "PATH")]
    pub entry: Option<PathBuf>,

    /// Dependency lock file; searched upwards from the entry by default
    #[arg(long, value_name = "PATH")]
    pub lock_file: Option<PathBuf>,

    /// Project root; the lock file's directory by default
    #[arg(long, value_name = "PATH")]
    pub project_root: Option<PathBuf>,

    /// Lambda runtime, e.g. nodejs20.x
    #[arg(long, value_name = "RUNTIME")]
    pub runtime: Option<Runtime>,

    /// Target architecture: x86_64 or arm64
    #[arg(long, value_name = "ARCH")]
    pub architecture: Option<Architecture>,

    /// Output format: cjs or esm
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Minify the bundle
    #[arg(long)]
    pub minify: bool,

    /// Emit source maps
    #[arg(long)]
    pub source_map: bool,

    /// Source map mode: default, external, inline or both
    #[arg(long, value_name = "MODE")]
    pub source_map_mode: Option<SourceMapMode>,

    /// Module excluded from the bundle (repeatable)
    #[arg(long = "external", value_name = "MODULE")]
    pub external: Vec<String>,

    /// Module installed next to the bundle instead of bundled (repeatable)
    #[arg(long = "node-module", value_name = "MODULE")]
    pub node_module: Vec<String>,

    /// Run tsc before esbuild
    #[arg(long)]
    pub pre_compilation: bool,

    /// tsconfig.json used by tsc and esbuild
    #[arg(long, value_name = "PATH")]
    pub tsconfig: Option<PathBuf>,

    /// Always bundle inside a container
    #[arg(long)]
    pub force_docker: bool,

    /// Custom asset hash instead of the output checksum
    #[arg(long, value_name = "HASH")]
    pub asset_hash: Option<String>,

    /// Environment variable for the bundling command (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub env: Vec<(String, String)>,

    /// Build argument for the bundling image (repeatable)
    #[arg(long = "build-arg", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub build_arg: Vec<(String, String)>,

    /// Directory the bundle is staged in [default: cdk.out]
    #[arg(short = 'o', long, value_name = "PATH")]
    pub out_dir: Option<PathBuf>,

    /// Print the bundling decision without running anything
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Parses `KEY=VALUE`. The value may itself contain `=`.
pub fn parse_key_val(s: &str) -> anyhow::Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    if key.trim().is_empty() {
        anyhow::bail!("invalid KEY=VALUE: empty key in `{s}`");
    }
    Ok((key.trim().to_string(), value.to_string()))
}
