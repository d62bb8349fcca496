//! Command line interface for the handler bundler.
//!
//! Parses flags, merges them with the config file and either prints the
//! bundling decision (`--dry-run`) or bundles and prints the staged path.

mod args;
pub mod config;

pub use args::{Args, parse_key_val};

use crate::{
    bundler::{BuildArtifactRequest, BundlingEngine},
    error::Result,
};
use std::path::Path;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(&args).await
}

/// Runs the CLI with already parsed arguments.
pub async fn execute(args: &Args) -> Result<i32> {
    let file = config::load(args)?.unwrap_or_default();
    let (options, out_dir) = config::resolve(args, file)?;
    let engine = BundlingEngine::new();

    if args.dry_run {
        let request = engine.prepare(&options)?;
        print!("{}", describe(&request, &out_dir));
        return Ok(0);
    }

    let artifact = engine.bundle(&options, &out_dir).await?;
    println!("{}", artifact.path.display());
    Ok(0)
}

/// Human readable bundling decision.
pub fn describe(request: &BuildArtifactRequest, out_dir: &Path) -> String {
    let mut lines = vec![
        format!("Package manager: {}", request.package_manager),
        format!("Source directory: {}", request.source_dir.display()),
        format!("Asset hash: {}", request.asset_hash),
    ];

    match &request.local {
        Some(local) => {
            lines.push(format!("Strategy: local (esbuild {})", local.esbuild.version));
            lines.push(format!(
                "Command: {}",
                local.shell_command(out_dir).join(" ")
            ));
        }
        None => {
            let container = &request.container;
            lines.push("Strategy: container".to_string());
            lines.push(format!("Image: {}", container.image.tag()));
            lines.push(format!("Platform: {}", container.platform));
            lines.push(format!("Working directory: {}", container.working_directory));
            lines.push(format!("Command: {}", container.command.join(" ")));
        }
    }

    for (key, value) in &request.container.environment {
        lines.push(format!("Environment: {key}={value}"));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
