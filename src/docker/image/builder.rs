//! Docker image building operations.

use crate::bundler::{
    Result,
    error::ErrorExt,
    utils::exec::{ExecOptions, run_streaming},
};
use std::{collections::BTreeMap, path::Path};

use super::config::docker_executable;

/// Builds an image from `context_dir/Dockerfile`.
///
/// # Arguments
///
/// * `context_dir` - Directory containing the Dockerfile
/// * `tag` - Tag given to the built image
/// * `build_args` - `--build-arg` values
/// * `platform` - Optional `--platform`
///
/// # Returns
///
/// * `Ok(())` - Image built successfully
/// * `Err` - Build failed (`BuildExecution` with docker's stderr)
pub async fn build_docker_image(
    context_dir: &Path,
    tag: &str,
    build_args: &BTreeMap<String, String>,
    platform: Option<&str>,
) -> Result<()> {
    log::info!("Building Docker image: {}", tag);

    let mut args = vec!["build".to_string(), "-t".to_string(), tag.to_string()];
    for (key, value) in build_args {
        args.push("--build-arg".to_string());
        args.push(format!("{key}={value}"));
    }
    if let Some(platform) = platform {
        args.push("--platform".to_string());
        args.push(platform.to_string());
    }
    args.push(".".to_string());

    let options = ExecOptions {
        cwd: Some(context_dir.to_path_buf()),
        ..Default::default()
    };
    run_streaming(&docker_executable(), &args, &options)
        .await?
        .check(&format!("docker {}", args.join(" ")))?;

    log::info!("✓ Docker image built: {}", tag);
    Ok(())
}

/// Writes the Dockerfile into a fresh build context directory.
pub async fn write_build_context(context_dir: &Path, dockerfile: &str) -> Result<()> {
    tokio::fs::create_dir_all(context_dir)
        .await
        .fs_context("creating docker build context", context_dir)?;
    let dockerfile_path = context_dir.join("Dockerfile");
    tokio::fs::write(&dockerfile_path, dockerfile)
        .await
        .fs_context("writing Dockerfile", &dockerfile_path)
}
