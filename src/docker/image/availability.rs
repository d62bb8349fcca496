//! Docker daemon availability checking.

use crate::bundler::{Error, Result};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::timeout;

use super::config::{DOCKER_INFO_TIMEOUT, DOCKER_START_HELP, docker_executable};

/// Checks if Docker is installed and the daemon is running.
///
/// # Returns
///
/// * `Ok(())` - Docker is available
/// * `Err` - Docker is not installed or daemon is not running
pub async fn check_docker_available() -> Result<()> {
    let status_result = timeout(
        DOCKER_INFO_TIMEOUT,
        Command::new(docker_executable())
            .arg("info")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status(),
    )
    .await;

    match status_result {
        // Timeout occurred
        Err(_) => Err(Error::GenericError(format!(
            "Docker daemon check timed out after {} seconds.\n\
             \n\
             Container bundling needs a responsive Docker daemon.\n\
             {}\n\
             \n\
             If Docker is running, check: docker ps",
            DOCKER_INFO_TIMEOUT.as_secs(),
            DOCKER_START_HELP
        ))),

        // Command succeeded
        Ok(Ok(status)) if status.success() => Ok(()),

        // Docker command exists but daemon isn't responding
        Ok(Ok(status)) => Err(Error::GenericError(format!(
            "Docker daemon is not responding (exit code: {}).\n\
             \n\
             {}\n\
             \n\
             Alternatively install esbuild locally (npm install --save-dev esbuild@0) \
             to bundle without Docker.",
            status.code().unwrap_or(-1),
            DOCKER_START_HELP
        ))),

        // Docker command not found - not installed
        Ok(Err(e)) => Err(Error::GenericError(format!(
            "Docker command not found: {}\n\
             \n\
             esbuild is not usable locally, so bundling needs Docker.\n\
             Either install esbuild in the project (npm install --save-dev esbuild@0)\n\
             or install Docker: https://docs.docker.com/get-docker/",
            e
        ))),
    }
}
