//! Docker container execution.

use super::image::docker_executable;
use crate::bundler::{
    Result,
    utils::exec::{ExecOptions, run_streaming},
};
use std::{collections::BTreeMap, path::PathBuf};

/// Mount point of the project root inside the container.
pub const BUNDLING_INPUT_DIR: &str = "/asset-input";

/// Mount point of the output directory inside the container.
pub const BUNDLING_OUTPUT_DIR: &str = "/asset-output";

/// Bind mount of a host directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Volume {
    pub host_path: PathBuf,
    pub container_path: String,
}

/// Everything `docker run` needs apart from the image.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Command run in the container
    pub command: Vec<String>,
    pub volumes: Vec<Volume>,
    pub environment: BTreeMap<String, String>,
    pub working_directory: Option<String>,
    /// `uid:gid` the container runs as
    pub user: Option<String>,
    pub platform: Option<String>,
    pub network: Option<String>,
}

/// Runs one-shot containers.
pub struct ContainerRunner {
    image_name: String,
}

impl ContainerRunner {
    /// Creates a new container runner for an image that exists locally or in a registry.
    pub fn new(image_name: String) -> Self {
        Self { image_name }
    }

    /// Builds Docker command arguments for container execution.
    ///
    /// The container is removed when it exits (`--rm`). Volumes use delegated
    /// consistency.
    pub fn build_docker_args(&self, options: &RunOptions) -> Vec<String> {
        let mut docker_args = vec!["run".to_string(), "--rm".to_string()];

        if let Some(user) = &options.user {
            docker_args.push("-u".to_string());
            docker_args.push(user.clone());
        }

        for volume in &options.volumes {
            docker_args.push("-v".to_string());
            docker_args.push(format!(
                "{}:{}:delegated",
                volume.host_path.display(),
                volume.container_path
            ));
        }

        for (key, value) in &options.environment {
            docker_args.push("--env".to_string());
            docker_args.push(format!("{key}={value}"));
        }

        if let Some(workdir) = &options.working_directory {
            docker_args.push("-w".to_string());
            docker_args.push(workdir.clone());
        }

        if let Some(platform) = &options.platform {
            docker_args.push("--platform".to_string());
            docker_args.push(platform.clone());
        }

        if let Some(network) = &options.network {
            docker_args.push("--network".to_string());
            docker_args.push(network.clone());
        }

        docker_args.push(self.image_name.clone());
        docker_args.extend(options.command.iter().cloned());

        docker_args
    }

    /// Runs the container to completion, streaming its output to the log.
    ///
    /// # Errors
    ///
    /// `BuildExecution` when the container exits with a non-zero code.
    pub async fn run_container(&self, options: &RunOptions) -> Result<()> {
        let docker_args = self.build_docker_args(options);
        run_streaming(&docker_executable(), &docker_args, &ExecOptions::default())
            .await?
            .check(&format!("docker {}", docker_args.join(" ")))?;
        Ok(())
    }
}

/// Container user mirroring the host user so output files stay owned by it.
pub fn default_user() -> String {
    #[cfg(unix)]
    {
        format!("{}:{}", users::get_current_uid(), users::get_current_gid())
    }
    #[cfg(not(unix))]
    {
        "1000:1000".to_string()
    }
}
