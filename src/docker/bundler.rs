//! Container execution strategy for bundling.

use super::container_runner::{
    BUNDLING_INPUT_DIR, BUNDLING_OUTPUT_DIR, RunOptions, Volume, default_user,
};
use super::image::{DockerImage, check_docker_available};
use crate::bundler::Result;
use std::{collections::BTreeMap, path::Path};

/// Bundling inside a container.
///
/// The project root is mounted at `/asset-input` and the output directory at
/// `/asset-output`; `command` refers to those paths.
#[derive(Clone, Debug)]
pub struct ContainerBundling {
    /// Image the command runs in
    pub image: DockerImage,
    /// `bash -c <chain>`
    pub command: Vec<String>,
    /// Build args for the image (already merged into `image` when it is built)
    pub build_args: BTreeMap<String, String>,
    /// Working directory inside the container
    pub working_directory: String,
    /// Environment passed with `--env`
    pub environment: BTreeMap<String, String>,
    /// Explicit container user; the host `uid:gid` otherwise
    pub user: Option<String>,
    /// Docker platform matching the function architecture
    pub platform: String,
    pub network: Option<String>,
}

impl ContainerBundling {
    /// `docker run` options for a given project root and output directory.
    pub fn run_options(&self, source_dir: &Path, output_dir: &Path) -> RunOptions {
        RunOptions {
            command: self.command.clone(),
            volumes: vec![
                Volume {
                    host_path: source_dir.to_path_buf(),
                    container_path: BUNDLING_INPUT_DIR.to_string(),
                },
                Volume {
                    host_path: output_dir.to_path_buf(),
                    container_path: BUNDLING_OUTPUT_DIR.to_string(),
                },
            ],
            environment: self.environment.clone(),
            working_directory: Some(self.working_directory.clone()),
            user: Some(self.user.clone().unwrap_or_else(default_user)),
            platform: Some(self.platform.clone()),
            network: self.network.clone(),
        }
    }

    /// Runs the bundling command in a container.
    ///
    /// # Errors
    ///
    /// Docker unavailable, image build failure, or a non-zero container exit.
    pub async fn run(&self, source_dir: &Path, output_dir: &Path) -> Result<()> {
        check_docker_available().await?;
        self.image
            .run(&self.run_options(source_dir, output_dir))
            .await
    }
}
