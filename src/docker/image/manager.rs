//! Docker image references and on-demand builds.

use crate::bundler::{Error, Result};
use sha2::{Digest, Sha256};
use std::{collections::BTreeMap, path::PathBuf};
use tokio::process::Command;

use super::builder::{build_docker_image, write_build_context};
use crate::docker::container_runner::{ContainerRunner, RunOptions};
use super::config::{BUNDLING_DOCKERFILE, BUNDLING_IMAGE_REPOSITORY, docker_executable};

/// Image used for container bundling.
///
/// Built images are resolved lazily: nothing is built until the image is
/// actually needed to run a container.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DockerImage {
    /// Existing image pulled by docker as needed.
    Registry(String),
    /// The embedded bundling Dockerfile, built with these arguments.
    Build {
        /// `--build-arg` values
        build_args: BTreeMap<String, String>,
        /// `--platform`
        platform: Option<String>,
    },
}

impl DockerImage {
    /// Reference to an existing image.
    pub fn from_registry(image: impl Into<String>) -> Self {
        Self::Registry(image.into())
    }

    /// The default bundling image built with `build_args` for `platform`.
    pub fn from_build(build_args: BTreeMap<String, String>, platform: Option<String>) -> Self {
        Self::Build {
            build_args,
            platform,
        }
    }

    /// Tag the image is known by, without building it.
    pub fn tag(&self) -> String {
        match self {
            Self::Registry(image) => image.clone(),
            Self::Build {
                build_args,
                platform,
            } => {
                let mut hasher = Sha256::new();
                hasher.update(BUNDLING_DOCKERFILE.as_bytes());
                for (key, value) in build_args {
                    hasher.update(key.as_bytes());
                    hasher.update(b"=");
                    hasher.update(value.as_bytes());
                    hasher.update(b"\n");
                }
                if let Some(platform) = platform {
                    hasher.update(platform.as_bytes());
                }
                let digest = hex::encode(hasher.finalize());
                format!("{}:{}", BUNDLING_IMAGE_REPOSITORY, &digest[..16])
            }
        }
    }

    /// Makes sure the image exists locally and returns its tag.
    ///
    /// Registry images are left to `docker run` to pull. Built images are
    /// reused when an image with the same tag already exists.
    pub async fn ensure_available(&self) -> Result<String> {
        let tag = self.tag();
        let Self::Build {
            build_args,
            platform,
        } = self
        else {
            return Ok(tag);
        };

        if image_exists(&tag).await? {
            log::debug!("Reusing Docker image {}", tag);
            return Ok(tag);
        }

        let context_dir = build_context_dir(&tag);
        write_build_context(&context_dir, BUNDLING_DOCKERFILE).await?;
        build_docker_image(&context_dir, &tag, build_args, platform.as_deref()).await?;
        Ok(tag)
    }

    /// Runs a one-shot container from this image, building it first if needed.
    pub async fn run(&self, options: &RunOptions) -> Result<()> {
        let image_name = self.ensure_available().await?;
        log::info!("Running container from {}", image_name);
        ContainerRunner::new(image_name).run_container(options).await
    }
}

async fn image_exists(tag: &str) -> Result<bool> {
    let output = Command::new(docker_executable())
        .args(["images", "-q", tag])
        .output()
        .await
        .map_err(|e| Error::GenericError(format!("Failed to run `docker images`: {e}")))?;

    if !output.status.success() {
        return Ok(false);
    }
    Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

fn build_context_dir(tag: &str) -> PathBuf {
    let name = tag.replace(':', "-");
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(BUNDLING_IMAGE_REPOSITORY)
        .join(name)
}
