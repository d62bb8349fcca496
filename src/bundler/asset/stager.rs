//! Staging of bundled output.

use super::BuildArtifactRequest;
use crate::bundler::{
    AssetHash, Error, Result,
    builder::checksum::calculate_sha256,
    error::ErrorExt,
    utils::fs::{create_dir_all, is_empty_dir, move_dir},
};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// A staged bundle.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuildArtifact {
    /// `<outdir>/asset.<hash>`
    pub path: PathBuf,
    /// Output checksum, or the custom hash unchanged.
    pub hash: String,
    pub asset_hash: AssetHash,
    /// False when the bundle was produced in a container.
    pub bundled_locally: bool,
}

/// Runs build requests and stages their output under one directory.
#[derive(Clone, Debug)]
pub struct AssetStager {
    outdir: PathBuf,
}

impl AssetStager {
    pub fn new(outdir: impl Into<PathBuf>) -> Self {
        Self {
            outdir: outdir.into(),
        }
    }

    /// Bundles into a temporary directory, hashes it and moves it into place.
    ///
    /// A local strategy rejected for its esbuild version runs in the container
    /// instead. On failure the temporary directory is kept with an `-error`
    /// suffix for inspection.
    pub async fn stage(&self, request: &BuildArtifactRequest) -> Result<BuildArtifact> {
        // Local bundling runs from the project root, so relative paths would break
        let outdir = self
            .outdir
            .absolutize()
            .fs_context("resolving output directory", &self.outdir)?
            .into_owned();
        create_dir_all(&outdir, false).await?;

        let staging = outdir
            .join(format!("bundling-temp-{}", uuid::Uuid::new_v4()));
        create_dir_all(&staging, true).await?;

        let bundled_locally = match self.produce(request, &staging).await {
            Ok(local) => local,
            Err(e) => {
                self.keep_failed(&staging).await;
                return Err(e);
            }
        };

        let hash = match &request.asset_hash {
            AssetHash::Output => calculate_sha256(&staging).await?,
            AssetHash::Custom(hash) => hash.clone(),
        };

        let path = outdir.join(format!("asset.{}", sanitize_hash(&hash)));
        move_dir(&staging, &path).await?;

        log::info!("✓ Bundle staged at {}", path.display());
        Ok(BuildArtifact {
            path,
            hash,
            asset_hash: request.asset_hash.clone(),
            bundled_locally,
        })
    }

    async fn produce(&self, request: &BuildArtifactRequest, staging: &Path) -> Result<bool> {
        let bundled_locally = match &request.local {
            Some(local) => match local.bundle(staging).await {
                Ok(()) => true,
                Err(e @ Error::ToolVersionMismatch { .. }) => {
                    log::warn!("{}. Bundling in a container instead.", e);
                    request.container.run(&request.source_dir, staging).await?;
                    false
                }
                Err(e) => return Err(e),
            },
            None => {
                request.container.run(&request.source_dir, staging).await?;
                false
            }
        };

        if is_empty_dir(staging).await? {
            return Err(Error::GenericError(format!(
                "Bundling did not produce any output. Check that content is written to {}.",
                staging.display()
            )));
        }
        Ok(bundled_locally)
    }

    async fn keep_failed(&self, staging: &Path) {
        let mut failed = staging.as_os_str().to_owned();
        failed.push("-error");
        if let Err(e) = tokio::fs::rename(staging, &failed).await {
            log::warn!("Could not keep failed bundle {}: {}", staging.display(), e);
        }
    }
}

/// Hash as a directory name component.
fn sanitize_hash(hash: &str) -> String {
    hash.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
