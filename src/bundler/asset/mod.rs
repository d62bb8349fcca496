//! Build artifacts.
//!
//! A [`BuildArtifactRequest`] describes how to produce a bundle: an optional
//! host strategy, a container strategy and a hashing strategy. The
//! [`AssetStager`] runs it and moves the output to a hash-named directory.

mod local;
mod stager;

pub use local::LocalBundling;
pub use stager::{AssetStager, BuildArtifact};

use crate::{
    bundler::{AssetHash, PackageManager},
    docker::ContainerBundling,
};
use std::path::PathBuf;

/// Everything needed to produce one build artifact.
#[derive(Clone, Debug)]
pub struct BuildArtifactRequest {
    /// Directory mounted as the container input (the project root).
    pub source_dir: PathBuf,
    /// Package manager selected from the lock file.
    pub package_manager: PackageManager,
    /// Host strategy, absent when container bundling is forced or the host
    /// lacks the tools.
    pub local: Option<LocalBundling>,
    /// Container strategy, used when `local` is absent.
    pub container: ContainerBundling,
    pub asset_hash: AssetHash,
}
